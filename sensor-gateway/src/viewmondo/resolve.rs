//! Runway identifier → station resolution.
//!
//! Resolution is first-match, not best-match: the first station in listing
//! order whose uppercased name contains the uppercased query wins. ViewMondo
//! does not promise a stable listing order, so ambiguous queries may resolve
//! differently across requests.

use std::collections::HashMap;

use super::error::ViewMondoError;
use super::stations::StationSet;
use super::types::Station;

/// How a route chooses the substring to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchPolicy {
    /// Always resolve this substring, whatever the caller asked for.
    Fixed(String),
    /// Resolve the identifier supplied by the caller.
    CallerProvided,
}

impl MatchPolicy {
    /// The query this policy resolves for a given caller identifier.
    pub fn query<'a>(&'a self, caller: &'a str) -> &'a str {
        match self {
            MatchPolicy::Fixed(substring) => substring,
            MatchPolicy::CallerProvided => caller,
        }
    }
}

/// Return the first station whose name contains `query`, ignoring case.
///
/// An empty query matches nothing.
pub fn resolve<'a>(stations: &'a StationSet, query: &str) -> Result<&'a Station, ViewMondoError> {
    let needle = query.trim().to_uppercase();
    if needle.is_empty() {
        return Err(ViewMondoError::NotFound {
            query: query.to_string(),
        });
    }

    stations
        .iter()
        .find(|s| s.name.to_uppercase().contains(&needle))
        .ok_or_else(|| ViewMondoError::NotFound {
            query: query.to_string(),
        })
}

/// Route id → match policy.
///
/// Route ids are compared case-insensitively. Ids not in the table are
/// caller-provided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    routes: HashMap<String, MatchPolicy>,
}

impl RouteTable {
    /// An empty table: every route is caller-provided.
    pub fn empty() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Pin a route id to a fixed substring.
    pub fn with_fixed(mut self, route_id: &str, substring: impl Into<String>) -> Self {
        self.routes.insert(
            route_id.to_lowercase(),
            MatchPolicy::Fixed(substring.into()),
        );
        self
    }

    /// Policy for a route id.
    pub fn policy_for(&self, route_id: &str) -> MatchPolicy {
        self.routes
            .get(&route_id.to_lowercase())
            .cloned()
            .unwrap_or(MatchPolicy::CallerProvided)
    }
}

impl Default for RouteTable {
    /// Keflavík runways 01/19 and 10/28.
    fn default() -> Self {
        Self::empty()
            .with_fixed("rwy01", "01")
            .with_fixed("rwy10", "10")
            .with_fixed("rwy19", "19")
            .with_fixed("rwy28", "28")
    }
}
