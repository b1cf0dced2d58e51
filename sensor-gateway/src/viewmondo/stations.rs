//! Station directory.

use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::debug;

use crate::upstream::{UpstreamClient, UpstreamError};

use super::error::{Stage, ViewMondoError};
use super::types::{AccessToken, Station, StationId};

/// Which station listing to request.
///
/// The lightweight listing is enough for identification; the enriched one
/// also carries each station's latest sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationListing {
    Lightweight,
    Enriched,
}

impl StationListing {
    fn path(self) -> &'static str {
        match self {
            StationListing::Lightweight => "/api/v1/GetStations",
            StationListing::Enriched => "/api/v1/GetStationsWithLastData",
        }
    }
}

/// A complete station listing, in the order ViewMondo returned it.
///
/// Serialises to the upstream listing unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct StationSet {
    raw: Value,
    stations: Vec<Station>,
}

impl StationSet {
    pub fn new(stations: Vec<Station>) -> Self {
        let raw = Value::Array(stations.iter().map(|s| s.raw().clone()).collect());
        Self { raw, stations }
    }

    /// Parse an upstream listing.
    ///
    /// The listing must be a JSON array. Elements that are not objects are
    /// left in the raw listing but cannot be resolved.
    pub fn from_listing(raw: Value) -> Result<Self, UpstreamError> {
        let Some(items) = raw.as_array() else {
            return Err(UpstreamError::Json {
                message: "station listing is not an array".to_string(),
            });
        };

        let stations: Vec<Station> = items.iter().cloned().filter_map(Station::from_value).collect();
        if stations.len() != items.len() {
            debug!(
                skipped = items.len() - stations.len(),
                "station listing contains non-object entries"
            );
        }
        Ok(Self { raw, stations })
    }

    /// Look up a station by id.
    pub fn get(&self, id: &StationId) -> Option<&Station> {
        self.stations.iter().find(|s| s.id.as_ref() == Some(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Station> {
        self.stations.iter()
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

impl Serialize for StationSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl FromIterator<Station> for StationSet {
    fn from_iter<I: IntoIterator<Item = Station>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Fetches station listings.
#[derive(Debug, Clone)]
pub struct StationDirectory {
    upstream: UpstreamClient,
    base_url: String,
}

impl StationDirectory {
    pub fn new(upstream: UpstreamClient, base_url: &str) -> Self {
        Self {
            upstream,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the full listing. Either every station or an error.
    pub async fn list_stations(
        &self,
        token: &AccessToken,
        listing: StationListing,
    ) -> Result<StationSet, ViewMondoError> {
        let url = format!("{}{}", self.base_url, listing.path());
        let request = self.upstream.get(&url).bearer_auth(token.value());

        let listing: Value = self
            .upstream
            .fetch_json(request)
            .await
            .map_err(|e| ViewMondoError::at(Stage::Stations, e))?;

        StationSet::from_listing(listing).map_err(|e| ViewMondoError::at(Stage::Stations, e))
    }
}
