//! Application state for the web layer.

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::feeds::FeedClient;
use crate::upstream::{UpstreamClient, UpstreamError};
use crate::viewmondo::{RouteTable, ViewMondoPipeline};

/// Shared application state.
///
/// Everything in here is read-only; requests never share mutable state.
#[derive(Clone)]
pub struct AppState {
    /// Weather and D-ATIS passthrough client
    pub feeds: Arc<FeedClient>,

    /// ViewMondo pipeline
    pub viewmondo: Arc<ViewMondoPipeline>,

    /// Runway route id → match policy
    pub routes: Arc<RouteTable>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(feeds: FeedClient, viewmondo: ViewMondoPipeline, routes: RouteTable) -> Self {
        Self {
            feeds: Arc::new(feeds),
            viewmondo: Arc::new(viewmondo),
            routes: Arc::new(routes),
        }
    }

    /// Build every component from the gateway config with the default route table.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, UpstreamError> {
        let upstream = UpstreamClient::new(&config.upstream)?;
        let feeds = FeedClient::new(upstream.clone(), &config.awos_url, &config.datis_url);
        let viewmondo = ViewMondoPipeline::from_config(&upstream, config);
        Ok(Self::new(feeds, viewmondo, RouteTable::default()))
    }
}
