//! ViewMondo runway-station telemetry.
//!
//! Each request runs its own pipeline: a fresh password-grant token, a fresh
//! station listing, first-match resolution of the runway identifier, then
//! an optional latest or two-hour history fetch. Nothing is shared or cached
//! between requests.

mod error;
mod measurements;
mod pipeline;
mod resolve;
mod stations;
mod token;
mod types;

pub use error::{Stage, ViewMondoError};
pub use measurements::{MeasurementFetcher, MeasurementMode, MeasurementWindow};
pub use pipeline::{PipelineOutput, PipelineState, RouteSpec, ViewMondoPipeline};
pub use resolve::{MatchPolicy, RouteTable, resolve};
pub use stations::{StationDirectory, StationListing, StationSet};
pub use token::TokenProvider;
pub use types::{AccessToken, Station, StationId};

use crate::config::GatewayConfig;
use crate::upstream::UpstreamClient;

impl ViewMondoPipeline {
    /// Wire the pipeline components from the gateway config.
    pub fn from_config(upstream: &UpstreamClient, config: &GatewayConfig) -> Self {
        let base_url = config.viewmondo_base_url.as_str();
        Self::new(
            TokenProvider::new(upstream.clone(), base_url, config.credentials.clone()),
            StationDirectory::new(upstream.clone(), base_url),
            MeasurementFetcher::new(upstream.clone(), base_url, config.max_measure_samples),
        )
    }
}
