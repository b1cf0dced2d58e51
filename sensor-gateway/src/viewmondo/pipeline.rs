//! The ViewMondo request pipeline.
//!
//! Every runway route runs the same sequence, parameterised by a
//! [`RouteSpec`]:
//!
//! ```text
//! Start → TokenAcquired → StationsListed → StationResolved → MeasurementsFetched
//!   ↘──────────────↘──────────────↘──────────────↘─→ Failed(stage)
//! ```
//!
//! Each step consumes the previous step's output, so the steps are awaited
//! one after another and the first failure ends the run.

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, warn};

use crate::upstream::UpstreamError;

use super::error::{Stage, ViewMondoError};
use super::measurements::{MeasurementFetcher, MeasurementMode, MeasurementWindow};
use super::resolve::{MatchPolicy, resolve};
use super::stations::{StationDirectory, StationListing, StationSet};
use super::token::TokenProvider;
use super::types::{Station, StationId};

/// Per-route pipeline parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSpec {
    pub listing: StationListing,
    /// `None` skips resolution and returns the whole listing.
    pub policy: Option<MatchPolicy>,
    pub measurement: MeasurementMode,
}

impl RouteSpec {
    /// Whole enriched listing, unfiltered.
    pub fn listing() -> Self {
        Self {
            listing: StationListing::Enriched,
            policy: None,
            measurement: MeasurementMode::None,
        }
    }

    /// Resolve one station from the enriched listing.
    pub fn station(policy: MatchPolicy) -> Self {
        Self {
            listing: StationListing::Enriched,
            policy: Some(policy),
            measurement: MeasurementMode::None,
        }
    }

    /// Resolve one station, then fetch its measurements.
    pub fn measured(policy: MatchPolicy, measurement: MeasurementMode) -> Self {
        Self {
            listing: StationListing::Lightweight,
            policy: Some(policy),
            measurement,
        }
    }
}

/// Progress of a single pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Start,
    TokenAcquired,
    StationsListed,
    StationResolved,
    MeasurementsFetched,
    Failed(Stage),
}

impl PipelineState {
    /// The stage that runs next from this state.
    fn pending_stage(self) -> Stage {
        match self {
            PipelineState::Start => Stage::Token,
            PipelineState::TokenAcquired => Stage::Stations,
            PipelineState::StationsListed => Stage::Resolve,
            PipelineState::StationResolved | PipelineState::MeasurementsFetched => {
                Stage::Measurements
            }
            PipelineState::Failed(stage) => stage,
        }
    }
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutput {
    /// The full station listing (no resolution requested).
    Listing(StationSet),
    /// One resolved station, with measurements if the route asked for them.
    Station {
        station: Station,
        measures: Option<Value>,
    },
}

/// Runs token → stations → resolve → measurements for one request.
#[derive(Debug, Clone)]
pub struct ViewMondoPipeline {
    tokens: TokenProvider,
    directory: StationDirectory,
    measurements: MeasurementFetcher,
}

impl ViewMondoPipeline {
    pub fn new(
        tokens: TokenProvider,
        directory: StationDirectory,
        measurements: MeasurementFetcher,
    ) -> Self {
        Self {
            tokens,
            directory,
            measurements,
        }
    }

    /// Run the pipeline for one request.
    ///
    /// `caller_query` is the runway identifier from the request path, used
    /// when the route's policy is [`MatchPolicy::CallerProvided`].
    pub async fn run(
        &self,
        spec: &RouteSpec,
        caller_query: &str,
    ) -> Result<PipelineOutput, ViewMondoError> {
        let mut state = PipelineState::Start;
        let result = self.advance(spec, caller_query, &mut state).await;

        if let Err(err) = &result {
            debug_assert_eq!(state.pending_stage(), err.stage());
            let failed = PipelineState::Failed(state.pending_stage());
            warn!(state = ?failed, from = ?state, error = %err, "ViewMondo pipeline failed");
        }
        result
    }

    async fn advance(
        &self,
        spec: &RouteSpec,
        caller_query: &str,
        state: &mut PipelineState,
    ) -> Result<PipelineOutput, ViewMondoError> {
        let token = self.tokens.acquire_token().await?;
        transition(state, PipelineState::TokenAcquired);

        let stations = self.directory.list_stations(&token, spec.listing).await?;
        transition(state, PipelineState::StationsListed);
        debug!(count = stations.len(), listing = ?spec.listing, "listed stations");

        let Some(policy) = &spec.policy else {
            return Ok(PipelineOutput::Listing(stations));
        };

        let station = resolve(&stations, policy.query(caller_query))?.clone();
        transition(state, PipelineState::StationResolved);
        debug!(station_id = ?station.id, name = %station.name, "resolved station");

        let measures = match spec.measurement {
            MeasurementMode::None => None,
            MeasurementMode::Latest => {
                let station_id = measurable_id(&station)?;
                Some(self.measurements.fetch_latest(&token, &station_id).await?)
            }
            MeasurementMode::Window => {
                let window = MeasurementWindow::trailing(measurable_id(&station)?, Utc::now());
                Some(self.measurements.fetch_window(&token, &window).await?)
            }
        };
        if measures.is_some() {
            transition(state, PipelineState::MeasurementsFetched);
        }

        Ok(PipelineOutput::Station { station, measures })
    }
}

/// A station without an id cannot be queried for measurements.
fn measurable_id(station: &Station) -> Result<StationId, ViewMondoError> {
    station.id.clone().ok_or_else(|| {
        ViewMondoError::at(
            Stage::Measurements,
            UpstreamError::Json {
                message: format!("station '{}' has no id", station.name),
            },
        )
    })
}

fn transition(state: &mut PipelineState, next: PipelineState) {
    debug!(from = ?state, to = ?next, "pipeline transition");
    *state = next;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_spec_constructors() {
        let spec = RouteSpec::listing();
        assert_eq!(spec.listing, StationListing::Enriched);
        assert!(spec.policy.is_none());

        let spec = RouteSpec::station(MatchPolicy::CallerProvided);
        assert_eq!(spec.listing, StationListing::Enriched);
        assert_eq!(spec.measurement, MeasurementMode::None);

        let spec = RouteSpec::measured(MatchPolicy::Fixed("28".into()), MeasurementMode::Window);
        assert_eq!(spec.listing, StationListing::Lightweight);
        assert_eq!(spec.measurement, MeasurementMode::Window);
    }

    #[test]
    fn pending_stage_follows_state() {
        assert_eq!(PipelineState::Start.pending_stage(), Stage::Token);
        assert_eq!(PipelineState::TokenAcquired.pending_stage(), Stage::Stations);
        assert_eq!(PipelineState::StationsListed.pending_stage(), Stage::Resolve);
        assert_eq!(
            PipelineState::StationResolved.pending_stage(),
            Stage::Measurements
        );
        assert_eq!(
            PipelineState::Failed(Stage::Stations).pending_stage(),
            Stage::Stations
        );
    }

    #[test]
    fn station_without_id_cannot_be_measured() {
        let station = Station::from_value(serde_json::json!({"Name": "RWY 28"})).unwrap();
        let err = measurable_id(&station).unwrap_err();
        assert_eq!(err.stage(), Stage::Measurements);

        let station = Station::new(4, "RWY 28");
        assert_eq!(measurable_id(&station).unwrap(), StationId::Numeric(4));
    }

    #[test]
    fn transition_updates_state() {
        let mut state = PipelineState::Start;
        transition(&mut state, PipelineState::TokenAcquired);
        assert_eq!(state, PipelineState::TokenAcquired);
    }
}
