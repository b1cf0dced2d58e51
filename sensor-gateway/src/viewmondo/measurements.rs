//! Sensor measurement retrieval.
//!
//! Results are passed through as opaque JSON. ViewMondo pagination is not
//! followed; an oversized array is cut to `max_samples` instead.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::Value;
use tracing::warn;

use crate::upstream::UpstreamClient;

use super::error::{Stage, ViewMondoError};
use super::types::{AccessToken, StationId};

/// Width of the history window.
const HISTORY_WIDTH_SECS: i64 = 2 * 60 * 60;

/// Which measurements a route wants after resolving its station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementMode {
    /// Station record only.
    None,
    /// Latest sample.
    Latest,
    /// Samples from the trailing history window.
    Window,
}

/// A closed time range of samples for one station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasurementWindow {
    pub station_id: StationId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl MeasurementWindow {
    /// The history window ending at `now`.
    pub fn trailing(station_id: StationId, now: DateTime<Utc>) -> Self {
        Self {
            station_id,
            start: now - Self::width(),
            end: now,
        }
    }

    pub fn width() -> Duration {
        Duration::seconds(HISTORY_WIDTH_SECS)
    }
}

/// Fetches latest or windowed samples for a resolved station.
#[derive(Debug, Clone)]
pub struct MeasurementFetcher {
    upstream: UpstreamClient,
    base_url: String,
    max_samples: usize,
}

impl MeasurementFetcher {
    pub fn new(upstream: UpstreamClient, base_url: &str, max_samples: usize) -> Self {
        Self {
            upstream,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_samples,
        }
    }

    /// Latest sample for a station.
    pub async fn fetch_latest(
        &self,
        token: &AccessToken,
        station_id: &StationId,
    ) -> Result<Value, ViewMondoError> {
        let url = format!("{}/api/v1/GetStationLastData", self.base_url);
        let request = self
            .upstream
            .get(&url)
            .bearer_auth(token.value())
            .query(&[("stationId", station_id.to_string())]);

        self.fetch(request).await
    }

    /// Samples within `window`.
    pub async fn fetch_window(
        &self,
        token: &AccessToken,
        window: &MeasurementWindow,
    ) -> Result<Value, ViewMondoError> {
        let url = format!("{}/api/v1/GetStationData", self.base_url);
        let request = self
            .upstream
            .get(&url)
            .bearer_auth(token.value())
            .query(&[
                ("stationId", window.station_id.to_string()),
                ("from", format_instant(window.start)),
                ("to", format_instant(window.end)),
            ]);

        self.fetch(request).await
    }

    async fn fetch(&self, request: reqwest::RequestBuilder) -> Result<Value, ViewMondoError> {
        let value = self
            .upstream
            .fetch_json(request)
            .await
            .map_err(|e| ViewMondoError::at(Stage::Measurements, e))?;

        Ok(bound_samples(value, self.max_samples))
    }
}

fn format_instant(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Cut a sample array to at most `max` entries. Non-arrays pass unchanged.
fn bound_samples(value: Value, max: usize) -> Value {
    match value {
        Value::Array(mut samples) if samples.len() > max => {
            warn!(
                returned = samples.len(),
                kept = max,
                "measurement result exceeds sample bound, truncating"
            );
            samples.truncate(max);
            Value::Array(samples)
        }
        other => other,
    }
}
