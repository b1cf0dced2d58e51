//! Single-hop passthrough feeds: Keflavík AWOS weather and BIKF D-ATIS.
//!
//! Neither feed takes input. The upstream payload is returned unchanged.

use serde_json::Value;

use crate::upstream::{UpstreamClient, UpstreamError};

/// Client for the weather and D-ATIS feeds.
#[derive(Debug, Clone)]
pub struct FeedClient {
    upstream: UpstreamClient,
    awos_url: String,
    datis_url: String,
}

impl FeedClient {
    pub fn new(
        upstream: UpstreamClient,
        awos_url: impl Into<String>,
        datis_url: impl Into<String>,
    ) -> Self {
        Self {
            upstream,
            awos_url: awos_url.into(),
            datis_url: datis_url.into(),
        }
    }

    /// Current AWOS values, as the upstream JSON document.
    pub async fn fetch_weather(&self) -> Result<Value, UpstreamError> {
        self.upstream
            .fetch_json(self.upstream.get(&self.awos_url))
            .await
    }

    /// Current D-ATIS broadcast, as pre-rendered text.
    pub async fn fetch_datis(&self) -> Result<String, UpstreamError> {
        self.upstream
            .fetch_text(self.upstream.get(&self.datis_url))
            .await
    }
}
