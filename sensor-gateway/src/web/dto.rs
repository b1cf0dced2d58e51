//! Response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::viewmondo::Station;

/// JSON error body: `{"error": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A resolved runway station, with measurements when the route fetched them.
#[derive(Debug, Serialize)]
pub struct RunwayResponse {
    pub station: Station,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub measures: Option<Value>,
}
