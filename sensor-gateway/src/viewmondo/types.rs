//! ViewMondo wire and domain types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value, json};

/// Opaque station identifier.
///
/// ViewMondo sends numeric ids; strings are accepted so an upstream format
/// change does not break resolution. The original representation is kept
/// when the station is echoed back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StationId {
    Numeric(u64),
    Text(String),
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StationId::Numeric(n) => write!(f, "{n}"),
            StationId::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for StationId {
    fn from(n: u64) -> Self {
        StationId::Numeric(n)
    }
}

/// A sensor station as listed by ViewMondo.
///
/// Only `name` takes part in resolution. The upstream object is kept as-is
/// and is what gets serialised, so key names and key order survive the
/// round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    /// `Id`/`id`; `None` if the record carries no usable id.
    pub id: Option<StationId>,
    /// `Name`/`name`; empty when missing or null, which never matches a query.
    pub name: String,
    raw: Value,
}

impl Station {
    /// Create a bare station record.
    pub fn new(id: impl Into<StationId>, name: impl Into<String>) -> Self {
        let id = id.into();
        let name = name.into();
        let raw = json!({"Id": id, "Name": name});
        Self {
            id: Some(id),
            name,
            raw,
        }
    }

    /// Wrap an upstream station object. Returns `None` for non-objects.
    pub fn from_value(raw: Value) -> Option<Self> {
        let object = raw.as_object()?;
        let id = field(object, "Id", "id").and_then(station_id);
        let name = field(object, "Name", "name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Some(Self { id, name, raw })
    }

    /// Latest sample block; present only in the enriched listing.
    pub fn last_data(&self) -> Option<&Value> {
        let object = self.raw.as_object()?;
        field(object, "LastData", "lastData").filter(|v| !v.is_null())
    }

    /// The station object exactly as ViewMondo sent it.
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

impl Serialize for Station {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

fn field<'a>(object: &'a Map<String, Value>, pascal: &str, camel: &str) -> Option<&'a Value> {
    object.get(pascal).or_else(|| object.get(camel))
}

fn station_id(value: &Value) -> Option<StationId> {
    match value {
        Value::Number(n) => n.as_u64().map(StationId::Numeric),
        Value::String(s) if !s.is_empty() => Some(StationId::Text(s.clone())),
        _ => None,
    }
}

/// A bearer token obtained for a single pipeline run.
///
/// `Debug` hides the token value.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    value: String,
    obtained_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(value: impl Into<String>, obtained_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            obtained_at,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn obtained_at(&self) -> DateTime<Utc> {
        self.obtained_at
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("obtained_at", &self.obtained_at)
            .finish()
    }
}

/// Body of a successful password-grant response.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}
