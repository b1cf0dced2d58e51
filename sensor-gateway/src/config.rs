//! Gateway configuration.
//!
//! Everything is read once from the environment at start-up and passed
//! explicitly to the components that need it. Nothing here is mutated
//! after construction.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Default port when `PORT` is not set.
const DEFAULT_PORT: u16 = 3000;

/// Default ViewMondo API root.
const DEFAULT_VIEWMONDO_BASE_URL: &str = "https://viewmondo.com";

/// Keflavík AWOS values endpoint.
const DEFAULT_AWOS_URL: &str = "https://awos.kefairport.is/api/Values/";

/// ARINC D-ATIS text for BIKF arrivals, with the fixed session parameter.
const DEFAULT_DATIS_URL: &str = "https://webdatis.arinc.net/cgi-bin/datis/get_datis?station=BIKF&sessionId=HY618U7T&products=DATIS&arrdep=ARR";

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MAX_CONCURRENT: usize = 8;
const DEFAULT_MAX_MEASURE_SAMPLES: usize = 1000;

/// Errors raised while loading configuration. All of them are fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed.
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// ViewMondo account credentials.
///
/// `Debug` never prints the password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Create credentials, rejecting empty values.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let username = username.into();
        let password = password.into();
        if username.is_empty() {
            return Err(ConfigError::Missing("VIEWMONDO_USERNAME"));
        }
        if password.is_empty() {
            return Err(ConfigError::Missing("VIEWMONDO_PASSWORD"));
        }
        Ok(Self { username, password })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Settings shared by every outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamConfig {
    /// Budget for a single upstream stage.
    pub timeout: Duration,
    /// Maximum number of upstream requests in flight across all pipelines.
    pub max_concurrent: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }
}

/// Complete gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub listen_addr: SocketAddr,
    pub credentials: Credentials,
    pub viewmondo_base_url: String,
    pub awos_url: String,
    pub datis_url: String,
    pub upstream: UpstreamConfig,
    /// Upper bound on the number of samples returned from one measurement fetch.
    pub max_measure_samples: usize,
}

impl GatewayConfig {
    /// Build a config with production upstream URLs and default limits.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            credentials,
            viewmondo_base_url: DEFAULT_VIEWMONDO_BASE_URL.to_string(),
            awos_url: DEFAULT_AWOS_URL.to_string(),
            datis_url: DEFAULT_DATIS_URL.to_string(),
            upstream: UpstreamConfig::default(),
            max_measure_samples: DEFAULT_MAX_MEASURE_SAMPLES,
        }
    }

    /// Point every upstream at a single host (for testing).
    pub fn with_upstream_root(mut self, root: &str) -> Self {
        let root = root.trim_end_matches('/');
        self.viewmondo_base_url = root.to_string();
        self.awos_url = format!("{root}/awos/api/Values/");
        self.datis_url = format!("{root}/datis");
        self
    }

    /// Set the per-stage timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.upstream.timeout = timeout;
        self
    }

    /// Cap the number of samples returned per measurement fetch.
    pub fn with_max_measure_samples(mut self, max: usize) -> Self {
        self.max_measure_samples = max;
        self
    }

    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &'static str| lookup(name).filter(|v| !v.trim().is_empty());

        let username = var("VIEWMONDO_USERNAME").ok_or(ConfigError::Missing("VIEWMONDO_USERNAME"))?;
        let password = var("VIEWMONDO_PASSWORD").ok_or(ConfigError::Missing("VIEWMONDO_PASSWORD"))?;
        let mut config = Self::new(Credentials::new(username, password)?);

        let port = parse_or(var("PORT"), "PORT", DEFAULT_PORT)?;
        let ip = parse_or(
            var("BIND_ADDR"),
            "BIND_ADDR",
            IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        )?;
        config.listen_addr = SocketAddr::new(ip, port);

        if let Some(url) = var("VIEWMONDO_BASE_URL") {
            config.viewmondo_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = var("AWOS_URL") {
            config.awos_url = url;
        }
        if let Some(url) = var("DATIS_URL") {
            config.datis_url = url;
        }

        let timeout_secs: u64 = parse_or(
            var("UPSTREAM_TIMEOUT_SECS"),
            "UPSTREAM_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "UPSTREAM_TIMEOUT_SECS",
                reason: "must be at least 1".to_string(),
            });
        }
        config.upstream.timeout = Duration::from_secs(timeout_secs);

        config.upstream.max_concurrent = parse_or(
            var("UPSTREAM_MAX_CONCURRENT"),
            "UPSTREAM_MAX_CONCURRENT",
            DEFAULT_MAX_CONCURRENT,
        )?;
        if config.upstream.max_concurrent == 0 {
            return Err(ConfigError::Invalid {
                name: "UPSTREAM_MAX_CONCURRENT",
                reason: "must be at least 1".to_string(),
            });
        }

        config.max_measure_samples = parse_or(
            var("MAX_MEASURE_SAMPLES"),
            "MAX_MEASURE_SAMPLES",
            DEFAULT_MAX_MEASURE_SAMPLES,
        )?;
        if config.max_measure_samples == 0 {
            return Err(ConfigError::Invalid {
                name: "MAX_MEASURE_SAMPLES",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(config)
    }
}

fn parse_or<T>(value: Option<String>, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
    }
}
