//! ViewMondo pipeline error types.

use std::fmt;

use crate::upstream::UpstreamError;

/// Pipeline stage at which a failure originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Token,
    Stations,
    Resolve,
    Measurements,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Token => "token",
            Stage::Stations => "stations",
            Stage::Resolve => "resolve",
            Stage::Measurements => "measurements",
        };
        f.write_str(name)
    }
}

/// Errors from the ViewMondo pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ViewMondoError {
    /// The password-grant exchange was rejected or returned no usable token.
    #[error("token exchange failed: {reason}")]
    Auth { reason: String },

    /// No station name contains the query.
    #[error("station '{query}' not found")]
    NotFound { query: String },

    /// A stage exceeded its time budget.
    #[error("{stage} stage timed out")]
    Timeout { stage: Stage },

    /// Network-level failure talking to ViewMondo.
    #[error("{stage} stage transport failure: {source}")]
    Transport {
        stage: Stage,
        #[source]
        source: UpstreamError,
    },

    /// ViewMondo answered, but not with something usable.
    #[error("{stage} stage upstream failure: {source}")]
    Upstream {
        stage: Stage,
        #[source]
        source: UpstreamError,
    },
}

impl ViewMondoError {
    /// Classify a transport error raised during a non-token stage.
    pub(crate) fn at(stage: Stage, err: UpstreamError) -> Self {
        match err {
            UpstreamError::Timeout(_) => ViewMondoError::Timeout { stage },
            UpstreamError::Transport(_) | UpstreamError::LimiterClosed => {
                ViewMondoError::Transport { stage, source: err }
            }
            _ => ViewMondoError::Upstream { stage, source: err },
        }
    }

    /// Classify a transport error raised during the token exchange.
    ///
    /// Any answer from the auth endpoint that does not yield a token is an
    /// authentication failure; network problems stay transport failures.
    pub(crate) fn at_token(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Status { status, .. } => ViewMondoError::Auth {
                reason: format!("auth endpoint returned {status}"),
            },
            UpstreamError::Json { message } => ViewMondoError::Auth {
                reason: format!("malformed token response: {message}"),
            },
            other => Self::at(Stage::Token, other),
        }
    }

    /// Stage at which this error originated.
    pub fn stage(&self) -> Stage {
        match self {
            ViewMondoError::Auth { .. } => Stage::Token,
            ViewMondoError::NotFound { .. } => Stage::Resolve,
            ViewMondoError::Timeout { stage }
            | ViewMondoError::Transport { stage, .. }
            | ViewMondoError::Upstream { stage, .. } => *stage,
        }
    }
}
