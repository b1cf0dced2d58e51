//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::viewmondo::{
    MeasurementMode, PipelineOutput, RouteSpec, Stage, StationSet, ViewMondoError,
};

use super::dto::*;
use super::state::AppState;

const WEATHER_ERROR: &str = "Failed to fetch weather data";
const DATIS_ERROR: &str = "Failed to fetch DATIS";

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/weather", get(weather))
        .route("/datis", get(datis))
        .route("/viewmondo", get(viewmondo_listing))
        .route("/viewmondo/:runway", get(runway_station))
        .route("/viewmondo/:runway/latest", get(runway_latest))
        .route("/viewmondo/:runway/history", get(runway_history))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// AWOS values, passed through.
async fn weather(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let values = state.feeds.fetch_weather().await.map_err(|e| {
        warn!(error = %e, upstream_body = ?e.body_snippet(), "weather proxy error");
        AppError::Internal {
            message: WEATHER_ERROR.to_string(),
        }
    })?;
    Ok(Json(values))
}

/// D-ATIS text, passed through as `text/plain`.
async fn datis(State(state): State<AppState>) -> Result<Response, AppError> {
    let text = state.feeds.fetch_datis().await.map_err(|e| {
        warn!(error = %e, upstream_body = ?e.body_snippet(), "DATIS proxy error");
        AppError::InternalText {
            message: DATIS_ERROR.to_string(),
        }
    })?;
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text).into_response())
}

/// Every station from the enriched listing, unfiltered.
async fn viewmondo_listing(State(state): State<AppState>) -> Result<Response, AppError> {
    run(&state, &RouteSpec::listing(), "").await
}

/// One station, resolved from the path identifier.
async fn runway_station(
    State(state): State<AppState>,
    Path(runway): Path<String>,
) -> Result<Response, AppError> {
    let spec = RouteSpec::station(state.routes.policy_for(&runway));
    run(&state, &spec, &runway).await
}

/// One station plus its latest sample.
async fn runway_latest(
    State(state): State<AppState>,
    Path(runway): Path<String>,
) -> Result<Response, AppError> {
    let spec = RouteSpec::measured(state.routes.policy_for(&runway), MeasurementMode::Latest);
    run(&state, &spec, &runway).await
}

/// One station plus the trailing two hours of samples.
async fn runway_history(
    State(state): State<AppState>,
    Path(runway): Path<String>,
) -> Result<Response, AppError> {
    let spec = RouteSpec::measured(state.routes.policy_for(&runway), MeasurementMode::Window);
    run(&state, &spec, &runway).await
}

async fn run(state: &AppState, spec: &RouteSpec, runway: &str) -> Result<Response, AppError> {
    let output = state.viewmondo.run(spec, runway).await?;
    Ok(render(output))
}

fn render(output: PipelineOutput) -> Response {
    match output {
        PipelineOutput::Listing(stations) => Json::<StationSet>(stations).into_response(),
        PipelineOutput::Station { station, measures } => {
            Json(RunwayResponse { station, measures }).into_response()
        }
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    Unauthorized { message: String },
    NotFound { message: String },
    Internal { message: String },
    /// Internal failure on an endpoint that speaks plain text.
    InternalText { message: String },
}

impl From<ViewMondoError> for AppError {
    fn from(e: ViewMondoError) -> Self {
        match e {
            ViewMondoError::Auth { .. } => AppError::Unauthorized {
                message: "Failed to get ViewMondo token".to_string(),
            },
            ViewMondoError::NotFound { query } => AppError::NotFound {
                message: format!("Station '{query}' not found"),
            },
            ViewMondoError::Timeout { .. } => AppError::Internal {
                message: "ViewMondo request timed out".to_string(),
            },
            ViewMondoError::Transport { .. } => AppError::Internal {
                message: "Unexpected error accessing ViewMondo".to_string(),
            },
            ViewMondoError::Upstream { stage, .. } => AppError::Internal {
                message: match stage {
                    Stage::Measurements => "Failed to fetch ViewMondo measurements",
                    _ => "Failed to fetch ViewMondo data",
                }
                .to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Unauthorized { message } => (StatusCode::UNAUTHORIZED, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
            AppError::InternalText { message } => {
                return (StatusCode::INTERNAL_SERVER_ERROR, message).into_response();
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::UpstreamError;

    #[test]
    fn auth_failure_maps_to_401() {
        let err = AppError::from(ViewMondoError::Auth {
            reason: "auth endpoint returned 400".into(),
        });
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn not_found_message_names_query() {
        let err = AppError::from(ViewMondoError::NotFound { query: "28".into() });
        match &err {
            AppError::NotFound { message } => assert_eq!(message, "Station '28' not found"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn upstream_failures_map_to_500_without_body() {
        let err = AppError::from(ViewMondoError::Upstream {
            stage: Stage::Stations,
            source: UpstreamError::Status {
                status: 502,
                body: "secret upstream detail".into(),
            },
        });
        match &err {
            AppError::Internal { message } => {
                assert_eq!(message, "Failed to fetch ViewMondo data");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn timeout_maps_to_500() {
        let err = AppError::from(ViewMondoError::Timeout {
            stage: Stage::Measurements,
        });
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
