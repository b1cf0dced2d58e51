use std::process::ExitCode;

use sensor_gateway::config::GatewayConfig;
use sensor_gateway::logging::init_logging;
use sensor_gateway::web::{AppState, create_router};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    // Missing credentials are the only fatal condition.
    let config = match GatewayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let state = match AppState::from_config(&config) {
        Ok(state) => state,
        Err(e) => {
            error!("failed to create upstream client: {e}");
            return ExitCode::FAILURE;
        }
    };

    let app = create_router(state);

    let listener = match tokio::net::TcpListener::bind(config.listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("failed to bind {}: {e}", config.listen_addr);
            return ExitCode::FAILURE;
        }
    };

    info!("Sensor gateway listening on http://{}", config.listen_addr);
    info!("  GET /weather                      - AWOS values");
    info!("  GET /datis                        - D-ATIS text");
    info!("  GET /viewmondo                    - all ViewMondo stations");
    info!("  GET /viewmondo/{{runway}}           - one station");
    info!("  GET /viewmondo/{{runway}}/latest    - station + latest sample");
    info!("  GET /viewmondo/{{runway}}/history   - station + last two hours");

    if let Err(e) = axum::serve(listener, app).await {
        error!("server error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
