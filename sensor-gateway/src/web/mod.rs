//! Web layer for the sensor gateway.
//!
//! Exposes the weather, D-ATIS, and ViewMondo endpoints.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
