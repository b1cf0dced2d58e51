//! Aeronautical sensor gateway.
//!
//! Aggregates Keflavík AWOS weather, BIKF D-ATIS text, and ViewMondo
//! runway-station telemetry behind one small HTTP API.

pub mod config;
pub mod feeds;
pub mod logging;
pub mod upstream;
pub mod viewmondo;
pub mod web;
