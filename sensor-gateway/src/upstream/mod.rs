//! Outbound HTTP transport shared by every upstream integration.
//!
//! All third-party calls go through [`UpstreamClient`], which applies the
//! per-stage timeout, caps the number of requests in flight, and turns
//! reqwest failures into [`UpstreamError`].

mod client;
mod error;

pub use client::UpstreamClient;
pub use error::UpstreamError;
