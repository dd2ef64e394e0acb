//! HTTP API for the telemetry gateway.

pub mod handlers;
pub mod server;
