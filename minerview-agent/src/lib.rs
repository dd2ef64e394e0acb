//! minerview-agent: an HTTP telemetry gateway for mining devices.
//!
//! One endpoint, `GET /api/miners?ip=…`, queries the device at the given
//! address and returns a normalized telemetry record. The interesting
//! parts are the compatibility layer ([`compat`]), which repairs
//! malformed legacy payloads before strict validation, and the
//! normalization engine ([`normalize`]), which folds an inconsistently
//! populated device snapshot into one stable output schema.

pub mod api;
pub mod api_client;
pub mod compat;
pub mod config;
pub mod miner;
pub mod normalize;
pub mod tracing;
