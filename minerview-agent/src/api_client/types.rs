//! API data transfer objects.
//!
//! These types define the API contract shared between the server and
//! clients.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Normalized telemetry for one device.
///
/// Every field is always present in the JSON encoding; values the device
/// did not report are null (or an empty list for the list fields).
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, ToSchema)]
pub struct NormalizedRecord {
    pub ip: Option<String>,
    pub hostname: Option<String>,
    pub mac: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub firmware: Option<String>,
    /// Instantaneous hashrate.
    pub hashrate_current: Option<f64>,
    /// Trailing-average hashrate.
    pub hashrate_avg: Option<f64>,
    pub expected_hashrate: Option<f64>,
    /// Aggregate chip temperature (°C); falls back through board, device
    /// average and ambient readings.
    pub temperature: Option<f64>,
    /// Hottest chip temperature (°C); only set when chip sensors exist.
    pub temperature_max: Option<f64>,
    /// Mean board temperature (°C).
    pub vr_temperature: Option<f64>,
    pub power_usage: Option<i64>,
    pub power_limit: Option<i64>,
    pub efficiency: Option<f64>,
    pub voltage: Option<f64>,
    pub fan_speeds: Vec<i64>,
    pub chip_count: Option<i64>,
    pub is_mining: Option<bool>,
    pub uptime: Option<i64>,
    pub errors: Vec<String>,
    pub pools: Vec<PoolEntry>,
    /// Display name of the first usable pool, `"No Pool"` when none
    /// exists, `"Unknown Pool"` when its URL defies parsing.
    pub primary_pool: String,
    pub api_version: Option<String>,
    pub timestamp: Option<i64>,
}

/// One reconciled pool entry.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, ToSchema)]
pub struct PoolEntry {
    pub url: Option<String>,
    pub user: Option<String>,
    /// The device's own status, `"configured"` for entries taken from
    /// configuration, or `"invalid"` when url or user is missing.
    pub status: Option<String>,
}

/// Successful device query envelope.
#[derive(Clone, Debug, Deserialize, Serialize, ToSchema)]
pub struct MinerQueryResponse {
    pub success: bool,
    pub ip: String,
    pub data: NormalizedRecord,
}

/// Failed device query envelope.
#[derive(Clone, Debug, Deserialize, Serialize, ToSchema)]
pub struct QueryErrorResponse {
    pub success: bool,
    pub error: String,
}

/// Missing or unusable request parameter.
#[derive(Clone, Debug, Deserialize, Serialize, ToSchema)]
pub struct ParamErrorResponse {
    pub error: String,
}
