//! Raw telemetry snapshot types.
//!
//! A snapshot is one point-in-time reading from a device. Firmwares
//! differ in which fields they populate, so every field is optional
//! (lists are simply empty) and an absent field means the same thing as
//! an explicit null on the wire.

use crate::compat::pool_url::PoolUrl;
use crate::compat::temperature::TemperatureConfig;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    pub ip: Option<String>,
    pub hostname: Option<String>,
    pub mac: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub firmware_version: Option<String>,

    /// Instantaneous hashrate as reported by the device.
    pub raw_hashrate: Option<HashrateReading>,
    /// Trailing-average hashrate.
    pub hashrate: Option<HashrateReading>,
    /// Nameplate or tuned expectation, not a measurement.
    pub expected_hashrate: Option<HashrateReading>,

    pub hashboards: Vec<Hashboard>,
    pub fans: Vec<Fan>,

    pub wattage: Option<f64>,
    pub wattage_limit: Option<f64>,
    pub efficiency_fract: Option<f64>,
    pub voltage: Option<f64>,
    pub total_chips: Option<i64>,
    pub is_mining: Option<bool>,
    /// Seconds since the device booted.
    pub uptime: Option<i64>,
    pub errors: Vec<String>,

    /// Live pool connections. Empty when the firmware only reports
    /// configured pools (see `config`).
    pub pools: Vec<PoolReading>,
    pub config: Option<MinerConfig>,

    /// Average temperature some firmwares expose when per-board sensors
    /// are not readable.
    pub temperature_avg: Option<f64>,
    /// Ambient/enclosure temperature.
    pub env_temp: Option<f64>,

    pub api_version: Option<String>,
    /// Unix timestamp of the reading.
    pub timestamp: Option<i64>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HashrateReading {
    /// Rate in the device's reporting unit.
    pub rate: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Hashboard {
    pub chip_temp: Option<f64>,
    pub board_temp: Option<f64>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Fan {
    /// RPM, when the tach line is readable.
    pub speed: Option<i64>,
}

/// One live pool connection.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PoolReading {
    pub url: Option<PoolUrl>,
    pub user: Option<String>,
    pub status: Option<String>,
}

/// Configured (not necessarily live) miner settings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MinerConfig {
    pub pool_groups: Vec<PoolGroup>,
    pub temperature: Option<TemperatureConfig>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PoolGroup {
    pub pools: Vec<ConfiguredPool>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfiguredPool {
    pub url: Option<PoolUrl>,
    pub user: Option<String>,
}
