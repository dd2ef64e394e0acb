//! Default device client: JSON telemetry over HTTP.
//!
//! Modern miner firmwares expose a summary document as JSON over HTTP;
//! this client fetches that single document and decodes it into a
//! [`Snapshot`]. Pool URLs and the temperature configuration section
//! arrive as untyped data and go through the injected compat parsers, so
//! legacy payload quirks are repaired during the decode rather than
//! surfacing as per-request failures.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use time::OffsetDateTime;
use url::Url;

use crate::compat::{self, Parsers};
use crate::tracing::prelude::*;

use super::snapshot::{
    ConfiguredPool, Fan, Hashboard, HashrateReading, MinerConfig, PoolGroup, PoolReading,
};
use super::{MinerClient, MinerError, MinerHandle, Snapshot};

/// Path of the summary document on the device.
const SUMMARY_PATH: &str = "/api/v1/summary";

pub struct JsonApiClient {
    http: reqwest::Client,
    parsers: Parsers,
}

impl JsonApiClient {
    /// Client using the process-wide installed parsers and the given
    /// per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, MinerError> {
        Self::with_parsers(timeout, compat::parsers())
    }

    /// Client with explicitly injected parsers.
    pub fn with_parsers(timeout: Duration, parsers: Parsers) -> Result<Self, MinerError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MinerError::Setup(e.to_string()))?;
        Ok(Self { http, parsers })
    }
}

#[async_trait]
impl MinerClient for JsonApiClient {
    async fn connect(&self, addr: &str) -> Result<Box<dyn MinerHandle>, MinerError> {
        let base = Url::parse(&format!("http://{addr}"))
            .map_err(|e| MinerError::Unreachable(format!("bad device address {addr:?}: {e}")))?;
        debug!("opening device session with {base}");
        Ok(Box::new(JsonApiHandle {
            http: self.http.clone(),
            base,
            parsers: self.parsers,
        }))
    }
}

struct JsonApiHandle {
    http: reqwest::Client,
    base: Url,
    parsers: Parsers,
}

#[async_trait]
impl MinerHandle for JsonApiHandle {
    async fn fetch_snapshot(&self) -> Result<Snapshot, MinerError> {
        let url = self
            .base
            .join(SUMMARY_PATH)
            .map_err(|e| MinerError::Protocol(e.to_string()))?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| MinerError::Unreachable(e.to_string()))?
            .error_for_status()
            .map_err(|e| MinerError::Protocol(e.to_string()))?;
        let raw: RawSummary = response
            .json()
            .await
            .map_err(|e| MinerError::Protocol(e.to_string()))?;
        trace!("summary document fetched from {}", self.base);
        decode(raw, &self.parsers)
    }
}

/// Wire shape of the summary document. Everything is optional; absent
/// and explicit null are the same thing.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSummary {
    ip: Option<String>,
    hostname: Option<String>,
    mac: Option<String>,
    make: Option<String>,
    model: Option<String>,
    fw_ver: Option<String>,
    raw_hashrate: Option<RawHashrate>,
    hashrate: Option<RawHashrate>,
    expected_hashrate: Option<RawHashrate>,
    hashboards: Option<Vec<RawHashboard>>,
    fans: Option<Vec<RawFan>>,
    wattage: Option<f64>,
    wattage_limit: Option<f64>,
    efficiency_fract: Option<f64>,
    voltage: Option<f64>,
    total_chips: Option<i64>,
    is_mining: Option<bool>,
    uptime: Option<i64>,
    errors: Option<Vec<String>>,
    pools: Option<Vec<RawPool>>,
    config: Option<RawConfig>,
    temperature_avg: Option<f64>,
    env_temp: Option<f64>,
    api_ver: Option<String>,
    timestamp: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawHashrate {
    rate: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawHashboard {
    chip_temp: Option<f64>,
    temp: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFan {
    speed: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPool {
    url: Option<String>,
    user: Option<String>,
    status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    pools: Option<RawPoolSettings>,
    temperature: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPoolSettings {
    groups: Option<Vec<RawPoolGroup>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPoolGroup {
    pools: Option<Vec<RawConfiguredPool>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfiguredPool {
    url: Option<String>,
    user: Option<String>,
}

fn decode(raw: RawSummary, parsers: &Parsers) -> Result<Snapshot, MinerError> {
    let config = match raw.config {
        Some(config) => Some(decode_config(config, parsers)?),
        None => None,
    };

    // Devices without a clock report no timestamp; stamp the reading
    // ourselves so downstream consumers always get one.
    let timestamp = raw
        .timestamp
        .or_else(|| Some(OffsetDateTime::now_utc().unix_timestamp()));

    Ok(Snapshot {
        ip: raw.ip,
        hostname: raw.hostname,
        mac: raw.mac,
        make: raw.make,
        model: raw.model,
        firmware_version: raw.fw_ver,
        raw_hashrate: decode_hashrate(raw.raw_hashrate),
        hashrate: decode_hashrate(raw.hashrate),
        expected_hashrate: decode_hashrate(raw.expected_hashrate),
        hashboards: raw
            .hashboards
            .unwrap_or_default()
            .into_iter()
            .map(|board| Hashboard {
                chip_temp: board.chip_temp,
                board_temp: board.temp,
            })
            .collect(),
        fans: raw
            .fans
            .unwrap_or_default()
            .into_iter()
            .map(|fan| Fan { speed: fan.speed })
            .collect(),
        wattage: raw.wattage,
        wattage_limit: raw.wattage_limit,
        efficiency_fract: raw.efficiency_fract,
        voltage: raw.voltage,
        total_chips: raw.total_chips,
        is_mining: raw.is_mining,
        uptime: raw.uptime,
        errors: raw.errors.unwrap_or_default(),
        pools: raw
            .pools
            .unwrap_or_default()
            .into_iter()
            .map(|pool| PoolReading {
                url: pool.url.as_deref().and_then(parsers.pool_url),
                user: pool.user,
                status: pool.status,
            })
            .collect(),
        config,
        temperature_avg: raw.temperature_avg,
        env_temp: raw.env_temp,
        api_version: raw.api_ver,
        timestamp,
    })
}

fn decode_hashrate(raw: Option<RawHashrate>) -> Option<HashrateReading> {
    raw.and_then(|reading| reading.rate)
        .map(|rate| HashrateReading { rate })
}

/// Decode the nested configuration. Temperature settings that fail both
/// strict parsing and repair poison the whole fetch: a half-validated
/// config must not masquerade as a good snapshot.
fn decode_config(raw: RawConfig, parsers: &Parsers) -> Result<MinerConfig, MinerError> {
    let temperature = match raw.temperature {
        Some(value) => Some(
            (parsers.temperature)(&value)
                .map_err(|e| MinerError::Protocol(format!("temperature config: {e}")))?,
        ),
        None => None,
    };

    let pool_groups = raw
        .pools
        .and_then(|settings| settings.groups)
        .unwrap_or_default()
        .into_iter()
        .map(|group| PoolGroup {
            pools: group
                .pools
                .unwrap_or_default()
                .into_iter()
                .map(|pool| ConfiguredPool {
                    url: pool.url.as_deref().and_then(parsers.pool_url),
                    user: pool.user,
                })
                .collect(),
        })
        .collect();

    Ok(MinerConfig {
        pool_groups,
        temperature,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawSummary {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn decode_repairs_legacy_pool_urls() {
        let summary = raw(json!({
            "pools": [{"url": "//pool.example.com", "user": "worker", "status": "ok"}],
        }));
        let snapshot = decode(summary, &Parsers::lenient()).unwrap();
        let url = snapshot.pools[0].url.as_ref().unwrap();
        assert_eq!(url.scheme.as_deref(), Some("stratum+tcp"));
        assert_eq!(url.port, Some(4444));
    }

    #[test]
    fn decode_repairs_float_temperature_config() {
        let summary = raw(json!({
            "config": {"temperature": {"target_temp": 75.0, "hot_temp": 85.0}},
        }));
        let snapshot = decode(summary, &Parsers::lenient()).unwrap();
        let temperature = snapshot.config.unwrap().temperature.unwrap();
        assert_eq!(temperature.target_temp, Some(75));
        assert_eq!(temperature.hot_temp, Some(85));
    }

    #[test]
    fn decode_fails_when_temperature_repair_is_exhausted() {
        let summary = raw(json!({
            "config": {"temperature": {"target_temp": "hot"}},
        }));
        let err = decode(summary, &Parsers::lenient()).unwrap_err();
        assert!(matches!(err, MinerError::Protocol(_)));
    }

    #[test]
    fn decode_tolerates_an_empty_document() {
        let snapshot = decode(raw(json!({})), &Parsers::lenient()).unwrap();
        assert_eq!(snapshot.hashboards, vec![]);
        assert_eq!(snapshot.pools, vec![]);
        assert_eq!(snapshot.ip, None);
        // Fetch time is stamped when the device reports none.
        assert!(snapshot.timestamp.is_some());
    }

    #[test]
    fn decode_maps_configured_pool_groups() {
        let summary = raw(json!({
            "config": {"pools": {"groups": [
                {"pools": [{"url": "stratum+tcp://pool.example.com:3333", "user": "w"}]},
            ]}},
        }));
        let snapshot = decode(summary, &Parsers::lenient()).unwrap();
        let groups = &snapshot.config.unwrap().pool_groups;
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].pools[0].user.as_deref(), Some("w"));
    }
}
