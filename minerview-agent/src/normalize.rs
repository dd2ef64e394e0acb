//! Snapshot normalization.
//!
//! Maps a partially-populated device snapshot onto the fixed output
//! schema. [`normalize`] is total over every combination of present and
//! absent fields: a value that cannot be converted degrades to null on
//! its own, it never fails the record.

use url::Url;

use crate::api_client::types::{NormalizedRecord, PoolEntry};
use crate::compat::pool_url::PoolUrl;
use crate::miner::snapshot::Snapshot;

/// Shown when no pool entry survives reconciliation.
const NO_POOL: &str = "No Pool";
/// Shown when the primary pool URL cannot be parsed.
const UNKNOWN_POOL: &str = "Unknown Pool";
/// Status for entries missing a URL or user.
const STATUS_INVALID: &str = "invalid";
/// Status for entries taken from configuration rather than a live
/// connection.
const STATUS_CONFIGURED: &str = "configured";

pub fn normalize(snapshot: &Snapshot) -> NormalizedRecord {
    let (temperature, temperature_max, vr_temperature) = temperatures(snapshot);
    let pools = reconcile_pools(snapshot);
    let primary_pool = primary_pool(&pools);

    NormalizedRecord {
        ip: snapshot.ip.clone(),
        hostname: snapshot.hostname.clone(),
        mac: snapshot.mac.clone(),
        make: snapshot.make.clone(),
        model: snapshot.model.clone(),
        firmware: snapshot.firmware_version.clone(),
        hashrate_current: safe_float(snapshot.raw_hashrate.map(|r| r.rate)),
        hashrate_avg: safe_float(snapshot.hashrate.map(|r| r.rate)),
        expected_hashrate: safe_float(snapshot.expected_hashrate.map(|r| r.rate)),
        temperature,
        temperature_max,
        vr_temperature,
        power_usage: safe_int(snapshot.wattage),
        power_limit: safe_int(snapshot.wattage_limit),
        efficiency: safe_float(snapshot.efficiency_fract),
        voltage: safe_float(snapshot.voltage),
        fan_speeds: snapshot.fans.iter().filter_map(|fan| fan.speed).collect(),
        chip_count: snapshot.total_chips,
        is_mining: snapshot.is_mining,
        uptime: snapshot.uptime,
        errors: snapshot.errors.clone(),
        pools,
        primary_pool,
        api_version: snapshot.api_version.clone(),
        timestamp: snapshot.timestamp,
    }
}

/// Nearest integer, or None when the value is absent or not finite.
fn safe_int(value: Option<f64>) -> Option<i64> {
    value.filter(|v| v.is_finite()).map(|v| v.round() as i64)
}

/// Two-decimal rounding, or None when the value is absent or not finite.
fn safe_float(value: Option<f64>) -> Option<f64> {
    value
        .filter(|v| v.is_finite())
        .map(|v| (v * 100.0).round() / 100.0)
}

/// Ordered temperature fallback: chip-sensor mean (with max), first
/// board sensor, device-reported average, ambient, null. The board
/// (VR) mean is derived independently of the chain.
fn temperatures(snapshot: &Snapshot) -> (Option<f64>, Option<f64>, Option<f64>) {
    let chip_temps: Vec<f64> = snapshot
        .hashboards
        .iter()
        .filter_map(|board| board.chip_temp)
        .collect();
    let board_temps: Vec<f64> = snapshot
        .hashboards
        .iter()
        .filter_map(|board| board.board_temp)
        .collect();

    let mut temperature = None;
    let mut temperature_max = None;
    if !chip_temps.is_empty() {
        temperature = safe_float(Some(mean(&chip_temps)));
        temperature_max = safe_float(chip_temps.iter().copied().reduce(f64::max));
    } else if let Some(first) = board_temps.first() {
        temperature = safe_float(Some(*first));
    }
    if temperature.is_none() {
        temperature = safe_float(snapshot.temperature_avg);
    }
    if temperature.is_none() {
        temperature = safe_float(snapshot.env_temp);
    }

    let vr_temperature = if board_temps.is_empty() {
        None
    } else {
        safe_float(Some(mean(&board_temps)))
    };

    (temperature, temperature_max, vr_temperature)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Pool reconciliation: the live pool list when the device reports one,
/// otherwise the configured pool groups, otherwise nothing.
fn reconcile_pools(snapshot: &Snapshot) -> Vec<PoolEntry> {
    let mut entries: Vec<PoolEntry> = snapshot
        .pools
        .iter()
        .map(|pool| pool_entry(pool.url.as_ref(), pool.user.clone(), pool.status.clone()))
        .collect();

    if entries.is_empty() {
        if let Some(config) = &snapshot.config {
            for group in &config.pool_groups {
                for pool in &group.pools {
                    entries.push(pool_entry(
                        pool.url.as_ref(),
                        pool.user.clone(),
                        Some(STATUS_CONFIGURED.to_string()),
                    ));
                }
            }
        }
    }

    entries
}

/// Stringify the URL and force `"invalid"` when the URL or the user is
/// missing, whatever the original status said. The invalid-URL marker
/// contributes no endpoint and so falls under the same rule.
fn pool_entry(url: Option<&PoolUrl>, user: Option<String>, status: Option<String>) -> PoolEntry {
    let url = url
        .filter(|record| !record.is_invalid())
        .and_then(PoolUrl::endpoint);
    let status = if url.is_none() || user.as_deref().is_none_or(str::is_empty) {
        Some(STATUS_INVALID.to_string())
    } else {
        status
    };
    PoolEntry { url, user, status }
}

/// First non-invalid entry with a URL decides the primary pool name;
/// `"No Pool"` when none qualifies, `"Unknown Pool"` when the winning
/// URL cannot be parsed.
fn primary_pool(pools: &[PoolEntry]) -> String {
    let candidate = pools.iter().find(|pool| {
        pool.status.as_deref() != Some(STATUS_INVALID)
            && pool.url.as_deref().is_some_and(|url| !url.is_empty())
    });
    let Some(url) = candidate.and_then(|pool| pool.url.as_deref()) else {
        return NO_POOL.to_string();
    };
    pool_display_name(url).unwrap_or_else(|| UNKNOWN_POOL.to_string())
}

/// Display name from a pool URL: hostname without a leading `www.`, cut
/// at the first dot, title-cased.
fn pool_display_name(url: &str) -> Option<String> {
    let prefixed = if url.starts_with("http") || url.starts_with("stratum") {
        url.to_string()
    } else {
        format!("stratum+tcp://{url}")
    };
    let parsed = Url::parse(&prefixed).ok()?;
    let host = parsed.host_str()?;
    let name = host.strip_prefix("www.").unwrap_or(host);
    let name = name.split('.').next().unwrap_or(name);
    Some(title_case(name))
}

/// Title case in the Python sense: a letter is uppercased when it does
/// not follow another letter, lowercased otherwise ("f2pool" → "F2Pool").
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
