//! Compatibility layer between device firmware quirks and strict parsing.
//!
//! Legacy and third-party firmwares ship pool URLs and temperature
//! configuration payloads that strict validation rejects for known,
//! repairable reasons. This module owns the repair-augmented parsers and
//! the single composition point where they replace the strict defaults:
//! [`install`] runs once at daemon startup, and every snapshot decode
//! after that goes through the repaired parsers returned by [`parsers`].

pub mod pool_url;
pub mod temperature;

use std::sync::OnceLock;

use serde_json::Value;

use crate::tracing::prelude::*;
use pool_url::PoolUrl;
use temperature::{TemperatureConfig, TemperatureConfigError};

/// The parsing hooks a device client uses while decoding a snapshot.
#[derive(Clone, Copy)]
pub struct Parsers {
    /// Pool connection string → structured record. `None` means the
    /// input was absent; an all-`None` record marks an invalid URL.
    pub pool_url: fn(&str) -> Option<PoolUrl>,

    /// Raw temperature configuration document → validated config.
    pub temperature: fn(&Value) -> Result<TemperatureConfig, TemperatureConfigError>,
}

impl Parsers {
    /// Strict parsing only: malformed pool URLs are dropped and invalid
    /// temperature documents are errors. What a client sees when
    /// [`install`] was never called, e.g. in library or test use.
    pub fn strict() -> Self {
        Self {
            pool_url: |raw| pool_url::parse_strict(raw).ok(),
            temperature: TemperatureConfig::parse_strict,
        }
    }

    /// Repair-augmented parsing: strict validation first, then the
    /// known-shape repairs from the submodules.
    pub fn lenient() -> Self {
        Self {
            pool_url: pool_url::resolve,
            temperature: TemperatureConfig::parse,
        }
    }
}

static INSTALLED: OnceLock<Parsers> = OnceLock::new();

/// Install the repair-augmented parsers process-wide. Idempotent, never
/// reversed. Must run before any snapshot is decoded so strict and
/// repaired parsing cannot mix within one process.
pub fn install() {
    INSTALLED.get_or_init(|| {
        info!("installing repair-augmented device parsers");
        Parsers::lenient()
    });
}

/// The process-wide parsers: the installed set, or the strict defaults
/// when [`install`] was never called.
pub fn parsers() -> Parsers {
    INSTALLED.get().copied().unwrap_or_else(Parsers::strict)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_is_idempotent_and_sticks() {
        install();
        install();
        // The installed hooks repair a scheme-less URL instead of
        // dropping it.
        let record = (parsers().pool_url)("//pool.example.com").unwrap();
        assert_eq!(record.host.as_deref(), Some("pool.example.com"));
    }

    #[test]
    fn strict_parsers_drop_what_lenient_ones_repair() {
        let strict = Parsers::strict();
        let lenient = Parsers::lenient();
        assert_eq!((strict.pool_url)("//pool.example.com"), None);
        assert!((lenient.pool_url)("//pool.example.com").is_some());

        let payload = serde_json::json!({"target_temp": 60.0});
        assert!((strict.temperature)(&payload).is_err());
        assert_eq!(
            (lenient.temperature)(&payload).unwrap().target_temp,
            Some(60)
        );
    }
}
