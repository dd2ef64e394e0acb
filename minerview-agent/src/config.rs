//! Daemon configuration from the environment.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_LISTEN: &str = "0.0.0.0:5001";
const DEFAULT_DEVICE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Socket address the API server binds.
    pub listen: SocketAddr,
    /// Upper bound on one device request.
    pub device_timeout: Duration,
}

impl AgentConfig {
    /// Read configuration from `MINERVIEW_*` environment variables,
    /// falling back to defaults.
    pub fn from_env() -> Result<Self> {
        let listen = env::var("MINERVIEW_LISTEN").unwrap_or_else(|_| DEFAULT_LISTEN.to_string());
        let listen = listen
            .parse()
            .with_context(|| format!("invalid MINERVIEW_LISTEN {listen:?}"))?;

        let device_timeout = match env::var("MINERVIEW_DEVICE_TIMEOUT_SECS") {
            Ok(raw) => Duration::from_secs(
                raw.parse()
                    .with_context(|| format!("invalid MINERVIEW_DEVICE_TIMEOUT_SECS {raw:?}"))?,
            ),
            Err(_) => DEFAULT_DEVICE_TIMEOUT,
        };

        Ok(Self {
            listen,
            device_timeout,
        })
    }
}
