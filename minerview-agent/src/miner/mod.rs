//! Device communication boundary.
//!
//! The gateway does not speak miner management protocols itself; it
//! consumes this contract from a client implementation. [`MinerClient`]
//! opens a per-address session, the session yields one [`Snapshot`] per
//! fetch, and the snapshot decode path is where the compat parsers run.

pub mod json_api;
pub mod snapshot;

use async_trait::async_trait;
use thiserror::Error;

pub use snapshot::Snapshot;

#[derive(Debug, Error)]
pub enum MinerError {
    /// The device could not be reached at all.
    #[error("device unreachable: {0}")]
    Unreachable(String),

    /// The device answered with something other than the expected
    /// management responses, including configuration that failed both
    /// strict parsing and repair.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Local failure setting up the client, before any network I/O.
    #[error("client setup failed: {0}")]
    Setup(String),
}

/// A connected device session.
#[async_trait]
pub trait MinerHandle: Send + Sync {
    /// Take one telemetry snapshot from the device.
    async fn fetch_snapshot(&self) -> Result<Snapshot, MinerError>;
}

/// Factory for device sessions, one per queried address.
#[async_trait]
pub trait MinerClient: Send + Sync {
    /// Open a session with the device at `addr`.
    async fn connect(&self, addr: &str) -> Result<Box<dyn MinerHandle>, MinerError>;
}
