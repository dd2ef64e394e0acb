//! Tracing setup and prelude.
//!
//! Import `crate::tracing::prelude::*` for the level macros.

use tracing_subscriber::EnvFilter;

pub mod prelude {
    pub use ::tracing::{debug, error, info, trace, warn};
}

/// Install the global fmt subscriber. `RUST_LOG` overrides the default
/// `info` filter.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
