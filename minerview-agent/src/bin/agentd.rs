//! minerview-agentd: the telemetry gateway daemon.

use std::sync::Arc;

use anyhow::Result;

use minerview_agent::api::server::{self, SharedState};
use minerview_agent::compat;
use minerview_agent::config::AgentConfig;
use minerview_agent::miner::json_api::JsonApiClient;

#[tokio::main]
async fn main() -> Result<()> {
    minerview_agent::tracing::init();

    // Parser overrides must be in place before any request can reach a
    // device client.
    compat::install();

    let config = AgentConfig::from_env()?;
    let client = JsonApiClient::new(config.device_timeout)?;
    let state = SharedState {
        client: Arc::new(client),
    };

    server::serve(config.listen, state).await
}
