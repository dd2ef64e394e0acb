//! HTTP client for the agent's own API.
//!
//! Used by the CLI and by anything else that wants typed access to a
//! running agent daemon.

pub mod types;

use anyhow::{Result, bail};

use types::MinerQueryResponse;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5001";

pub struct Client {
    base_url: String,
    http: reqwest::Client,
}

impl Client {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    /// Query one device through the agent. Non-success statuses carry
    /// the agent's error body, surfaced in the returned error.
    pub async fn query(&self, ip: &str) -> Result<MinerQueryResponse> {
        let url = format!("{}/api/miners", self.base_url);
        let response = self.http.get(&url).query(&[("ip", ip)]).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("agent returned {status}: {body}");
        }
        Ok(response.json().await?)
    }

    /// Check that the agent is up.
    pub async fn health(&self) -> Result<String> {
        let url = format!("{}/api/health", self.base_url);
        Ok(self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?)
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}
