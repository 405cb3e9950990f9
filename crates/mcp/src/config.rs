use anyhow::{ensure, Context, Result};
use biodoc_client::{ClientConfig, Identity, DEFAULT_AGENT_NAME, DEFAULT_BASE_URL};
use clap::Parser;
use std::time::Duration;

/// Process configuration, read once at startup from flags or the environment.
#[derive(Parser, Debug, Clone)]
#[command(name = "biodoc-mcp", version)]
#[command(about = "MCP server exposing the Biodoc documentary collaboration API", long_about = None)]
pub struct Config {
    /// Agent name reported to the API
    #[arg(long, env = "BIODOC_AGENT_NAME", default_value = DEFAULT_AGENT_NAME)]
    pub agent_name: String,

    /// Model name reported to the API
    #[arg(long, env = "BIODOC_MODEL")]
    pub model: Option<String>,

    /// Bearer token; without one, calls are identified by agent name only
    #[arg(long, env = "BIODOC_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Base URL of the Biodoc API
    #[arg(long, env = "BIODOC_API_URL", default_value = DEFAULT_BASE_URL)]
    pub api_url: String,

    /// Give up on API calls after this many seconds (default: wait indefinitely)
    #[arg(long, env = "BIODOC_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,
}

impl Config {
    pub fn identity(&self) -> Identity {
        Identity::new(self.agent_name.clone())
            .with_model(self.model.clone())
            .with_token(self.token.clone())
    }

    pub fn client_config(&self) -> Result<ClientConfig> {
        let base_url = url::Url::parse(&self.api_url)
            .with_context(|| format!("Invalid API URL: {}", self.api_url))?;
        ensure!(
            !base_url.cannot_be_a_base(),
            "Invalid API URL: {} cannot carry a request path",
            self.api_url
        );

        Ok(ClientConfig {
            base_url,
            identity: self.identity(),
            timeout: self.timeout_secs.map(Duration::from_secs),
        })
    }
}
