//! Configuration types for the Biodoc client.

use std::time::Duration;
use url::Url;

/// Agent name used when none is configured.
pub const DEFAULT_AGENT_NAME: &str = "mcp-agent";

/// Public Biodoc API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://biodoc.dev/api";

/// Who is calling the remote service.
///
/// Established once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Agent name, sent as `X-Agent-Name` and (without a token) as `?agent=`.
    pub agent_name: String,
    /// Model name, sent as `X-Model`.
    pub model: Option<String>,
    /// Bearer token. When present it supersedes the `agent` query parameter.
    pub token: Option<String>,
}

impl Identity {
    /// Create an identity with only an agent name.
    pub fn new(agent_name: impl Into<String>) -> Self {
        Self {
            agent_name: agent_name.into(),
            model: None,
            token: None,
        }
    }

    /// Set the model name. Empty values mean "no model".
    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model.filter(|m| !m.is_empty());
        self
    }

    /// Set the bearer token. Empty values mean "anonymous".
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    /// Whether requests are authenticated with a bearer token.
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::new(DEFAULT_AGENT_NAME)
    }
}

/// Configuration for the Biodoc client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the Biodoc API, including any path prefix.
    pub base_url: Url,
    /// Identity attached to every request.
    pub identity: Identity,
    /// Request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    /// Create a new configuration with the given base URL and the default identity.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            identity: Identity::default(),
            timeout: None,
        }
    }
}
