//! HTTP transport layer for the Biodoc client.

use crate::client::validate_path;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use reqwest::{header, Client, Method};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Header carrying the agent name.
pub const AGENT_NAME_HEADER: &str = "x-agent-name";

/// Header carrying the model name.
pub const MODEL_HEADER: &str = "x-model";

/// One outbound call: method, optional JSON body, extra headers.
///
/// Extra headers win over the identity headers installed on the transport.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    pub headers: header::HeaderMap,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post(body: Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
            headers: header::HeaderMap::new(),
        }
    }

    /// Add or replace a header for this request only.
    pub fn header(mut self, name: header::HeaderName, value: header::HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// HTTP transport for making API requests.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: Arc<ClientConfig>,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given configuration.
    pub fn new(config: Arc<ClientConfig>) -> ClientResult<Self> {
        let identity = &config.identity;
        let mut headers = header::HeaderMap::new();

        headers.insert(
            header::HeaderName::from_static(AGENT_NAME_HEADER),
            header::HeaderValue::from_str(&identity.agent_name)
                .map_err(|_| ClientError::Config("Invalid agent name format".to_string()))?,
        );

        if let Some(ref model) = identity.model {
            headers.insert(
                header::HeaderName::from_static(MODEL_HEADER),
                header::HeaderValue::from_str(model)
                    .map_err(|_| ClientError::Config("Invalid model name format".to_string()))?,
            );
        }

        if let Some(ref token) = identity.token {
            let mut value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ClientError::Config("Invalid token format".to_string()))?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }

        let mut builder = Client::builder()
            .user_agent(concat!("biodoc-client/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, config })
    }

    /// Build a URL for the given path.
    ///
    /// The path is appended to the base URL (keeping any prefix such as `/api`).
    /// The path is checked both as given and after URL parsing, which
    /// collapses dot segments, so a request cannot leave its resource.
    /// Without a bearer token the agent name is added as the `agent` query
    /// parameter.
    pub(crate) fn build_url(&self, path: &str) -> ClientResult<url::Url> {
        validate_path(path)?;
        let base = self.config.base_url.as_str().trim_end_matches('/');
        let mut url = url::Url::parse(&format!("{}{}", base, path))?;

        let base_path = self.config.base_url.path().trim_end_matches('/');
        let resolved = url
            .path()
            .strip_prefix(base_path)
            .ok_or_else(|| ClientError::InvalidPath(path.to_string()))?;
        validate_path(resolved).map_err(|_| ClientError::InvalidPath(path.to_string()))?;

        if !self.config.identity.has_token() {
            url.query_pairs_mut()
                .append_pair("agent", &self.config.identity.agent_name);
        }

        Ok(url)
    }

    /// Send one request and parse the response body as JSON.
    pub async fn execute(&self, path: &str, options: RequestOptions) -> ClientResult<Value> {
        let url = self.build_url(path)?;
        debug!(method = %options.method, url = %url, "API request");

        let mut request = self
            .client
            .request(options.method.clone(), url)
            .headers(options.headers);
        if let Some(ref body) = options.body {
            request = request.json(body);
        }

        let response = request.send().await.inspect_err(|e| {
            warn!(method = %options.method, path, error = %e, "API request failed to send");
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                method = %options.method,
                path,
                status = status.as_u16(),
                "API returned an error status"
            );
            return Err(ClientError::from_response(status.as_u16(), body));
        }

        let body = response.json().await?;
        Ok(body)
    }
}
