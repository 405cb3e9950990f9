//! Main client for the Biodoc API.

use crate::config::{ClientConfig, Identity, DEFAULT_BASE_URL};
use crate::error::{ClientError, ClientResult};
use crate::transport::{HttpTransport, RequestOptions};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// First path segments the remote API serves.
pub const KNOWN_RESOURCES: &[&str] = &[
    "assignment",
    "contribute",
    "review",
    "people",
    "needs",
    "contributions",
    "leaderboard",
    "confidence",
];

/// Client for the Biodoc collaboration API.
///
/// Stateless apart from the immutable configuration; cheap to clone and safe
/// to share between concurrent calls.
#[derive(Clone, Debug)]
pub struct BiodocClient {
    config: Arc<ClientConfig>,
    http: HttpTransport,
}

impl BiodocClient {
    /// Create a new client builder.
    pub fn builder() -> BiodocClientBuilder {
        BiodocClientBuilder::new()
    }

    /// Create a client from configuration.
    ///
    /// The base URL must be able to carry a path (`http://host/api`, not `mailto:x`).
    pub fn from_config(config: ClientConfig) -> ClientResult<Self> {
        if config.base_url.cannot_be_a_base() {
            return Err(ClientError::Config(format!(
                "base_url must be an absolute http(s) URL, got {}",
                config.base_url
            )));
        }

        let config = Arc::new(config);
        let http = HttpTransport::new(config.clone())?;

        Ok(Self { config, http })
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Perform one call against `path`, which must start with a known resource.
    pub async fn request(&self, path: &str, options: RequestOptions) -> ClientResult<Value> {
        validate_path(path)?;
        self.http.execute(path, options).await
    }

    /// Execute a GET request.
    pub async fn get(&self, path: &str) -> ClientResult<Value> {
        self.request(path, RequestOptions::get()).await
    }

    /// Execute a POST request with a JSON body.
    pub async fn post<B: Serialize>(&self, path: &str, body: &B) -> ClientResult<Value> {
        let body = serde_json::to_value(body)
            .map_err(|e| ClientError::Config(format!("Request body is not JSON: {}", e)))?;
        self.request(path, RequestOptions::post(body)).await
    }
}

/// Check that `path` starts with a known resource and has no `.`/`..` segments.
pub(crate) fn validate_path(path: &str) -> ClientResult<()> {
    let rest = path
        .strip_prefix('/')
        .ok_or_else(|| ClientError::InvalidPath(path.to_string()))?;
    let path_only = rest.split('?').next().unwrap_or_default();
    let mut segments = path_only.split('/');
    let resource = segments.next().unwrap_or_default();

    if !KNOWN_RESOURCES.contains(&resource) {
        return Err(ClientError::InvalidPath(path.to_string()));
    }
    if segments.any(|segment| is_dot_segment(segment)) {
        return Err(ClientError::InvalidPath(path.to_string()));
    }
    Ok(())
}

/// `.` and `..`, including their percent-encoded forms, which URL parsing collapses.
fn is_dot_segment(segment: &str) -> bool {
    matches!(
        segment.to_ascii_lowercase().as_str(),
        "." | ".." | "%2e" | "%2e." | ".%2e" | "%2e%2e"
    )
}

/// Builder for creating a BiodocClient.
pub struct BiodocClientBuilder {
    base_url: String,
    identity: Identity,
    timeout: Option<Duration>,
}

impl BiodocClientBuilder {
    /// Create a new builder pointing at the public API.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            identity: Identity::default(),
            timeout: None,
        }
    }

    /// Set the base URL of the Biodoc API.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the identity attached to every request.
    pub fn identity(mut self, identity: Identity) -> Self {
        self.identity = identity;
        self
    }

    /// Set the request timeout. Without one, calls wait indefinitely.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> ClientResult<BiodocClient> {
        let base_url = Url::parse(&self.base_url)?;

        BiodocClient::from_config(ClientConfig {
            base_url,
            identity: self.identity,
            timeout: self.timeout,
        })
    }
}

impl Default for BiodocClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_validate_path_accepts_known_resources() {
        assert!(validate_path("/assignment/ada-lovelace").is_ok());
        assert!(validate_path("/people").is_ok());
        assert!(validate_path("/people?tag=Music").is_ok());
        assert!(validate_path("/contributions?status=pending").is_ok());
    }

    #[test]
    fn test_validate_path_rejects_unknown_or_relative() {
        assert!(matches!(
            validate_path("/admin/users"),
            Err(ClientError::InvalidPath(_))
        ));
        assert!(matches!(
            validate_path("people"),
            Err(ClientError::InvalidPath(_))
        ));
        assert!(matches!(validate_path("/"), Err(ClientError::InvalidPath(_))));
        assert!(matches!(
            validate_path("/peoples"),
            Err(ClientError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_validate_path_rejects_dot_segments() {
        for path in [
            "/assignment/..",
            "/confidence/.",
            "/people/%2E%2E",
            "/review/.%2e?agent=x",
            "/contribute/../admin",
        ] {
            assert!(
                matches!(validate_path(path), Err(ClientError::InvalidPath(_))),
                "{} should be rejected",
                path
            );
        }
        assert!(validate_path("/people/j.r.r-tolkien").is_ok());
    }

    #[test]
    fn test_from_config_rejects_non_base_url() {
        let config = ClientConfig::new(Url::parse("mailto:someone").unwrap());

        let result = BiodocClient::from_config(config);
        assert!(matches!(result, Err(ClientError::Config(_))));
    }

    #[test]
    fn test_builder_defaults() {
        let client = BiodocClient::builder().build().unwrap();

        assert_eq!(client.config().base_url.as_str(), "https://biodoc.dev/api");
        assert_eq!(client.config().identity.agent_name, "mcp-agent");
        assert!(client.config().timeout.is_none());
    }

    #[test]
    fn test_builder_rejects_bad_url() {
        let result = BiodocClient::builder().base_url("not a url").build();
        assert!(matches!(result, Err(ClientError::InvalidUrl(_))));

        let result = BiodocClient::builder().base_url("mailto:someone").build();
        assert!(matches!(result, Err(ClientError::Config(_))));
    }

    #[tokio::test]
    async fn test_unknown_path_never_hits_network() {
        let server = MockServer::start().await;

        let client = BiodocClient::builder()
            .base_url(server.uri())
            .build()
            .unwrap();

        let result = client.get("/admin").await;
        assert!(matches!(result, Err(ClientError::InvalidPath(_))));

        let result = client.post("/contribute/..", &json!({"type": "fact"})).await;
        assert!(matches!(result, Err(ClientError::InvalidPath(_))));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_and_post() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/review/ada-lovelace"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"phase": "research"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/contribute/ada-lovelace"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accepted": true})))
            .mount(&server)
            .await;

        let client = BiodocClient::builder()
            .base_url(server.uri())
            .identity(Identity::new("scribe"))
            .build()
            .unwrap();

        let review = client.get("/review/ada-lovelace").await.unwrap();
        assert_eq!(review["phase"], "research");

        let submitted = client
            .post("/contribute/ada-lovelace", &json!({"type": "fact", "content": "x"}))
            .await
            .unwrap();
        assert_eq!(submitted["accepted"], true);
    }
}
