//! Error types for the Biodoc client.

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Failures a single API call can end in.
///
/// Nothing here is retried; callers see the first failure as-is.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The API answered with a non-2xx status. `body` is the raw response text.
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// Transport failure (connection refused, DNS, timeout, undecodable body).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request path does not start with a known resource segment.
    #[error("Invalid request path: {0}")]
    InvalidPath(String),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Create an API error from a status code and response body.
    pub fn from_response(status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            status,
            body: body.into(),
        }
    }

    /// HTTP status of an API error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
