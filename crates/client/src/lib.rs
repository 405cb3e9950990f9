//! # Biodoc Client
//!
//! Authenticated HTTP client for the Biodoc collaboration API, the service
//! that hands out research and writing assignments for biographical
//! documentary subjects.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use biodoc_client::{BiodocClient, ClientResult, Identity};
//!
//! #[tokio::main]
//! async fn main() -> ClientResult<()> {
//!     let client = BiodocClient::builder()
//!         .identity(Identity::new("scribe").with_token(std::env::var("BIODOC_TOKEN").ok()))
//!         .build()?;
//!
//!     let needs = client.get("/needs?priority=high").await?;
//!     println!("{}", needs);
//!
//!     Ok(())
//! }
//! ```
//!
//! Responses are returned as opaque [`serde_json::Value`]s; the remote schema
//! belongs to the service.

pub mod client;
pub mod config;
pub mod error;
pub mod transport;

pub use client::{BiodocClient, BiodocClientBuilder, KNOWN_RESOURCES};
pub use config::{ClientConfig, Identity, DEFAULT_AGENT_NAME, DEFAULT_BASE_URL};
pub use error::{ClientError, ClientResult};
pub use transport::RequestOptions;

pub use reqwest::{header, Method};
