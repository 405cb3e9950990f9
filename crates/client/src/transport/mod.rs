//! Transport layer for the Biodoc client.

pub mod http;

pub use http::{HttpTransport, RequestOptions};
