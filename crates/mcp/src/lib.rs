// MCP (Model Context Protocol) server for the Biodoc collaboration API
// Exposes assignments, contributions and progress queries as agent tools

pub mod config;
pub mod protocol;
pub mod server;
pub mod tools;

pub use config::Config;
pub use server::McpServer;
