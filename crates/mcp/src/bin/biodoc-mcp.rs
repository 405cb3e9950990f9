// Standalone MCP server binary

use anyhow::{Context, Result};
use biodoc_client::BiodocClient;
use biodoc_mcp::tools::biodoc_registry;
use biodoc_mcp::{Config, McpServer};
use clap::Parser;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // --version and --help exit here, before logging or networking
    let config = Config::parse();

    // stdout carries protocol frames, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::info!("Biodoc MCP Server {} starting...", env!("CARGO_PKG_VERSION"));

    run(config).await.inspect_err(|e| {
        tracing::error!(error = %format!("{:#}", e), "Biodoc MCP Server failed");
    })
}

async fn run(config: Config) -> Result<()> {
    let client_config = config.client_config()?;
    tracing::info!(
        api = %client_config.base_url,
        agent = %client_config.identity.agent_name,
        authenticated = client_config.identity.has_token(),
        "Configured API client"
    );

    let client = BiodocClient::from_config(client_config).context("Failed to create API client")?;
    let registry = biodoc_registry(Arc::new(client));
    tracing::info!("Registered {} tools", registry.len());

    let server = McpServer::new(registry);
    server.start().await.context("MCP transport failed")?;

    Ok(())
}
