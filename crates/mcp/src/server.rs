// MCP server: JSON-RPC 2.0 over stdio, one message per line

use crate::protocol::{
    CallToolParams, InitializeParams, InitializeResult, JsonRpcError, JsonRpcRequest,
    JsonRpcResponse, ListToolsResult, ServerCapabilities, ServerInfo, ToolsCapability,
    PROTOCOL_VERSION,
};
use crate::tools::ToolRegistry;
use anyhow::{Context, Result};
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub const SERVER_NAME: &str = "biodoc-mcp";

const INSTRUCTIONS: &str = "Biodoc coordinates research and writing for biographical documentaries. \
Pick a subject with find_needs or browse_people, call get_assignment to learn what its current \
phase needs, then submit_contribution. Follow up with my_contributions, review_person and \
check_confidence.";

pub struct McpServer {
    registry: ToolRegistry,
}

impl McpServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    /// Serve on the process's stdin/stdout until stdin closes.
    pub async fn start(self) -> Result<()> {
        info!(tools = self.registry.len(), "MCP server listening on stdio");
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve on arbitrary streams until `reader` reaches end of input.
    ///
    /// Each request runs on its own task; a single writer task owns `writer`
    /// so response lines never interleave. In-flight requests are answered
    /// before this returns. If writing fails, reading stops and the write
    /// error is returned.
    pub async fn serve<R, W>(self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let server = Arc::new(self);
        let (tx, mut rx) = mpsc::unbounded_channel::<JsonRpcResponse>();

        let writer_task = tokio::spawn(async move {
            let mut writer = writer;
            while let Some(response) = rx.recv().await {
                let mut line = serde_json::to_string(&response)?;
                line.push('\n');
                writer.write_all(line.as_bytes()).await?;
                writer.flush().await?;
            }
            anyhow::Ok(())
        });

        let mut lines = BufReader::new(reader).lines();
        while let Some(line) = lines.next_line().await.context("Failed to read MCP message")? {
            if line.trim().is_empty() {
                continue;
            }

            // The writer only stops early when output failed
            if tx.is_closed() {
                warn!("MCP output closed, no longer reading requests");
                break;
            }

            let request = match parse_request(&line) {
                Ok(request) => request,
                Err(response) => {
                    if tx.send(*response).is_err() {
                        warn!("MCP output closed, dropping error response");
                        break;
                    }
                    continue;
                }
            };

            let server = server.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                if let Some(response) = server.handle_request(request).await {
                    if let Err(unsent) = tx.send(response) {
                        warn!(id = %unsent.0.id, "MCP output closed, dropping response");
                    }
                }
            });
        }

        debug!("Input closed, draining in-flight requests");
        drop(tx);
        writer_task.await.context("MCP writer task panicked")??;
        info!("MCP server stopped");
        Ok(())
    }

    /// Handle one request. Notifications produce no response.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id.clone() else {
            debug!(method = %request.method, "Notification received");
            return None;
        };

        let response = match request.method.as_str() {
            "initialize" => self.initialize(id, request.params),
            "ping" => JsonRpcResponse::success(id, serde_json::json!({})),
            "tools/list" => JsonRpcResponse::success(
                id,
                ListToolsResult {
                    tools: self.registry.list_schemas(),
                },
            ),
            "tools/call" => self.call_tool(id, request.params).await,
            method => {
                warn!(method, "Unknown method");
                JsonRpcResponse::error(id, JsonRpcError::method_not_found(method))
            }
        };
        Some(response)
    }

    fn initialize(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        match params.map(serde_json::from_value::<InitializeParams>) {
            Some(Ok(params)) => info!(
                client = %params.client_info.name,
                client_version = %params.client_info.version,
                protocol = %params.protocol_version,
                "Client connected"
            ),
            Some(Err(e)) => debug!(error = %e, "Unrecognized initialize params"),
            None => {}
        }

        JsonRpcResponse::success(
            id,
            InitializeResult {
                protocol_version: PROTOCOL_VERSION.to_string(),
                capabilities: ServerCapabilities {
                    tools: Some(ToolsCapability {
                        list_changed: false,
                    }),
                },
                server_info: ServerInfo {
                    name: SERVER_NAME.to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                },
                instructions: Some(INSTRUCTIONS.to_string()),
            },
        )
    }

    async fn call_tool(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let params: CallToolParams = match params.map(serde_json::from_value) {
            Some(Ok(params)) => params,
            Some(Err(e)) => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params(format!("Invalid tools/call params: {}", e)),
                )
            }
            None => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params("tools/call requires params"),
                )
            }
        };

        match self.registry.call(&params.name, params.arguments).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => JsonRpcResponse::error(id, JsonRpcError::invalid_params(e.to_string())),
        }
    }
}

/// Parse one line into a request, or the error response to send back instead.
fn parse_request(line: &str) -> std::result::Result<JsonRpcRequest, Box<JsonRpcResponse>> {
    let value: Value = serde_json::from_str(line).map_err(|e| {
        warn!(error = %e, "Unparsable MCP message");
        Box::new(JsonRpcResponse::error(Value::Null, JsonRpcError::parse_error()))
    })?;

    let id = value.get("id").cloned().unwrap_or(Value::Null);
    let request: JsonRpcRequest = serde_json::from_value(value).map_err(|e| {
        warn!(error = %e, "Malformed MCP request");
        Box::new(JsonRpcResponse::error(id.clone(), JsonRpcError::invalid_request()))
    })?;

    if request.jsonrpc != "2.0" {
        return Err(Box::new(JsonRpcResponse::error(id, JsonRpcError::invalid_request())));
    }
    Ok(request)
}
