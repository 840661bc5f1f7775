// MCP server: line-delimited JSON-RPC over stdio

use crate::protocol::*;
use crate::tools::ToolRegistry;
use anyhow::{Context, Result};
use digikey_client::UpstreamError;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec, LinesCodecError};
use tracing::{debug, error, info, warn};

/// Longest accepted request line.
const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Responses waiting to be written.
const RESPONSE_QUEUE: usize = 64;

const INSTRUCTIONS: &str = "Tools for the DigiKey product catalog: keyword search, product details, \
pricing, media, substitutions, associations and packaging. Failed calls return a JSON object with \
error, message and status_code.";

#[derive(Clone)]
pub struct McpServer {
    registry: Arc<ToolRegistry>,
}

impl McpServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Serve on stdin/stdout until stdin closes.
    pub async fn start(&self) -> Result<()> {
        info!(tools = self.registry.len(), "MCP server listening on stdio");
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve requests read from `reader`, writing responses to `writer`.
    ///
    /// Each request runs on its own task; responses are written in
    /// completion order and correlated by id.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let mut lines = FramedRead::new(reader, LinesCodec::new_with_max_length(MAX_LINE_BYTES));
        let (tx, mut rx) = mpsc::channel::<JsonRpcResponse>(RESPONSE_QUEUE);

        let writer_task = tokio::spawn(async move {
            let mut sink = FramedWrite::new(writer, LinesCodec::new());
            while let Some(response) = rx.recv().await {
                match serde_json::to_string(&response) {
                    Ok(line) => sink.send(line).await.context("Failed to write response")?,
                    Err(e) => error!(error = %e, "Failed to serialize response"),
                }
            }
            Ok::<_, anyhow::Error>(())
        });

        let mut in_flight = JoinSet::new();

        while let Some(frame) = lines.next().await {
            let line = match frame {
                Ok(line) => line,
                Err(LinesCodecError::MaxLineLengthExceeded) => {
                    warn!(max = MAX_LINE_BYTES, "Request line too long, discarding");
                    let response =
                        JsonRpcResponse::error(serde_json::Value::Null, JsonRpcError::parse_error());
                    if tx.send(response).await.is_err() {
                        break;
                    }
                    continue;
                }
                Err(LinesCodecError::Io(e)) => {
                    error!(error = %e, "Failed to read from input");
                    break;
                }
            };

            if line.trim().is_empty() {
                continue;
            }

            let server = self.clone();
            let tx = tx.clone();
            in_flight.spawn(async move {
                if let Some(response) = server.handle_message(&line).await {
                    if tx.send(response).await.is_err() {
                        warn!("Response writer closed, dropping response");
                    }
                }
            });

            // Reap finished tasks so the set does not grow unbounded.
            while let Some(joined) = in_flight.try_join_next() {
                if let Err(e) = joined {
                    error!(error = %e, "Request task failed");
                }
            }
        }

        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Request task failed");
            }
        }

        drop(tx);
        writer_task.await.context("Response writer task panicked")??;

        info!("Input closed, MCP server stopping");
        Ok(())
    }

    /// Handle one raw JSON-RPC message. Notifications produce no response.
    pub async fn handle_message(&self, line: &str) -> Option<JsonRpcResponse> {
        let value: serde_json::Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Malformed JSON-RPC message");
                return Some(JsonRpcResponse::error(
                    serde_json::Value::Null,
                    JsonRpcError::parse_error(),
                ));
            }
        };

        let id = value.get("id").cloned().unwrap_or(serde_json::Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Invalid JSON-RPC request");
                return Some(JsonRpcResponse::error(id, JsonRpcError::invalid_request()));
            }
        };

        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(id, JsonRpcError::invalid_request()));
        }

        self.handle_request(request).await
    }

    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            debug!(method = %request.method, "Notification received");
            return None;
        }
        let id = request.id.clone().unwrap_or(serde_json::Value::Null);

        debug!(method = %request.method, id = %id, "Request received");

        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::from_result(id, self.initialize(request.params)),
            "ping" => JsonRpcResponse::success(id, serde_json::json!({})),
            "tools/list" => JsonRpcResponse::from_result(
                id,
                ListToolsResult {
                    tools: self.registry.list_schemas(),
                },
            ),
            "tools/call" => match self.call_tool(request.params).await {
                Ok(result) => JsonRpcResponse::from_result(id, result),
                Err(error) => JsonRpcResponse::error(id, error),
            },
            other => {
                warn!(method = other, "Unknown method");
                JsonRpcResponse::error(id, JsonRpcError::method_not_found(other))
            }
        };

        Some(response)
    }

    fn initialize(&self, params: Option<serde_json::Value>) -> InitializeResult {
        match params.map(serde_json::from_value::<InitializeParams>) {
            Some(Ok(params)) => info!(
                client = %params.client_info.name,
                client_version = %params.client_info.version,
                requested_version = %params.protocol_version,
                "Client connected"
            ),
            Some(Err(e)) => warn!(error = %e, "Unrecognized initialize params"),
            None => warn!("Initialize without params"),
        }

        InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: "digikey-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }

    async fn call_tool(
        &self,
        params: Option<serde_json::Value>,
    ) -> std::result::Result<CallToolResult, JsonRpcError> {
        let params: CallToolParams = params
            .ok_or_else(|| JsonRpcError::invalid_params("Missing params for tools/call"))
            .and_then(|p| {
                serde_json::from_value(p)
                    .map_err(|e| JsonRpcError::invalid_params(format!("Invalid tools/call params: {}", e)))
            })?;

        let tool = self
            .registry
            .get(&params.name)
            .ok_or_else(|| JsonRpcError::invalid_params(format!("Unknown tool: {}", params.name)))?;

        let started = Instant::now();
        let arguments = params.arguments.unwrap_or(serde_json::Value::Null);

        let result = match tool.execute(arguments).await {
            Ok(result) => result,
            Err(e) => {
                warn!(tool = %params.name, error = %format!("{:#}", e), "Tool rejected arguments");
                CallToolResult::json_error(
                    &UpstreamError::invalid_request(None, format!("{:#}", e)).to_json(),
                )
            }
        };

        info!(
            tool = %params.name,
            is_error = result.is_error.unwrap_or(false),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Tool call finished"
        );

        Ok(result)
    }
}
