mod error_contract;
mod rpc;
mod schema;
mod tool_expand;
mod tool_operation;
mod transport;

use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{BufReader, BufWriter};
use tokio::time::Duration;

use crate::app::tool_usecases::{ToolUseCases, EXPAND_TOOL_NAME};
use crate::domain::errors::DomainError;

use error_contract::domain_error_response;
use rpc::{RpcEnvelope, RpcRequest};
use schema::tools_schema;
use tool_expand::handle_expand_tool;
use tool_operation::handle_operation_tool;
use transport::{read_next_message, write_response, TransportMode};

const MAX_FRAME_BYTES: usize = 10 * 1024 * 1024; // 10 MiB

fn parse_initialize_timeout_ms(raw: Option<&str>) -> Duration {
    const DEFAULT_SECS: u64 = 20;
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(DEFAULT_SECS))
}

fn initialize_timeout() -> Duration {
    let raw = std::env::var("SCHEMA_REGISTRY_INITIALIZE_TIMEOUT_MS").ok();
    parse_initialize_timeout_ms(raw.as_deref())
}

/// Serve MCP over stdin/stdout until EOF or `exit`.
pub async fn start_mcp_server(uc: Arc<ToolUseCases>) -> anyhow::Result<()> {
    let mut reader = BufReader::new(tokio::io::stdin());
    let mut writer = BufWriter::new(tokio::io::stdout());
    let init_timeout = initialize_timeout();
    let init_deadline = tokio::time::Instant::now() + init_timeout;
    let mut initialized = false;
    let mut shutdown_requested = false;
    let mut response_mode: Option<TransportMode> = None;

    loop {
        let read_result = if initialized {
            read_next_message(&mut reader, MAX_FRAME_BYTES).await
        } else {
            match tokio::time::timeout_at(
                init_deadline,
                read_next_message(&mut reader, MAX_FRAME_BYTES),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => {
                    return Err(anyhow::anyhow!(
                        "no initialize received within {:?}; closing server",
                        init_timeout
                    ));
                }
            }
        };

        let (raw, mode) = match read_result {
            Ok(Some(msg)) => msg,
            Ok(None) => break, // EOF
            Err(e) => {
                tracing::warn!("frame read error: {}", e);
                continue;
            }
        };
        let mode = *response_mode.get_or_insert(mode);

        if raw.trim().is_empty() {
            continue;
        }

        let req: RpcRequest = match serde_json::from_str(&raw) {
            Ok(r) => r,
            Err(e) => {
                let envelope =
                    RpcEnvelope::rpc_error(Value::Null, -32700, format!("parse error: {}", e));
                write_response(&mut writer, &envelope, mode).await?;
                continue;
            }
        };

        if req.method == "initialize" {
            initialized = true;
        }

        match req.method.as_str() {
            "shutdown" => {
                shutdown_requested = true;
                if !req.is_notification() {
                    let envelope = RpcEnvelope::success(req.request_id(), json!(null));
                    write_response(&mut writer, &envelope, mode).await?;
                }
                continue;
            }
            "exit" => {
                if !req.is_notification() {
                    let envelope = RpcEnvelope::success(req.request_id(), json!(null));
                    write_response(&mut writer, &envelope, mode).await?;
                }
                break;
            }
            _ if shutdown_requested => {
                if !req.is_notification() {
                    let envelope = RpcEnvelope::rpc_error(
                        req.request_id(),
                        -32000,
                        "server is shut down; only 'exit' is accepted",
                    );
                    write_response(&mut writer, &envelope, mode).await?;
                }
                continue;
            }
            _ => {}
        }

        if let Some(envelope) = handle_request(&req, &uc).await {
            write_response(&mut writer, &envelope, mode).await?;
        }
    }

    Ok(())
}

async fn handle_request(request: &RpcRequest, uc: &ToolUseCases) -> Option<RpcEnvelope> {
    let id = request.request_id();
    let params = request.params.clone().unwrap_or(Value::Null);

    let envelope = match request.method.as_str() {
        "initialize" => RpcEnvelope::success(
            id,
            json!({
                "protocolVersion": initialize_protocol_version(request.params.as_ref()),
                "capabilities": { "tools": { "listChanged": false } },
                "serverInfo": {
                    "name": "schema-registry",
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        ),
        "ping" => RpcEnvelope::success(id, json!({})),
        "notifications/initialized" | "initialized" => RpcEnvelope::success(id, json!(null)),
        "tools/list" => match tools_schema(uc) {
            Ok(tools) => RpcEnvelope::success(id, tools),
            Err(e) => RpcEnvelope::rpc_error(id, -32603, e.to_string()),
        },
        "tools/call" => {
            let tool_name = params.get("name").and_then(Value::as_str).unwrap_or("");
            let args = params
                .get("arguments")
                .cloned()
                .unwrap_or_else(|| Value::Object(Default::default()));
            if !args.is_object() {
                RpcEnvelope::rpc_error(id, -32602, "tool arguments must be an object")
            } else if tool_name == EXPAND_TOOL_NAME {
                match handle_expand_tool(&args, uc) {
                    Ok(v) => RpcEnvelope::success(id, v),
                    Err(e) => domain_error_response(id, &e),
                }
            } else if uc.is_operation(tool_name) {
                match handle_operation_tool(tool_name, args, uc).await {
                    Ok(v) => RpcEnvelope::success(id, v),
                    Err(e) => domain_error_response(id, &e),
                }
            } else {
                RpcEnvelope::rpc_error(id, -32602, format!("unknown tool '{}'", tool_name))
            }
        }
        _ => RpcEnvelope::rpc_error(
            id,
            -32601,
            format!("method not found: '{}'", request.method),
        ),
    };

    if request.is_notification() {
        None
    } else {
        Some(envelope)
    }
}

fn initialize_protocol_version(request_params: Option<&Value>) -> &str {
    request_params
        .and_then(|value| value.get("protocolVersion"))
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
        .unwrap_or("2025-06-18")
}

pub(super) fn to_json_text(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{\"error\":true}".to_string())
}

/// Wrap `text` as MCP text content, refusing anything that cannot fit a frame.
pub(super) fn tool_text_result(text: String, is_error: bool) -> Result<Value, DomainError> {
    if text.len() > MAX_FRAME_BYTES {
        return Err(DomainError::InvalidData(format!(
            "tool output too large: {} bytes (max {})",
            text.len(),
            MAX_FRAME_BYTES
        )));
    }
    let mut result = json!({
        "content": [{
            "type": "text",
            "text": text
        }]
    });
    if is_error {
        result["isError"] = Value::Bool(true);
    }
    Ok(result)
}
