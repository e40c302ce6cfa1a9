use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::path::Path;
use std::process::Stdio;
use tempfile::tempdir;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};

const MAX_FRAME_BYTES: usize = 1024 * 1024;

struct McpE2EClient {
    child: Child,
    stdin: tokio::io::BufWriter<tokio::process::ChildStdin>,
    stdout: BufReader<tokio::process::ChildStdout>,
}

impl McpE2EClient {
    async fn spawn(catalog: &Path) -> Result<Self> {
        let mut child = Command::new(env!("CARGO_BIN_EXE_mcp-schema-registry"))
            .env("SCHEMA_REGISTRY_CATALOG", catalog)
            .env("SCHEMA_REGISTRY_LOG", "off")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .context("spawn MCP server")?;

        let stdin = tokio::io::BufWriter::new(
            child
                .stdin
                .take()
                .context("missing piped stdin for spawned server")?,
        );
        let stdout = BufReader::new(
            child
                .stdout
                .take()
                .context("missing piped stdout for spawned server")?,
        );

        Ok(Self {
            child,
            stdin,
            stdout,
        })
    }

    async fn call(&mut self, request: Value) -> Result<Value> {
        let body = serde_json::to_vec(&request)?;
        let header = format!("Content-Length: {}\r\n\r\n", body.len());
        self.stdin.write_all(header.as_bytes()).await?;
        self.stdin.write_all(&body).await?;
        self.stdin.flush().await?;
        read_mcp_response(&mut self.stdout).await
    }

    async fn call_line(&mut self, request: Value) -> Result<Value> {
        let mut body = serde_json::to_vec(&request)?;
        body.push(b'\n');
        self.stdin.write_all(&body).await?;
        self.stdin.flush().await?;
        read_mcp_response(&mut self.stdout).await
    }

    async fn stop(mut self) -> Result<()> {
        drop(self.stdin);
        self.child.kill().await.ok();
        self.child.wait().await.context("wait for server exit")?;
        Ok(())
    }
}

fn parse_content_length(line: &str) -> Result<usize> {
    let (key, value) = line
        .split_once(':')
        .context("malformed transport header")?;
    if !key.trim().eq_ignore_ascii_case("content-length") {
        anyhow::bail!("unsupported transport header: {}", key.trim());
    }
    let len = value.trim().parse::<usize>()?;
    if len > MAX_FRAME_BYTES {
        anyhow::bail!(
            "content-length {} exceeds allowed limit {}",
            len,
            MAX_FRAME_BYTES
        );
    }
    Ok(len)
}

async fn read_mcp_response<R>(reader: &mut BufReader<R>) -> Result<Value>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut line = String::new();
    loop {
        line.clear();
        let n = reader.read_line(&mut line).await?;
        if n == 0 {
            return Err(anyhow::anyhow!("unexpected EOF while reading header"));
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if !trimmed.to_ascii_lowercase().starts_with("content-length") {
            return Ok(serde_json::from_str::<Value>(trimmed)?);
        }

        let len = parse_content_length(trimmed)?;
        loop {
            let mut tail = String::new();
            let n = reader.read_line(&mut tail).await?;
            if n == 0 {
                return Err(anyhow::anyhow!("unexpected EOF while reading header tail"));
            }
            if tail.trim().is_empty() {
                break;
            }
        }

        let mut body = vec![0u8; len];
        reader.read_exact(&mut body).await?;
        return Ok(serde_json::from_slice(&body)?);
    }
}

fn parse_tool_payload(response: &Value) -> Result<Value> {
    let text = response
        .get("result")
        .and_then(|r| r.get("content"))
        .and_then(|v| v.get(0))
        .and_then(|v| v.get("text"))
        .and_then(Value::as_str)
        .context("missing text content payload")?;
    Ok(serde_json::from_str(text)?)
}

fn catalog() -> Value {
    json!({
        "tools": [
            {
                "name": "create_invoice",
                "description": "Create an invoice",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "customer": {
                            "type": "object",
                            "description": "Billing party",
                            "properties": {
                                "name": {"type": "string"},
                                "address": {
                                    "type": "object",
                                    "properties": {"city": {"type": "string"}}
                                }
                            }
                        },
                        "lines": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {"sku": {"type": "string"}, "qty": {"type": "integer"}}
                            }
                        },
                        "note": {"type": "string"}
                    }
                },
                "outputSchema": {
                    "type": "object",
                    "properties": {"id": {"type": "string"}}
                }
            },
            {"name": "health"}
        ]
    })
}

#[tokio::test]
async fn e2e_list_and_expand_with_real_stdio() -> Result<()> {
    let dir = tempdir()?;
    let catalog_path = dir.path().join("catalog.json");
    tokio::fs::write(&catalog_path, serde_json::to_vec_pretty(&catalog())?).await?;

    let mut client = McpE2EClient::spawn(&catalog_path).await?;

    let result: Result<()> = async {
        let initialize = client
            .call(json!({"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-06-18"}}))
            .await?;
        assert_eq!(initialize["result"]["protocolVersion"], "2025-06-18");
        assert_eq!(initialize["result"]["serverInfo"]["name"], "schema-registry");

        let tools = client
            .call(json!({"jsonrpc":"2.0","id":2,"method":"tools/list"}))
            .await?;
        let listed = tools["result"]["tools"]
            .as_array()
            .context("missing tools list")?;
        let names: Vec<&str> = listed
            .iter()
            .map(|tool| tool["name"].as_str().unwrap_or_default())
            .collect();
        assert_eq!(names, vec!["create_invoice", "health", "expand_schema"]);

        let invoice_schema = &listed[0]["inputSchema"];
        assert_eq!(invoice_schema["properties"]["note"], json!({"type": "string"}));
        assert_eq!(invoice_schema["properties"]["customer"]["type"], "object");
        assert!(invoice_schema["properties"]["customer"]
            .get("properties")
            .is_none());
        assert!(invoice_schema["properties"]["lines"].get("items").is_none());

        let expanded = client
            .call(json!({
                "jsonrpc":"2.0",
                "id":3,
                "method":"tools/call",
                "params":{
                    "name":"expand_schema",
                    "arguments":{"toolName":"create_invoice","path":"/properties/customer"}
                }
            }))
            .await?;
        assert!(expanded["result"].get("isError").is_none());
        let payload = parse_tool_payload(&expanded)?;
        assert_eq!(payload["success"], true);
        assert_eq!(payload["data"]["toolName"], "create_invoice");
        assert_eq!(
            payload["data"]["schema"]["properties"]["address"]["properties"]["city"],
            json!({"type": "string"})
        );

        let bad_path = client
            .call_line(json!({
                "jsonrpc":"2.0",
                "id":4,
                "method":"tools/call",
                "params":{
                    "name":"expand_schema",
                    "arguments":{"toolName":"create_invoice","path":"/required/0"}
                }
            }))
            .await?;
        assert_eq!(bad_path["result"]["isError"], true);
        let payload = parse_tool_payload(&bad_path)?;
        assert_eq!(payload["success"], false);
        assert!(payload["error"]
            .as_str()
            .unwrap_or_default()
            .contains("'required'"));

        let operation = client
            .call(json!({
                "jsonrpc":"2.0",
                "id":5,
                "method":"tools/call",
                "params":{"name":"health","arguments":{}}
            }))
            .await?;
        assert_eq!(operation["result"]["isError"], true);
        let payload = parse_tool_payload(&operation)?;
        assert_eq!(payload["kind"], "invalid_state");

        let unknown = client
            .call(json!({
                "jsonrpc":"2.0",
                "id":6,
                "method":"tools/call",
                "params":{"name":"nope","arguments":{}}
            }))
            .await?;
        assert_eq!(unknown["error"]["code"], -32602);

        Ok(())
    }
    .await;

    client.stop().await?;
    result
}

#[tokio::test]
async fn e2e_empty_yaml_catalog_serves_only_expand_tool() -> Result<()> {
    let dir = tempdir()?;
    let catalog_path = dir.path().join("catalog.yaml");
    tokio::fs::write(&catalog_path, "operations: []\n").await?;
    let mut client = McpE2EClient::spawn(&catalog_path).await?;

    let result: Result<()> = async {
        client
            .call_line(json!({"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}))
            .await?;
        let tools = client
            .call_line(json!({"jsonrpc":"2.0","id":2,"method":"tools/list"}))
            .await?;
        let listed = tools["result"]["tools"]
            .as_array()
            .context("missing tools list")?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["name"], "expand_schema");
        Ok(())
    }
    .await;

    client.stop().await?;
    result
}
