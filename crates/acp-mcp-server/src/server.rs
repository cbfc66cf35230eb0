//! MCP request handling over line-delimited JSON-RPC

use acp_config::ClustersConfig;
use acp_core::{AcpError, Action, RemoteSessionApi, SessionOperations};
use acp_telemetry::redact_arguments;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Instant;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::clusters::ClusterContext;
use crate::protocol::{
    JsonRpcRequest, JsonRpcResponse, ToolOutput, INTERNAL_ERROR, INVALID_PARAMS,
    METHOD_NOT_FOUND, PARSE_ERROR, PROTOCOL_VERSION,
};
use crate::tools::{tool_specs, ClusterTool, Tool};

pub const SERVER_NAME: &str = "acp-mcp";

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ClusterArgs {
    cluster: String,
    #[serde(default)]
    token: Option<String>,
}

pub struct McpServer<A> {
    ops: SessionOperations<A>,
    clusters: RwLock<ClusterContext>,
}

impl<A: RemoteSessionApi> McpServer<A> {
    pub fn new(ops: SessionOperations<A>, config: ClustersConfig) -> Self {
        Self {
            ops,
            clusters: RwLock::new(ClusterContext::new(config)),
        }
    }

    /// Handle one request. Notifications yield no response.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            debug!(method = %request.method, "notification ignored");
            return None;
        }

        let id = request.id;
        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(
                id,
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {"tools": {}},
                    "serverInfo": {
                        "name": SERVER_NAME,
                        "version": env!("CARGO_PKG_VERSION")
                    }
                }),
            ),
            "tools/list" => JsonRpcResponse::success(id, json!({"tools": tool_specs()})),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            "resources/list" => JsonRpcResponse::success(id, json!({"resources": []})),
            "prompts/list" => JsonRpcResponse::success(id, json!({"prompts": []})),
            "ping" => JsonRpcResponse::success(id, json!({})),
            other => JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Method not found: {other}"),
            ),
        };

        Some(response)
    }

    async fn handle_tools_call(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let Some(params) = params else {
            return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing params");
        };

        let params: CallParams = match serde_json::from_value(params) {
            Ok(params) => params,
            Err(err) => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Invalid params: {err}"))
            }
        };

        let output = self
            .call_tool(&params.name, params.arguments.unwrap_or_else(|| json!({})))
            .await;

        match serde_json::to_value(output) {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(err) => JsonRpcResponse::error(id, INTERNAL_ERROR, err.to_string()),
        }
    }

    /// Run one tool. Failures come back as an `isError` result, never as a protocol error.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> ToolOutput {
        let started = Instant::now();
        info!(tool = name, arguments = %redact_arguments(&arguments), "tool call started");

        let Some(tool) = Tool::from_name(name) else {
            warn!(tool = name, "unknown tool requested");
            return ToolOutput::error(format!("Unknown tool: {name}"));
        };

        let output = match tool {
            Tool::Session(action) => self.call_session_tool(action, arguments).await,
            Tool::Cluster(tool) => self.call_cluster_tool(tool, arguments).await,
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        if output.is_error {
            warn!(tool = name, elapsed_ms, "tool call failed");
        } else {
            info!(tool = name, elapsed_ms, "tool call completed");
        }
        output
    }

    async fn call_session_tool(&self, action: Action, arguments: Value) -> ToolOutput {
        let mut arguments = match arguments {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return ToolOutput::error(format!(
                    "Validation Error: arguments must be an object, got {other}"
                ))
            }
        };

        let target = {
            let clusters = self.clusters.read().await;
            let project = match arguments.get("project").and_then(Value::as_str) {
                Some(project) if !project.is_empty() => project.to_string(),
                _ => {
                    let fallback = clusters.default_project().unwrap_or_default().to_string();
                    if !fallback.is_empty() {
                        info!(tool = %action, project = %fallback, "project autofilled");
                        arguments.insert("project".to_string(), Value::String(fallback.clone()));
                    }
                    fallback
                }
            };
            clusters.target(&project)
        };

        let target = match target {
            Ok(target) => target,
            Err(err) => {
                warn!(tool = %action, error = %err, "no cluster target");
                return ToolOutput::error(format!("Validation Error: {err:#}"));
            }
        };

        match action
            .dispatch(Value::Object(arguments), &self.ops, &target)
            .await
        {
            Ok(value) => ToolOutput::json(&value),
            Err(err) => {
                if matches!(err, AcpError::Remote { .. } | AcpError::Timeout { .. }) {
                    error!(tool = %action, project = %target.project, error = %err, "tool error");
                } else {
                    warn!(tool = %action, project = %target.project, error = %err, "tool rejected");
                }
                ToolOutput::error(format!("{}: {}", err.class(), err))
            }
        }
    }

    async fn call_cluster_tool(&self, tool: ClusterTool, arguments: Value) -> ToolOutput {
        let encoded = match tool {
            ClusterTool::ListClusters => {
                serde_json::to_value(self.clusters.read().await.list_clusters())
            }
            ClusterTool::Whoami => serde_json::to_value(self.clusters.read().await.whoami()),
            ClusterTool::SwitchCluster | ClusterTool::Login => {
                let args: ClusterArgs = match serde_json::from_value(arguments) {
                    Ok(args) => args,
                    Err(err) => {
                        return ToolOutput::error(format!(
                            "Validation Error: invalid arguments: {err}"
                        ))
                    }
                };

                let mut clusters = self.clusters.write().await;
                if tool == ClusterTool::SwitchCluster {
                    let switched = clusters.switch(&args.cluster);
                    if switched.switched {
                        info!(cluster = %args.cluster, "cluster switched");
                    }
                    serde_json::to_value(switched)
                } else {
                    let login = clusters.login(&args.cluster, args.token);
                    info!(cluster = %args.cluster, authenticated = login.authenticated, "login");
                    serde_json::to_value(login)
                }
            }
        };

        match encoded {
            Ok(value) => ToolOutput::json(&value),
            Err(err) => ToolOutput::error(format!("Error: {err}")),
        }
    }
}

/// Serve requests from `reader` until EOF, one JSON object per line.
pub async fn serve<A, R, W>(server: &McpServer<A>, reader: R, mut writer: W) -> std::io::Result<()>
where
    A: RemoteSessionApi,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<JsonRpcRequest>(&line) {
            Ok(request) => server.handle_request(request).await,
            Err(err) => {
                warn!(error = %err, "unparseable request");
                Some(JsonRpcResponse::error(
                    None,
                    PARSE_ERROR,
                    format!("Parse error: {err}"),
                ))
            }
        };

        if let Some(response) = response {
            let mut encoded = serde_json::to_vec(&response)?;
            encoded.push(b'\n');
            writer.write_all(&encoded).await?;
            writer.flush().await?;
        }
    }

    Ok(())
}
