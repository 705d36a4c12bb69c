/// MCP server implementation that handles JSON-RPC communication
///
/// This module implements the actual MCP server that:
/// 1. Reads JSON-RPC requests from stdin, one per line
/// 2. Dispatches tool calls to the habit garden tools
/// 3. Sends JSON-RPC responses to stdout

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::mcp::protocol::*;
use crate::tools::{self, ToolError};
use crate::{HabitGardenServer, ServerError};

/// MCP server that handles communication with the client
pub struct McpServer {
    garden: HabitGardenServer,
    /// Whether the client has sent its `initialized` notification
    initialized: bool,
}

impl McpServer {
    pub fn new(garden: HabitGardenServer) -> Self {
        Self {
            garden,
            initialized: false,
        }
    }

    /// Run the MCP server, handling JSON-RPC over stdin/stdout
    pub async fn run(&mut self) -> Result<(), ServerError> {
        info!("Starting MCP server, waiting for JSON-RPC requests...");

        let stdin = tokio::io::stdin();
        let mut reader = BufReader::new(stdin);
        let mut stdout = tokio::io::stdout();

        let mut line = String::new();

        loop {
            line.clear();

            match reader.read_line(&mut line).await {
                Ok(0) => {
                    info!("MCP server shutting down (stdin closed)");
                    break;
                }
                Ok(_) => {
                    if let Some(response) = self.handle_line(&line).await {
                        let response_str = serde_json::to_string(&response)?;

                        stdout.write_all(response_str.as_bytes()).await?;
                        stdout.write_all(b"\n").await?;
                        stdout.flush().await?;

                        debug!("Sent response: {}", response_str);
                    }
                }
                Err(e) => {
                    error!("Failed to read from stdin: {}", e);
                    return Err(e.into());
                }
            }
        }

        Ok(())
    }

    /// Process a single line of JSON-RPC input
    ///
    /// Returns `None` for blank lines and notifications.
    pub async fn handle_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        debug!("Processing request: {}", line);

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    error_codes::PARSE_ERROR,
                    format!("Invalid JSON: {}", e),
                    None,
                ));
            }
        };

        self.handle_request(request).await
    }

    async fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id else {
            self.handle_notification(&request.method);
            return None;
        };

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id, request.params),
            "initialized" | "notifications/initialized" => {
                self.initialized = true;
                JsonRpcResponse::success(id, Value::Null)
            }
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(id, json!({ "tools": tool_definitions() })),
            "tools/call" => self.handle_tools_call(id, request.params),
            _ => JsonRpcResponse::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method '{}' not found", request.method),
                None,
            ),
        };
        Some(response)
    }

    fn handle_notification(&mut self, method: &str) {
        match method {
            "initialized" | "notifications/initialized" => {
                self.initialized = true;
                info!("MCP client finished initialization");
            }
            other => debug!("Ignoring notification '{}'", other),
        }
    }

    fn handle_initialize(&mut self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        match params.map(serde_json::from_value::<InitializeParams>) {
            Some(Ok(init)) => {
                let client = init
                    .client_info
                    .map(|c| format!("{} {}", c.name, c.version.unwrap_or_default()))
                    .unwrap_or_else(|| "unknown client".to_string());
                info!("MCP client connected: {} (protocol {})", client.trim(), init.protocol_version);
            }
            Some(Err(e)) => warn!("Unrecognized initialize parameters: {}", e),
            None => info!("MCP client connected"),
        }

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: "Habit Garden MCP".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::error(id, error_codes::INTERNAL_ERROR, e.to_string(), None),
        }
    }

    fn handle_tools_call(&mut self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let tool_params: ToolCallParams = match params.map(serde_json::from_value) {
            Some(Ok(p)) => p,
            Some(Err(e)) => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    format!("Invalid parameters: {}", e),
                    None,
                );
            }
            None => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    "Missing parameters".to_string(),
                    None,
                );
            }
        };

        if !self.initialized {
            debug!("Tool '{}' called before initialization", tool_params.name);
        }

        let result = match self.call_tool(&tool_params.name, tool_params.arguments) {
            Some(result) => result,
            None => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    format!("Unknown tool: {}", tool_params.name),
                    None,
                );
            }
        };

        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::error(id, error_codes::INTERNAL_ERROR, e.to_string(), None),
        }
    }

    /// Run one tool; `None` if no tool has that name
    fn call_tool(&self, name: &str, arguments: Value) -> Option<ToolCallResult> {
        let storage = self.garden.storage();
        let evaluator = self.garden.evaluator();
        let now = self.garden.now();

        let result = match name {
            "habit_create" => tool_result(
                parse_args(arguments).and_then(|p| tools::create_habit(storage, evaluator, now, p)),
            ),
            "habit_list" => tool_result(
                tools::refresh_streaks(storage, evaluator, now)
                    .and_then(|_| tools::list_habits(storage, evaluator, now)),
            ),
            "habit_get" => tool_result(
                parse_args(arguments).and_then(|p| tools::get_habit(storage, evaluator, now, p)),
            ),
            "habit_update" => tool_result(
                parse_args(arguments).and_then(|p| tools::update_habit(storage, evaluator, now, p)),
            ),
            "habit_delete" => tool_result(
                parse_args(arguments).and_then(|p| tools::delete_habit(storage, p)),
            ),
            "habit_verify" => tool_result(
                parse_args(arguments).and_then(|p| tools::verify_habit(storage, evaluator, now, p)),
            ),
            "habit_logs" => tool_result(
                parse_args(arguments).and_then(|p| tools::habit_logs(storage, evaluator, p)),
            ),
            "habit_refresh" => tool_result(tools::refresh_streaks(storage, evaluator, now)),
            _ => return None,
        };
        Some(result)
    }
}

/// Deserialize tool arguments into the tool's parameter struct
fn parse_args<P: DeserializeOwned>(arguments: Value) -> Result<P, ToolError> {
    serde_json::from_value(arguments)
        .map_err(|e| ToolError::InvalidInput(format!("Invalid arguments: {}", e)))
}

/// Wrap a tool response, using its `message` field as the text content
fn tool_result<R: Serialize>(outcome: Result<R, ToolError>) -> ToolCallResult {
    match outcome {
        Ok(response) => match serde_json::to_value(&response) {
            Ok(data) => {
                let text = data
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                ToolCallResult::success(text, data)
            }
            Err(e) => ToolCallResult::error(error_codes::INTERNAL_ERROR, e.to_string()),
        },
        Err(e) => {
            if tool_error_to_json_rpc_code(&e) == error_codes::STORAGE_ERROR {
                error!("Tool call failed: {}", e);
            } else {
                debug!("Tool call rejected: {}", e);
            }
            ToolCallResult::from_tool_error(&e)
        }
    }
}

/// Definitions of every tool this server offers
fn tool_definitions() -> Vec<ToolDefinition> {
    let habit_id_only = json!({
        "type": "object",
        "properties": {
            "habit_id": {"type": "string", "description": "ID of the habit"}
        },
        "required": ["habit_id"]
    });
    let no_arguments = json!({"type": "object", "properties": {}, "required": []});

    vec![
        ToolDefinition {
            name: "habit_create".to_string(),
            description: "Plant a new habit. It starts as a seed with a streak of 0.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string", "description": "Name of the habit (max 100 characters)"},
                    "description": {"type": "string", "description": "Optional description (max 500 characters)"}
                },
                "required": ["name"]
            }),
        },
        ToolDefinition {
            name: "habit_list".to_string(),
            description: "List all habits, newest first, with streak, growth stage and whether each was completed today. Lapsed streaks are reset first.".to_string(),
            input_schema: no_arguments.clone(),
        },
        ToolDefinition {
            name: "habit_get".to_string(),
            description: "Show one habit with its growth stage, progress and days to the next stage".to_string(),
            input_schema: habit_id_only.clone(),
        },
        ToolDefinition {
            name: "habit_update".to_string(),
            description: "Rename a habit or change its description".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "habit_id": {"type": "string", "description": "ID of the habit"},
                    "name": {"type": "string", "description": "New name (optional)"},
                    "description": {"type": "string", "description": "New description, empty string clears it (optional)"}
                },
                "required": ["habit_id"]
            }),
        },
        ToolDefinition {
            name: "habit_delete".to_string(),
            description: "Delete a habit and its completion history".to_string(),
            input_schema: habit_id_only.clone(),
        },
        ToolDefinition {
            name: "habit_verify".to_string(),
            description: "Verify today's completion of a habit with a photo URL or a text note. Only one verification per habit per day.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "habit_id": {"type": "string", "description": "ID of the habit"},
                    "verification_type": {"type": "string", "enum": ["photo", "text"], "description": "Kind of evidence"},
                    "image_url": {"type": "string", "description": "http(s) URL of the photo (photo verification)"},
                    "text": {"type": "string", "description": "What you did (text verification)"},
                    "note": {"type": "string", "description": "Optional note (max 500 characters)"}
                },
                "required": ["habit_id", "verification_type"]
            }),
        },
        ToolDefinition {
            name: "habit_logs".to_string(),
            description: "Completion history of a habit, newest first".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "habit_id": {"type": "string", "description": "ID of the habit"},
                    "limit": {"type": "integer", "minimum": 1, "maximum": 365, "description": "Number of entries (default 30)"}
                },
                "required": ["habit_id"]
            }),
        },
        ToolDefinition {
            name: "habit_refresh".to_string(),
            description: "Reset every streak that lapsed (no completion today or yesterday)".to_string(),
            input_schema: no_arguments,
        },
    ]
}
