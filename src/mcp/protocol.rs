/// MCP (Model Context Protocol) message structures and JSON-RPC handling
///
/// This module defines the JSON-RPC message format that MCP clients use to
/// talk to the habit garden server. MCP field names are camelCase on the
/// wire.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::tools::ToolError;

/// MCP protocol version we support
pub const MCP_VERSION: &str = "2024-11-05";

/// JSON-RPC 2.0 request message
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (always "2.0")
    #[allow(dead_code)]
    pub jsonrpc: String,
    /// Notifications carry no id
    #[serde(default)]
    pub id: Option<Value>,
    /// The method to call (e.g., "tools/call")
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC 2.0 response message
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,
    /// Request ID that we're responding to
    pub id: Value,
    /// Successful result (if no error occurred)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error information (if something went wrong)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error information
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// MCP tool call parameters
#[derive(Debug, Deserialize)]
pub struct ToolCallParams {
    /// Name of the tool to call (e.g., "habit_verify")
    pub name: String,
    /// Arguments to pass to the tool
    #[serde(default = "empty_arguments")]
    pub arguments: Value,
}

fn empty_arguments() -> Value {
    json!({})
}

/// MCP tool call result
///
/// Every tool answers with a human-readable text block plus the same data
/// as structured JSON.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    pub content: Vec<ToolContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,
    pub is_error: bool,
}

/// Content returned by a tool
#[derive(Debug, Serialize)]
pub struct ToolContent {
    /// Type of content (usually "text")
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

/// MCP tool definition
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Tool name (e.g., "habit_create")
    pub name: String,
    pub description: String,
    /// JSON schema for the tool's input parameters
    pub input_schema: Value,
}

/// MCP server capabilities
#[derive(Debug, Serialize)]
pub struct ServerCapabilities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolsCapability>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCapability {
    pub list_changed: bool,
}

/// MCP initialization request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// MCP protocol version the client supports
    pub protocol_version: String,
    #[allow(dead_code)]
    #[serde(default)]
    pub capabilities: Value,
    #[serde(default)]
    pub client_info: Option<ClientInfo>,
}

/// Information about the MCP client
#[derive(Debug, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// MCP initialization response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: ServerInfo,
}

/// Information about our server
#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

// JSON-RPC error codes
pub mod error_codes {
    /// Parse error - Invalid JSON was received by the server
    pub const PARSE_ERROR: i32 = -32700;
    /// Invalid Request - The JSON sent is not a valid Request object
    pub const INVALID_REQUEST: i32 = -32600;
    /// Method not found - The requested method doesn't exist
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid parameters - Method exists but parameters are wrong
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal error - Internal JSON-RPC error
    pub const INTERNAL_ERROR: i32 = -32603;

    // Application-specific codes live in the -32000 to -32099 range
    /// The specified habit ID doesn't exist
    pub const HABIT_NOT_FOUND: i32 = -32001;
    /// The habit was already verified today
    pub const ALREADY_COMPLETED: i32 = -32002;
    /// Input validation failed
    pub const VALIDATION_ERROR: i32 = -32003;
    /// Database or storage operation failed
    pub const STORAGE_ERROR: i32 = -32004;
}

impl JsonRpcResponse {
    /// Create a successful response
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response
    pub fn error(id: Value, code: i32, message: String, data: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
                data,
            }),
        }
    }
}

impl ToolCallResult {
    /// Create a successful tool result with text content and structured data
    pub fn success(text: String, data: Value) -> Self {
        Self {
            content: vec![ToolContent {
                content_type: "text".to_string(),
                text,
            }],
            structured_content: Some(data),
            is_error: false,
        }
    }

    /// Create an error tool result carrying the application error code
    pub fn error(code: i32, error_message: String) -> Self {
        Self {
            content: vec![ToolContent {
                content_type: "text".to_string(),
                text: format!("Error: {}", error_message),
            }],
            structured_content: Some(json!({
                "error": { "code": code, "message": error_message }
            })),
            is_error: true,
        }
    }

    /// Convert a failed tool call
    pub fn from_tool_error(error: &ToolError) -> Self {
        Self::error(tool_error_to_json_rpc_code(error), error.to_string())
    }
}

/// Map tool errors to application JSON-RPC error codes
pub fn tool_error_to_json_rpc_code(error: &ToolError) -> i32 {
    use crate::storage::StorageError;

    match error {
        ToolError::AlreadyCompletedToday { .. } => error_codes::ALREADY_COMPLETED,
        ToolError::InvalidInput(_) | ToolError::Domain(_) => error_codes::VALIDATION_ERROR,
        ToolError::Storage(StorageError::HabitNotFound { .. }) => error_codes::HABIT_NOT_FOUND,
        ToolError::Storage(StorageError::DuplicateEntry { .. }) => error_codes::ALREADY_COMPLETED,
        ToolError::Storage(_) => error_codes::STORAGE_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;
    use crate::storage::StorageError;

    #[test]
    fn test_tool_result_uses_camel_case() {
        let result = ToolCallResult::success("ok".to_string(), json!({"a": 1}));
        let value = serde_json::to_value(result).unwrap();

        assert_eq!(value["isError"], json!(false));
        assert_eq!(value["structuredContent"]["a"], json!(1));
        assert_eq!(value["content"][0]["type"], json!("text"));
    }

    #[test]
    fn test_error_codes() {
        let already = ToolError::AlreadyCompletedToday { habit_id: "x".to_string() };
        let missing = ToolError::Storage(StorageError::HabitNotFound { habit_id: "x".to_string() });
        let invalid = ToolError::Domain(DomainError::InvalidHabitName("empty".to_string()));
        let storage = ToolError::Storage(StorageError::Migration("boom".to_string()));

        assert_eq!(tool_error_to_json_rpc_code(&already), error_codes::ALREADY_COMPLETED);
        assert_eq!(tool_error_to_json_rpc_code(&missing), error_codes::HABIT_NOT_FOUND);
        assert_eq!(tool_error_to_json_rpc_code(&invalid), error_codes::VALIDATION_ERROR);
        assert_eq!(tool_error_to_json_rpc_code(&storage), error_codes::STORAGE_ERROR);

        let value = serde_json::to_value(ToolCallResult::from_tool_error(&already)).unwrap();
        assert_eq!(value["isError"], json!(true));
        assert_eq!(value["structuredContent"]["error"]["code"], json!(-32002));
    }

    #[test]
    fn test_notification_has_no_id() {
        let request: JsonRpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#).unwrap();
        assert!(request.id.is_none());
    }
}
