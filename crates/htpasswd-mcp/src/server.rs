//! MCP server implementation
//!
//! Handles the Model Context Protocol over newline-delimited JSON-RPC on stdio

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader as TokioBufReader};
use tracing::{debug, info};

use htpasswd_core::McpError;

use crate::handlers::{CredentialHandler, ToolCallArgs};
use crate::registry::{PromptRegistry, ToolRegistry};

/// JSON-RPC request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
    pub id: Option<Value>,
}

/// JSON-RPC response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Option<Value>,
}

/// JSON-RPC error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
            id,
        }
    }
}

/// Error codes
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
    pub const TOOL_NOT_FOUND: i32 = -32000;
    pub const PROMPT_NOT_FOUND: i32 = -32001;
}

/// MCP protocol version this server speaks
const PROTOCOL_VERSION: &str = "2024-11-05";

/// MCP server
pub struct McpServer {
    /// Tool registry
    tools: ToolRegistry,
    /// Prompt registry
    prompts: PromptRegistry,
    /// Operation handler
    handler: CredentialHandler,
    /// Server info
    server_info: ServerInfo,
}

/// Server info for initialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: "htpasswd-toolserver".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl Default for McpServer {
    fn default() -> Self {
        Self::new()
    }
}

impl McpServer {
    /// Create a new MCP server with the default registries
    pub fn new() -> Self {
        Self {
            tools: ToolRegistry::new(),
            prompts: PromptRegistry::new(),
            handler: CredentialHandler::new(),
            server_info: ServerInfo::default(),
        }
    }

    /// Handle a JSON-RPC request
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        debug!("Handling request: {}", request.method);

        match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id),
            "initialized" => self.handle_initialized(request.id),
            "tools/list" => self.handle_tools_list(request.id),
            "tools/call" => self.handle_tools_call(request.id, request.params).await,
            "prompts/list" => self.handle_prompts_list(request.id),
            "prompts/get" => self.handle_prompts_get(request.id, request.params).await,
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            _ => JsonRpcResponse::error(
                request.id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        }
    }

    /// Handle initialize request
    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        info!("MCP server initializing");

        JsonRpcResponse::success(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {
                    "tools": {},
                    "prompts": {}
                },
                "serverInfo": {
                    "name": self.server_info.name,
                    "version": self.server_info.version
                }
            }),
        )
    }

    /// Handle initialized notification
    fn handle_initialized(&self, id: Option<Value>) -> JsonRpcResponse {
        info!("MCP server initialized");
        JsonRpcResponse::success(id, json!({}))
    }

    /// Handle tools/list request
    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        let tools: Vec<Value> = self
            .tools
            .get_all()
            .iter()
            .map(|t| {
                json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect();

        JsonRpcResponse::success(id, json!({ "tools": tools }))
    }

    /// Handle prompts/list request
    fn handle_prompts_list(&self, id: Option<Value>) -> JsonRpcResponse {
        let prompts: Vec<Value> = self
            .prompts
            .get_all()
            .iter()
            .map(|p| {
                json!({
                    "name": p.name,
                    "description": p.description,
                    "arguments": p.arguments
                })
            })
            .collect();

        JsonRpcResponse::success(id, json!({ "prompts": prompts }))
    }

    /// Handle tools/call request
    async fn handle_tools_call(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let (name, args) = match Self::extract_invocation(params) {
            Ok(pair) => pair,
            Err(e) => return Self::protocol_error(id, e),
        };

        match self.handler.handle_tool(&name, args).await {
            Ok(result) => JsonRpcResponse::success(
                id,
                json!({
                    "content": [{
                        "type": "text",
                        "text": result.text
                    }],
                    "isError": !result.success
                }),
            ),
            Err(e) => Self::protocol_error(id, e),
        }
    }

    /// Handle prompts/get request
    async fn handle_prompts_get(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let (name, args) = match Self::extract_invocation(params) {
            Ok(pair) => pair,
            Err(e) => return Self::protocol_error(id, e),
        };

        match self.handler.handle_prompt(&name, args).await {
            Ok(result) => JsonRpcResponse::success(
                id,
                json!({
                    "description": result.description,
                    "messages": result.messages
                }),
            ),
            Err(e) => Self::protocol_error(id, e),
        }
    }

    /// Pull the operation name and arguments out of request params
    fn extract_invocation(params: Option<Value>) -> Result<(String, ToolCallArgs), McpError> {
        let params = params.ok_or_else(|| McpError::InvalidArguments("Missing params".to_string()))?;

        let name = params
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| McpError::InvalidArguments("Missing operation name".to_string()))?
            .to_string();

        let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

        Ok((name, ToolCallArgs::from_value(arguments)))
    }

    /// Map a handler error to a JSON-RPC error response.
    ///
    /// Unknown operation names get distinct codes so callers can tell them
    /// apart from validation failures, which never reach this path (those are
    /// framed as data by the handler).
    fn protocol_error(id: Option<Value>, error: McpError) -> JsonRpcResponse {
        let code = match error {
            McpError::ToolNotFound(_) => error_codes::TOOL_NOT_FOUND,
            McpError::PromptNotFound(_) => error_codes::PROMPT_NOT_FOUND,
            McpError::InvalidArguments(_) => error_codes::INVALID_PARAMS,
            McpError::Hasher(_) | McpError::Internal(_) => error_codes::INTERNAL_ERROR,
        };

        JsonRpcResponse::error(id, code, error.to_string())
    }

    /// Run the server on stdio
    pub async fn run_stdio(&self) -> Result<(), Box<dyn std::error::Error>> {
        info!("Starting MCP server on stdio");

        let stdin = tokio::io::stdin();
        let mut stdout = tokio::io::stdout();
        let reader = TokioBufReader::new(stdin);
        let mut lines = reader.lines();

        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim().is_empty() {
                continue;
            }

            debug!("Received: {}", line);

            let request: JsonRpcRequest = match serde_json::from_str(&line) {
                Ok(r) => r,
                Err(e) => {
                    let response = JsonRpcResponse::error(
                        None,
                        error_codes::PARSE_ERROR,
                        format!("Parse error: {}", e),
                    );
                    let response_str = serde_json::to_string(&response)?;
                    stdout.write_all(response_str.as_bytes()).await?;
                    stdout.write_all(b"\n").await?;
                    stdout.flush().await?;
                    continue;
                }
            };

            let response = self.handle_request(request).await;
            let response_str = serde_json::to_string(&response)?;

            debug!("Sending: {}", response_str);

            stdout.write_all(response_str.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }

        Ok(())
    }
}

/// Run the MCP server
pub async fn run_server() -> Result<(), Box<dyn std::error::Error>> {
    let server = McpServer::new();
    server.run_stdio().await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: &str, params: Option<Value>) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id: Some(json!(1)),
        }
    }

    #[test]
    fn test_json_rpc_response_success() {
        let response = JsonRpcResponse::success(Some(json!(1)), json!({"result": "ok"}));
        assert!(response.result.is_some());
        assert!(response.error.is_none());
    }

    #[test]
    fn test_json_rpc_response_error() {
        let response = JsonRpcResponse::error(Some(json!(1)), -32600, "Invalid request");
        assert!(response.result.is_none());
        assert!(response.error.is_some());
        assert_eq!(response.error.unwrap().code, -32600);
    }

    #[test]
    fn test_parse_request() {
        let json = r#"{"jsonrpc":"2.0","method":"tools/list","id":1}"#;
        let request: JsonRpcRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.method, "tools/list");
        assert_eq!(request.id, Some(json!(1)));
    }

    #[tokio::test]
    async fn test_initialize_advertises_tools_and_prompts() {
        let server = McpServer::new();
        let response = server.handle_request(request("initialize", None)).await;

        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert!(result["capabilities"]["tools"].is_object());
        assert!(result["capabilities"]["prompts"].is_object());
        assert_eq!(result["serverInfo"]["name"], "htpasswd-toolserver");
    }

    #[tokio::test]
    async fn test_tools_list_has_exactly_one_tool() {
        let server = McpServer::new();
        let response = server.handle_request(request("tools/list", None)).await;

        let tools = response.result.unwrap()["tools"].as_array().unwrap().clone();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["name"], "generateHtpasswd");

        let required = tools[0]["inputSchema"]["required"].as_array().unwrap();
        assert!(required.contains(&json!("username")));
        assert!(required.contains(&json!("password")));
    }

    #[tokio::test]
    async fn test_tools_call_success() {
        let server = McpServer::new();
        let response = server
            .handle_request(request(
                "tools/call",
                Some(json!({
                    "name": "generateHtpasswd",
                    "arguments": {"username": "alice", "password": "s3cret"}
                })),
            ))
            .await;

        let result = response.result.unwrap();
        assert_eq!(result["isError"], json!(false));
        let text = result["content"][0]["text"].as_str().unwrap();
        assert!(text.starts_with("alice:$2"));
    }

    #[tokio::test]
    async fn test_tools_call_validation_error_is_data() {
        let server = McpServer::new();
        let response = server
            .handle_request(request(
                "tools/call",
                Some(json!({
                    "name": "generateHtpasswd",
                    "arguments": {"username": "us:er", "password": "pw"}
                })),
            ))
            .await;

        // Validation failures are a payload, not a protocol fault.
        assert!(response.error.is_none());
        let result = response.result.unwrap();
        assert_eq!(result["isError"], json!(true));
        let text = result["content"][0]["text"].as_str().unwrap();
        assert!(text.starts_with("Error generating htpasswd:"));
    }

    #[tokio::test]
    async fn test_tools_call_unknown_tool_is_protocol_error() {
        let server = McpServer::new();
        let response = server
            .handle_request(request(
                "tools/call",
                Some(json!({"name": "no_such_tool", "arguments": {}})),
            ))
            .await;

        assert!(response.result.is_none());
        assert_eq!(response.error.unwrap().code, error_codes::TOOL_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_tools_call_missing_params() {
        let server = McpServer::new();
        let response = server.handle_request(request("tools/call", None)).await;

        assert_eq!(response.error.unwrap().code, error_codes::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_prompts_list_has_exactly_one_prompt() {
        let server = McpServer::new();
        let response = server.handle_request(request("prompts/list", None)).await;

        let prompts = response.result.unwrap()["prompts"]
            .as_array()
            .unwrap()
            .clone();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0]["name"], "interactiveGenerateHtpasswd");
        assert_eq!(prompts[0]["arguments"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_prompts_get_success() {
        let server = McpServer::new();
        let response = server
            .handle_request(request(
                "prompts/get",
                Some(json!({
                    "name": "interactiveGenerateHtpasswd",
                    "arguments": {"username": "bob", "password": "hunter2"}
                })),
            ))
            .await;

        let result = response.result.unwrap();
        assert_eq!(result["description"], "Generated htpasswd entry");
        assert_eq!(result["messages"][0]["role"], "assistant");
        let text = result["messages"][0]["content"]["text"].as_str().unwrap();
        assert!(text.starts_with("bob:$2"));
    }

    #[tokio::test]
    async fn test_prompts_get_unknown_prompt_is_protocol_error() {
        let server = McpServer::new();
        let response = server
            .handle_request(request(
                "prompts/get",
                Some(json!({"name": "no_such_prompt", "arguments": {}})),
            ))
            .await;

        assert_eq!(response.error.unwrap().code, error_codes::PROMPT_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let server = McpServer::new();
        let response = server.handle_request(request("bogus/method", None)).await;

        assert_eq!(response.error.unwrap().code, error_codes::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_ping() {
        let server = McpServer::new();
        let response = server.handle_request(request("ping", None)).await;

        assert_eq!(response.result, Some(json!({})));
    }
}
