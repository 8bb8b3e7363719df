//! Operation handlers for the MCP server
//!
//! Dispatches tool and prompt invocations to the credential hasher

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tokio::task;
use tracing::debug;

use htpasswd_core::{generate_entry, HtpasswdError, McpError, McpResult};

/// Tool call arguments
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolCallArgs {
    /// Arguments as key-value pairs
    #[serde(flatten)]
    pub args: HashMap<String, Value>,
}

impl ToolCallArgs {
    /// Build from a JSON object, ignoring anything that is not an object.
    pub fn from_value(value: Value) -> Self {
        Self {
            args: value
                .as_object()
                .map(|obj| obj.clone().into_iter().collect())
                .unwrap_or_default(),
        }
    }

    /// Get a string argument
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.args.get(key).and_then(|v| v.as_str()).map(String::from)
    }

    /// Get a string argument, treating a missing key as empty.
    ///
    /// A missing required field is the same caller mistake as an empty one,
    /// so both flow through the hasher's validation and come back as the
    /// same descriptive error rather than a protocol fault.
    pub fn string_or_empty(&self, key: &str) -> String {
        self.get_string(key).unwrap_or_default()
    }
}

/// Tool execution result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether execution was successful
    pub success: bool,
    /// Result text (the htpasswd entry, or an error description)
    pub text: String,
}

impl ToolResult {
    /// Create a successful result
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            success: true,
            text: text.into(),
        }
    }

    /// Create an error result
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            text: message.into(),
        }
    }
}

/// A single message in a prompt result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptMessage {
    /// Message role
    pub role: String,
    /// Message content
    pub content: MessageContent,
}

/// Text content of a prompt message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

impl PromptMessage {
    /// Create an assistant text message
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: MessageContent {
                content_type: "text".to_string(),
                text: text.into(),
            },
        }
    }
}

/// Prompt execution result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptResult {
    /// Human-readable description of the outcome
    pub description: String,
    /// Conversation messages carrying the result
    pub messages: Vec<PromptMessage>,
}

/// Handles tool and prompt invocations
pub struct CredentialHandler;

impl CredentialHandler {
    /// Create a new handler
    pub fn new() -> Self {
        Self
    }

    /// Handle a tool call
    pub async fn handle_tool(&self, tool_name: &str, args: ToolCallArgs) -> McpResult<ToolResult> {
        match tool_name {
            "generateHtpasswd" => self.handle_generate_htpasswd(args).await,
            _ => Err(McpError::ToolNotFound(tool_name.to_string())),
        }
    }

    /// Handle a prompt request
    pub async fn handle_prompt(
        &self,
        prompt_name: &str,
        args: ToolCallArgs,
    ) -> McpResult<PromptResult> {
        match prompt_name {
            "interactiveGenerateHtpasswd" => self.handle_interactive_generate(args).await,
            _ => Err(McpError::PromptNotFound(prompt_name.to_string())),
        }
    }

    /// Generate an htpasswd entry, framed as a tool result
    async fn handle_generate_htpasswd(&self, args: ToolCallArgs) -> McpResult<ToolResult> {
        match self.generate(args).await? {
            Ok(entry) => Ok(ToolResult::success(entry)),
            Err(e) => Ok(ToolResult::error(format!("Error generating htpasswd: {}", e))),
        }
    }

    /// Generate an htpasswd entry, framed as a conversational prompt result
    async fn handle_interactive_generate(&self, args: ToolCallArgs) -> McpResult<PromptResult> {
        match self.generate(args).await? {
            Ok(entry) => Ok(PromptResult {
                description: "Generated htpasswd entry".to_string(),
                messages: vec![PromptMessage::assistant(entry)],
            }),
            Err(e) => Ok(PromptResult {
                description: "Error generating htpasswd entry".to_string(),
                messages: vec![PromptMessage::assistant(format!("Error: {}", e))],
            }),
        }
    }

    /// Run the hash on a blocking worker.
    ///
    /// bcrypt at cost 10 pins a CPU for tens of milliseconds, so it must not
    /// run on the async scheduler. Validation failures come back in the inner
    /// `Err` for the caller to frame as data; crypto failures propagate as
    /// `McpError` and become protocol-level internal errors.
    async fn generate(
        &self,
        args: ToolCallArgs,
    ) -> McpResult<Result<String, HtpasswdError>> {
        let username = args.string_or_empty("username");
        let password = args.string_or_empty("password");

        debug!(username = %username, "generating htpasswd entry");

        let result = task::spawn_blocking(move || generate_entry(&username, &password))
            .await
            .map_err(|e| McpError::Internal(format!("hash task panicked: {}", e)))?;

        match result {
            Ok(entry) => Ok(Ok(entry)),
            Err(e) if e.is_validation() => Ok(Err(e)),
            Err(e) => Err(McpError::Hasher(e)),
        }
    }
}

impl Default for CredentialHandler {
    fn default() -> Self {
        Self::new()
    }
}
