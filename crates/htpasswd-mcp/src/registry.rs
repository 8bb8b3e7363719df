//! Tool and prompt registries for the MCP server
//!
//! Defines the available operations and their schemas

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

/// Tool definition for MCP
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name
    pub name: String,
    /// Tool description
    pub description: String,
    /// Input schema (JSON Schema)
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Prompt definition for MCP
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Prompt name
    pub name: String,
    /// Prompt description
    pub description: String,
    /// Prompt arguments
    pub arguments: Vec<PromptArgument>,
}

/// A single prompt argument
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptArgument {
    /// Argument name
    pub name: String,
    /// Description
    pub description: String,
    /// Is required
    #[serde(default)]
    pub required: bool,
}

/// Tool registry
#[derive(Debug, Default)]
pub struct ToolRegistry {
    /// Registered tools
    tools: HashMap<String, ToolDefinition>,
}

impl ToolRegistry {
    /// Create a new tool registry with the default htpasswd tool
    pub fn new() -> Self {
        let mut registry = Self::default();
        registry.register_default_tools();
        registry
    }

    fn register_default_tools(&mut self) {
        self.register(ToolDefinition {
            name: "generateHtpasswd".to_string(),
            description: "Generate an htpasswd entry for Apache web server authentication. \
                          Creates a bcrypt-hashed password entry in the format \
                          'username:hashedpassword' that can be used in .htpasswd files."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "username": {
                        "type": "string",
                        "description": "The username for the htpasswd entry. This will appear before the colon in the output. Cannot contain colons.",
                        "minLength": 1
                    },
                    "password": {
                        "type": "string",
                        "description": "The plain text password to be hashed. This will be securely hashed using bcrypt with a salt.",
                        "minLength": 1
                    }
                },
                "required": ["username", "password"]
            }),
        });
    }

    /// Register a tool
    pub fn register(&mut self, tool: ToolDefinition) {
        self.tools.insert(tool.name.clone(), tool);
    }

    /// Get all tool definitions
    pub fn get_all(&self) -> Vec<&ToolDefinition> {
        self.tools.values().collect()
    }

    /// Get a specific tool
    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    /// Check if a tool exists
    pub fn exists(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }
}

/// Prompt registry
#[derive(Debug, Default)]
pub struct PromptRegistry {
    /// Registered prompts
    prompts: HashMap<String, PromptDefinition>,
}

impl PromptRegistry {
    /// Create a new prompt registry with the default htpasswd prompt
    pub fn new() -> Self {
        let mut registry = Self::default();
        registry.register_default_prompts();
        registry
    }

    fn register_default_prompts(&mut self) {
        self.register(PromptDefinition {
            name: "interactiveGenerateHtpasswd".to_string(),
            description: "Interactive prompt to generate htpasswd entries with user input validation"
                .to_string(),
            arguments: vec![
                PromptArgument {
                    name: "username".to_string(),
                    description: "The username for the htpasswd entry. This will be the name before the colon in the htpasswd entry.".to_string(),
                    required: true,
                },
                PromptArgument {
                    name: "password".to_string(),
                    description: "The password to be hashed. This will be securely hashed using bcrypt.".to_string(),
                    required: true,
                },
            ],
        });
    }

    /// Register a prompt
    pub fn register(&mut self, prompt: PromptDefinition) {
        self.prompts.insert(prompt.name.clone(), prompt);
    }

    /// Get all prompt definitions
    pub fn get_all(&self) -> Vec<&PromptDefinition> {
        self.prompts.values().collect()
    }

    /// Get a specific prompt
    pub fn get(&self, name: &str) -> Option<&PromptDefinition> {
        self.prompts.get(name)
    }

    /// Check if a prompt exists
    pub fn exists(&self, name: &str) -> bool {
        self.prompts.contains_key(name)
    }
}
