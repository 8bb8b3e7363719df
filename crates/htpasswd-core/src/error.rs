//! Error types for htpasswd entry generation

use thiserror::Error;

/// Errors that can occur while generating an htpasswd entry
#[derive(Error, Debug)]
pub enum HtpasswdError {
    #[error("Username cannot be empty")]
    EmptyUsername,

    #[error("Password cannot be empty")]
    EmptyPassword,

    #[error("Username cannot contain a colon (:)")]
    UsernameContainsColon,

    #[error("bcrypt hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

impl HtpasswdError {
    /// True for malformed caller input, false for crypto failures.
    ///
    /// Validation errors are recoverable by the caller (fix the input and
    /// retry); a hash failure means the platform's randomness or the bcrypt
    /// primitive itself is broken and nothing the caller does will help.
    pub fn is_validation(&self) -> bool {
        !matches!(self, HtpasswdError::Hash(_))
    }
}

/// Errors during MCP operations
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Prompt not found: {0}")]
    PromptNotFound(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error(transparent)]
    Hasher(#[from] HtpasswdError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type HtpasswdResult<T> = Result<T, HtpasswdError>;
pub type McpResult<T> = Result<T, McpError>;
