//! htpasswd Core - credential hashing for htpasswd entries
//!
//! This crate provides:
//! - Validation of username/password pairs
//! - bcrypt hashing with a fresh salt per entry
//! - The `username:hash` entry format used by Apache `.htpasswd` files
//!
//! It deliberately does no I/O: no file handling, no logging, no protocol.
//! The MCP server crate wraps this with its transport concerns.

pub mod credential;
pub mod error;

pub use credential::*;
pub use error::*;
