//! htpasswd MCP Server - bcrypt htpasswd entries over the Model Context Protocol
//!
//! This crate provides an MCP server that:
//! - Speaks JSON-RPC 2.0 over newline-delimited stdio
//! - Exposes one tool (`generateHtpasswd`) and one prompt
//!   (`interactiveGenerateHtpasswd`)
//! - Runs the CPU-bound bcrypt hash on a blocking worker
//! - Returns validation failures as data and unknown operations as
//!   protocol errors

pub mod handlers;
pub mod registry;
pub mod server;

pub use handlers::*;
pub use registry::*;
pub use server::*;
