//! htpasswd MCP Server - Entry Point

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use htpasswd_mcp::run_server;

/// Initialize logging
fn init_logging() {
    // Log to stderr (stdout is used for MCP protocol)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .compact(),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    info!("htpasswd MCP server starting");

    if let Err(e) = run_server().await {
        error!("Failed to start server: {}", e);
        return Err(e);
    }

    info!("htpasswd MCP server shutting down");
    Ok(())
}
