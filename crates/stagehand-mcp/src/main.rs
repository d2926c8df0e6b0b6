//! Stagehand MCP Server Binary
//!
//! Runs the Stagehand MCP server on stdio transport, exposing the editor's
//! `manage_*` tools to AI agents.
//!
//! ## Usage
//!
//! Run directly:
//! ```bash
//! stagehand-mcp
//! stagehand-mcp --config ./stagehand.json
//! ```
//!
//! Or add to an MCP client configuration:
//! ```json
//! {
//!   "mcpServers": {
//!     "stagehand": {
//!       "command": "stagehand-mcp"
//!     }
//!   }
//! }
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rmcp::ServiceExt;
use rmcp::transport::io::stdio;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use stagehand_mcp::config::{self, ServerConfig};
use stagehand_mcp::state::EditorState;
use stagehand_mcp::StagehandMcpService;

#[derive(Parser)]
#[command(name = "stagehand-mcp")]
#[command(author, version, about = "MCP server for Stagehand editor tools")]
struct Args {
    /// Config file (defaults to {config_dir}/stagehand/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start with an empty document instead of the sample content
    #[arg(long)]
    empty: bool,

    /// Write the effective configuration to the config path and exit
    #[arg(long)]
    write_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let (mut server_config, config_error) = ServerConfig::load(args.config.as_deref());
    if args.empty {
        server_config.seed_demo_content = false;
    }

    // CRITICAL: Log to stderr only - stdout is reserved for MCP JSON-RPC
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(tracing_subscriber::EnvFilter::new(server_config.effective_log_filter()))
        .init();

    if let Some(e) = config_error {
        tracing::warn!("Using default configuration: {e:#}");
    }

    if args.write_config {
        let path = args
            .config
            .or_else(config::default_path)
            .context("Could not determine config directory")?;
        server_config.save(&path)?;
        eprintln!("Wrote {}", path.display());
        return Ok(());
    }

    eprintln!("Stagehand MCP server v{}", env!("CARGO_PKG_VERSION"));

    let state = EditorState::new(&server_config)?;
    let summary = state.summary().await?;

    eprintln!("Editor ready: {summary}.");
    eprintln!(
        "Operation timeout: {} ms. Listening on stdio...",
        server_config.operation_timeout_ms
    );

    // Create service and serve on stdio transport
    let service = StagehandMcpService::new(state);
    let server = service.serve(stdio()).await?;

    // Wait for client to disconnect or error
    server.waiting().await?;

    eprintln!("Client disconnected. Shutting down.");
    Ok(())
}
