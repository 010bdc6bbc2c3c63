//! Kaiten MCP Server
//!
//! Run with: KAITEN_DOMAIN=xxx KAITEN_TOKEN=xxx kaiten-mcp [--transport stdio]

use anyhow::Context;
use clap::{Parser, ValueEnum};
use kaiten_api_client::ClientConfig;
use kaiten_mcp::transport::{serve_http, serve_stdio};
use kaiten_mcp::{init_tracing, serve_then_close, ApiClient, StaticToken};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "kaiten-mcp", about = "MCP server for the Kaiten API")]
struct Cli {
    /// How MCP clients connect
    #[arg(long, value_enum, default_value_t = Transport::Http)]
    transport: Transport,
    /// Listen address for the HTTP transport
    #[arg(long, default_value = "0.0.0.0:8080")]
    bind: SocketAddr,
    /// Seconds open HTTP sessions get to finish after a shutdown signal
    #[arg(long, default_value_t = 10)]
    shutdown_grace_secs: u64,
    /// File that receives a copy of the logs; empty disables it
    #[arg(long, env = "KAITEN_LOG_FILE", default_value = "log.log")]
    log_file: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Transport {
    /// Streamable HTTP on --bind, guarded by a bearer token
    Http,
    /// stdin/stdout
    Stdio,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_file = Some(PathBuf::from(cli.log_file.trim()))
        .filter(|path| !path.as_os_str().is_empty());
    let _log_guard = init_tracing(log_file.as_deref())?;

    let config = ClientConfig::from_env()
        .context("Invalid configuration. Set KAITEN_DOMAIN and KAITEN_TOKEN environment variables")?;
    // Inbound callers authenticate with the upstream token unless told otherwise.
    let inbound_token = std::env::var("KAITEN_MCP_TOKEN")
        .ok()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| config.token.clone());

    let api_client = Arc::new(ApiClient::new(config).context("Failed to create API client")?);

    match cli.transport {
        Transport::Http => {
            let serve = serve_http(
                Arc::clone(&api_client),
                StaticToken::new(inbound_token),
                cli.bind,
                Duration::from_secs(cli.shutdown_grace_secs),
            );
            serve_then_close(&api_client, serve).await
        }
        Transport::Stdio => {
            serve_then_close(&api_client, serve_stdio(Arc::clone(&api_client))).await
        }
    }
}
