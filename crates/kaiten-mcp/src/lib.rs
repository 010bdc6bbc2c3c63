//! Kaiten MCP Server
//!
//! Model Context Protocol server that exposes Kaiten spaces, boards and cards
//! as tools for AI assistants. All upstream calls go through the shared
//! rate-limited [`ApiClient`].

pub mod auth;
pub mod server;
pub mod tools;
pub mod transport;

pub use auth::StaticToken;
pub use kaiten_api_client::ApiClient;
pub use server::KaitenService;

use anyhow::Context;
use std::fs::OpenOptions;
use std::future::Future;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Build the log subscriber: stderr always, plus `log_file` when given.
///
/// Stdout is never written so it stays free for stdio MCP. The returned guard
/// flushes the file writer when dropped and must outlive the subscriber.
pub fn build_subscriber(
    log_file: Option<&Path>,
) -> anyhow::Result<(impl tracing::Subscriber + Send + Sync + 'static, Option<WorkerGuard>)> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer);

    Ok((subscriber, guard))
}

/// Install [`build_subscriber`] as the global default.
pub fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let (subscriber, guard) = build_subscriber(log_file)?;
    subscriber.init();
    Ok(guard)
}

/// Drive `serve` to completion, then close `api_client` whatever the outcome.
pub async fn serve_then_close<F>(api_client: &ApiClient, serve: F) -> anyhow::Result<()>
where
    F: Future<Output = anyhow::Result<()>>,
{
    let result = serve.await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "Transport stopped with an error");
    }
    api_client.close().await;
    result
}
