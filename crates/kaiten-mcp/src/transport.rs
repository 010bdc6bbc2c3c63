//! Transports: streamable HTTP behind bearer auth, or stdio.

use crate::auth::{auth_middleware, StaticToken};
use crate::server::KaitenService;
use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use kaiten_api_client::ApiClient;
use rmcp::service::ServiceExt;
use rmcp::transport::io::stdio;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Path the MCP endpoint is mounted on.
pub const MCP_PATH: &str = "/mcp";

/// Build the HTTP router: `/mcp` requires the bearer token, `/health` does not.
pub fn router(api_client: Arc<ApiClient>, token: StaticToken) -> Router {
    // One service instance per MCP session, all sharing the same client.
    let service = StreamableHttpService::new(
        move || Ok(KaitenService::new(Arc::clone(&api_client))),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );

    Router::new()
        .nest_service(MCP_PATH, service)
        .layer(axum::middleware::from_fn_with_state(token, auth_middleware))
        .route("/health", get(|| async { "ok" }))
}

/// Serve MCP over streamable HTTP until Ctrl+C or SIGTERM.
pub async fn serve_http(
    api_client: Arc<ApiClient>,
    token: StaticToken,
    addr: SocketAddr,
    grace: Duration,
) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(addr = %addr, path = MCP_PATH, "Kaiten MCP server listening");

    serve_http_until(listener, router(api_client, token), shutdown_signal(), grace).await
}

/// Serve `app` on `listener` until `signal` resolves.
///
/// Open connections get `grace` to drain after the signal. MCP sessions hold
/// their event streams open indefinitely, so whatever is still connected when
/// the grace period ends is abandoned and this returns anyway.
pub async fn serve_http_until<S>(
    listener: TcpListener,
    app: Router,
    signal: S,
    grace: Duration,
) -> Result<()>
where
    S: Future<Output = ()> + Send,
{
    let (drain_tx, drain_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            drain_rx.await.ok();
        })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => return result.context("HTTP server error"),
        _ = signal => {}
    }

    drain_tx.send(()).ok();
    match tokio::time::timeout(grace, &mut server).await {
        Ok(result) => result.context("HTTP server error"),
        Err(_) => {
            tracing::warn!(
                grace_secs = grace.as_secs_f64(),
                "Connections still open after grace period, dropping them"
            );
            Ok(())
        }
    }
}

/// Serve MCP over stdin/stdout until the peer disconnects.
pub async fn serve_stdio(api_client: Arc<ApiClient>) -> Result<()> {
    tracing::info!("Kaiten MCP server running on stdio");
    let service = KaitenService::new(api_client);
    let running = service.serve(stdio()).await.context("MCP transport failed")?;
    running.waiting().await.context("MCP server error")?;
    Ok(())
}

/// Resolves on Ctrl+C (SIGINT) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
    }

    tracing::info!("Shutting down gracefully...");
}
