use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use kaiten_api_client::{ApiClient, ClientConfig};
use kaiten_mcp::transport::{router, MCP_PATH};
use kaiten_mcp::StaticToken;
use std::sync::Arc;
use tower::ServiceExt;

const INITIALIZE: &str = r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"test","version":"0.0.0"}}}"#;

fn app() -> Router {
    let client = ApiClient::new(ClientConfig::new("http://127.0.0.1:1", "upstream")).unwrap();
    router(Arc::new(client), StaticToken::new("inbound-secret"))
}

fn mcp_request(auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(MCP_PATH)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ACCEPT, "application/json, text/event-stream");
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::from(INITIALIZE)).unwrap()
}

#[tokio::test]
async fn missing_token_is_rejected() {
    let response = app().oneshot(mcp_request(None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );
}

#[tokio::test]
async fn wrong_token_is_rejected() {
    let response = app()
        .oneshot(mcp_request(Some("Bearer not-the-secret")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_bearer_scheme_is_rejected() {
    let response = app()
        .oneshot(mcp_request(Some("Basic aW5ib3VuZC1zZWNyZXQ=")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn upstream_token_is_not_accepted_when_inbound_differs() {
    let response = app()
        .oneshot(mcp_request(Some("Bearer upstream")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn valid_token_reaches_mcp_service() {
    let response = app()
        .oneshot(mcp_request(Some("Bearer inbound-secret")))
        .await
        .unwrap();
    assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_does_not_require_token() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"ok");
}
