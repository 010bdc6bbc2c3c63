//! Static bearer-token authentication for the HTTP transport.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// The single token inbound callers must present.
#[derive(Clone)]
pub struct StaticToken(Arc<str>);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Arc::from(token.into()))
    }

    pub fn verify(&self, presented: &str) -> bool {
        secure_compare(presented, &self.0)
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticToken(<redacted>)")
    }
}

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn unauthorized(reason: &'static str) -> Response {
    tracing::warn!(reason, "Rejected unauthenticated MCP request");
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Bearer")],
        "Unauthorized",
    )
        .into_response()
}

pub async fn auth_middleware(
    State(token): State<StaticToken>,
    request: Request,
    next: Next,
) -> Response {
    let auth_header = match request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => return unauthorized("Missing authorization header"),
    };

    let presented = match auth_header.strip_prefix("Bearer ") {
        Some(t) => t.trim(),
        None => return unauthorized("Authorization header is not a bearer token"),
    };

    if !token.verify(presented) {
        return unauthorized("Invalid token");
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_requires_exact_match() {
        let token = StaticToken::new("s3cret");
        assert!(token.verify("s3cret"));
        assert!(!token.verify("s3cre"));
        assert!(!token.verify("s3cret "));
        assert!(!token.verify("S3CRET"));
        assert!(!token.verify(""));
    }

    #[test]
    fn debug_output_hides_token() {
        let token = StaticToken::new("s3cret");
        assert!(!format!("{token:?}").contains("s3cret"));
    }
}
