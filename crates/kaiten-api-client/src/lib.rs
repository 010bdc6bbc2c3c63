//! Rate-limited HTTP client for the Kaiten API.
//!
//! Every request goes through [`ApiClient::execute`], which throttles issuance
//! to a fixed number of requests per rolling window and retries
//! `429 Too Many Requests` responses, honoring `X-RateLimit-Reset` when the
//! server sends it. Resource operations (spaces, boards, cards) live in [`api`].

pub mod api;
pub mod config;
pub mod error;
pub mod retry;
pub mod throttle;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use tokio::sync::RwLock;

pub use api::ResourceId;
pub use config::ClientConfig;
pub use error::{ApiError, ConfigError};
pub use retry::{RetryPolicy, RATE_LIMIT_RESET_HEADER};
pub use throttle::Throttle;

/// Versioned prefix of every API path.
pub const API_PREFIX: &str = "/api/v1";

/// HTTP client for the Kaiten API with client-side throttling and 429 retry.
#[derive(Debug)]
pub struct ApiClient {
    transport: RwLock<Option<Client>>,
    base_url: String,
    throttle: Throttle,
    retry: RetryPolicy,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|_| ConfigError::InvalidToken)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(ConfigError::HttpClient)?;

        let throttle = Throttle::new(
            config.max_in_flight,
            config.max_requests,
            config.rate_window,
        );
        let base_url = config.base_url.trim_end_matches('/').to_string();

        tracing::info!(
            base_url = %base_url,
            max_in_flight = throttle.max_in_flight(),
            max_requests = throttle.max_requests(),
            window_ms = throttle.period().as_millis() as u64,
            max_retries = config.retry.max_retries,
            "Kaiten API client created"
        );

        Ok(Self {
            transport: RwLock::new(Some(client)),
            base_url,
            throttle,
            retry: config.retry,
        })
    }

    /// Create client from environment. See [`ClientConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Release the connection pool and stop admitting requests.
    ///
    /// Idempotent. Callers waiting for admission fail with [`ApiError::Closed`];
    /// attempts already on the wire finish normally.
    pub async fn close(&self) {
        let released = self.transport.write().await.take();
        self.throttle.close();
        if released.is_some() {
            tracing::info!(base_url = %self.base_url, "Kaiten API client closed");
        } else {
            tracing::debug!(base_url = %self.base_url, "Kaiten API client already closed");
        }
    }

    pub async fn is_closed(&self) -> bool {
        self.transport.read().await.is_none()
    }

    async fn transport(&self) -> Result<Client, ApiError> {
        self.transport.read().await.clone().ok_or(ApiError::Closed)
    }

    /// Execute one logical request and return the decoded JSON body.
    ///
    /// Each attempt is admitted by the throttle. A 429 is retried after the
    /// wait given by the retry policy until `max_retries` is exceeded; any
    /// other error status, transport failure or undecodable body fails at once.
    /// An empty success body decodes to `Value::Null`.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let client = self.transport().await?;
        let url = self.build_url(path);
        let mut retries: u32 = 0;

        loop {
            let admission = self.throttle.acquire().await.map_err(|_| {
                tracing::error!(method = %method, path, "Request rejected, client is closed");
                ApiError::Closed
            })?;

            let mut request = client.request(method.clone(), &url);
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!(method = %method, path, error = %e, "Network error");
                    return Err(ApiError::from(e));
                }
            };

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                let wait = self.retry.wait_for(response.headers(), retries);
                let text = match response.text().await {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!(
                            method = %method,
                            path,
                            error = %e,
                            "Failed to read 429 response body"
                        );
                        String::new()
                    }
                };
                drop(admission);

                retries += 1;
                if retries > self.retry.max_retries {
                    tracing::error!(
                        method = %method,
                        path,
                        attempts = retries,
                        body = %text,
                        "Rate limit retries exhausted"
                    );
                    return Err(ApiError::RateLimitExceeded {
                        attempts: retries,
                        body: text,
                    });
                }

                tracing::warn!(
                    method = %method,
                    path,
                    retry = retries,
                    wait_secs = wait.as_secs_f64(),
                    "Rate limit exceeded, retrying"
                );
                tokio::time::sleep(wait).await;
                continue;
            }

            let text = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!(
                        method = %method,
                        path,
                        status = status.as_u16(),
                        error = %e,
                        "Failed to read response body"
                    );
                    return Err(ApiError::from(e));
                }
            };
            drop(admission);

            if !status.is_success() {
                tracing::error!(
                    method = %method,
                    path,
                    status = status.as_u16(),
                    body = %text,
                    "HTTP error"
                );
                return Err(ApiError::HttpStatus {
                    status: status.as_u16(),
                    body: text,
                });
            }

            tracing::info!(method = %method, path, status = status.as_u16(), "Request succeeded");
            tracing::debug!(body = %text, "Response body");

            if text.trim().is_empty() {
                return Ok(Value::Null);
            }
            return serde_json::from_str(&text).map_err(|source| {
                tracing::error!(method = %method, path, error = %source, "Invalid JSON in response");
                ApiError::InvalidJson { source }
            });
        }
    }
}
