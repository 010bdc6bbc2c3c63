//! Client configuration
//!
//! Settings come from the environment: `KAITEN_DOMAIN` (or `DOMAIN`) and
//! `KAITEN_TOKEN` (or `TOKEN`) are required, everything else has a default.

use crate::error::ConfigError;
use crate::retry::RetryPolicy;
use std::str::FromStr;
use std::time::Duration;

const MAX_IN_FLIGHT: usize = 5;
const MAX_REQUESTS_PER_SECOND: usize = 5;
const RATE_WINDOW: Duration = Duration::from_secs(1);
const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub token: String,
    /// Attempts allowed on the wire at once, independent of the rate.
    pub max_in_flight: usize,
    /// Admissions allowed per `rate_window`.
    pub max_requests: usize,
    pub rate_window: Duration,
    pub retry: RetryPolicy,
    pub timeout: Duration,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("max_in_flight", &self.max_in_flight)
            .field("max_requests", &self.max_requests)
            .field("rate_window", &self.rate_window)
            .field("retry", &self.retry)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            max_in_flight: MAX_IN_FLIGHT,
            max_requests: MAX_REQUESTS_PER_SECOND,
            rate_window: RATE_WINDOW,
            retry: RetryPolicy::default(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn with_rate_limit(mut self, max_requests: usize, rate_window: Duration) -> Self {
        self.max_requests = max_requests;
        self.rate_window = rate_window;
        self
    }

    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let base_url = get("KAITEN_DOMAIN")
            .or_else(|| get("DOMAIN"))
            .ok_or(ConfigError::Missing("KAITEN_DOMAIN"))?;
        let token = get("KAITEN_TOKEN")
            .or_else(|| get("TOKEN"))
            .ok_or(ConfigError::Missing("KAITEN_TOKEN"))?;

        let mut config = Self::new(base_url, token);

        if let Some(max) = parse_var::<usize, _>(&get, "KAITEN_MAX_REQUESTS_PER_SECOND")? {
            config.max_requests = max;
        }
        if let Some(max) = parse_var::<usize, _>(&get, "KAITEN_MAX_IN_FLIGHT")? {
            config.max_in_flight = max;
        }
        if let Some(retries) = parse_var::<u32, _>(&get, "KAITEN_MAX_RETRIES")? {
            config.retry.max_retries = retries;
        }
        if let Some(ms) = parse_var::<u64, _>(&get, "KAITEN_BACKOFF_BASE_MS")? {
            config.retry.backoff_base = Duration::from_millis(ms);
        }
        if let Some(secs) = parse_var::<u64, _>(&get, "KAITEN_TIMEOUT_SECS")? {
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn parse_var<T, F>(get: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match get(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
