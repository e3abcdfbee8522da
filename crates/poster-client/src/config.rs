//! Poster lookup configuration and the fixed URLs it falls back to.

use std::time::Duration;

use reqwest::StatusCode;

/// Movie details endpoint; the movie id is appended as a path segment
pub const DEFAULT_API_BASE_URL: &str = "https://api.themoviedb.org/3/movie";

/// Prefix for `poster_path` values returned by the API
pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

pub const NO_POSTER_URL: &str = "https://via.placeholder.com/500x750?text=No+Poster";
pub const TIMEOUT_PLACEHOLDER_URL: &str = "https://via.placeholder.com/500x750?text=Poster+Error";
pub const CONNECTION_PLACEHOLDER_URL: &str =
    "https://via.placeholder.com/500x750?text=Connection+Error";
pub const ERROR_PLACEHOLDER_URL: &str = "https://via.placeholder.com/500x750?text=Error";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Attempt-level retry: every failed request is retried until
/// `max_attempts` requests have been made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Delay after the first failure; doubles after each further failure
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the `failed_attempt`-th attempt (1-based) failed
    pub fn backoff_delay(&self, failed_attempt: u32) -> Duration {
        let exponent = failed_attempt.saturating_sub(1).min(31);
        self.base_delay.saturating_mul(1 << exponent)
    }
}

/// Connection-level retry inside the HTTP transport, for transient server
/// errors only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRetryPolicy {
    /// Retries after the first request
    pub max_retries: u32,
    /// Delay before retry `n` is `backoff_factor * 2^(n-1)`
    pub backoff_factor: Duration,
    pub statuses: Vec<StatusCode>,
}

impl Default for StatusRetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_factor: Duration::from_millis(500),
            statuses: vec![
                StatusCode::INTERNAL_SERVER_ERROR,
                StatusCode::BAD_GATEWAY,
                StatusCode::GATEWAY_TIMEOUT,
            ],
        }
    }
}

impl StatusRetryPolicy {
    pub fn is_retryable(&self, status: StatusCode) -> bool {
        self.statuses.contains(&status)
    }

    /// Delay before the `retry`-th retry (1-based)
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(31);
        self.backoff_factor.saturating_mul(1 << exponent)
    }
}

/// Everything needed to build an HTTP transport and a fetcher
#[derive(Debug, Clone)]
pub struct PosterConfig {
    pub api_base_url: String,
    pub api_key: String,
    pub language: String,
    pub image_base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub status_retry: StatusRetryPolicy,
}

impl Default for PosterConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_key: String::new(),
            language: "en-US".to_string(),
            image_base_url: IMAGE_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            status_retry: StatusRetryPolicy::default(),
        }
    }
}

impl PosterConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}
