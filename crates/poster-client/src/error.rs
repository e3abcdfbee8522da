//! Errors for poster lookups.
//!
//! `TransportError` is what a single request can fail with. The retry layer
//! classifies it into a `FailureKind`, and a `PosterFetchError` is what's left
//! once every attempt has failed. None of these reach the caller of
//! `PosterFetcher::fetch_poster`; they are downgraded to placeholder URLs.

use thiserror::Error;

use crate::config::{CONNECTION_PLACEHOLDER_URL, ERROR_PLACEHOLDER_URL, TIMEOUT_PLACEHOLDER_URL};
use data_loader::MovieId;

/// Failure of a single metadata request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("metadata API returned status {0}")]
    Status(u16),

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("request failed: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        // A connect timeout is both; report it as a timeout
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::Connection(e.to_string())
        } else if e.is_decode() {
            TransportError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            TransportError::Status(status.as_u16())
        } else {
            TransportError::Other(e.to_string())
        }
    }
}

/// Failure categories, each with its own placeholder image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Timeout,
    Connection,
    Generic,
}

impl FailureKind {
    /// Map a request failure to its category
    pub fn classify(error: &TransportError) -> Self {
        match error {
            TransportError::Timeout => FailureKind::Timeout,
            TransportError::Connection(_) => FailureKind::Connection,
            TransportError::Status(_) | TransportError::Decode(_) | TransportError::Other(_) => {
                FailureKind::Generic
            }
        }
    }

    pub fn placeholder_url(self) -> &'static str {
        match self {
            FailureKind::Timeout => TIMEOUT_PLACEHOLDER_URL,
            FailureKind::Connection => CONNECTION_PLACEHOLDER_URL,
            FailureKind::Generic => ERROR_PLACEHOLDER_URL,
        }
    }
}

/// All attempts to look up a poster failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("poster lookup for movie {movie_id} failed after {attempts} attempts ({kind:?}): {source}")]
pub struct PosterFetchError {
    pub movie_id: MovieId,
    pub kind: FailureKind,
    pub attempts: u32,
    pub source: TransportError,
}

impl PosterFetchError {
    pub fn placeholder_url(&self) -> &'static str {
        self.kind.placeholder_url()
    }
}
