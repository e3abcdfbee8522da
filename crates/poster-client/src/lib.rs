//! Poster lookup client for the movie metadata API.
//!
//! This crate turns a movie id into a poster image URL. It handles:
//! - Building and sending the metadata request (reqwest)
//! - Retrying transient server statuses inside the transport
//! - Retrying failed attempts with exponential backoff
//! - Downgrading exhausted lookups to placeholder images
//! - Memoizing resolved URLs per movie id
//!
//! ## Example Usage
//!
//! ```ignore
//! use poster_client::{PosterConfig, PosterFetcher};
//!
//! let fetcher = PosterFetcher::from_config(&PosterConfig::new(api_key))?;
//! let url = fetcher.fetch_poster(19995).await;
//! ```

pub mod config;
pub mod error;
pub mod fetcher;
pub mod retry;
pub mod transport;

pub use config::{
    CONNECTION_PLACEHOLDER_URL, ERROR_PLACEHOLDER_URL, NO_POSTER_URL, PosterConfig, RetryPolicy,
    StatusRetryPolicy, TIMEOUT_PLACEHOLDER_URL,
};
pub use error::{FailureKind, PosterFetchError, TransportError};
pub use fetcher::PosterFetcher;
pub use retry::{AttemptState, Sleeper, TokioSleeper};
pub use transport::{HttpTransport, MetadataTransport, MovieDetails};
