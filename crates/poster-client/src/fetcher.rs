//! Poster Fetcher: movie id -> poster image URL.
//!
//! Wraps a [`MetadataTransport`] with the attempt-level retry policy and a
//! memo cache. `fetch_poster` never fails: a lookup that exhausts its
//! retries yields the placeholder URL for its failure category.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::config::{NO_POSTER_URL, PosterConfig, RetryPolicy};
use crate::error::{FailureKind, PosterFetchError, TransportError};
use crate::retry::{self, Sleeper, TokioSleeper};
use crate::transport::{HttpTransport, MetadataTransport, MovieDetails};
use data_loader::MovieId;

pub struct PosterFetcher<T = HttpTransport> {
    transport: T,
    retry: RetryPolicy,
    image_base_url: String,
    sleeper: Arc<dyn Sleeper>,
    /// Resolved URLs for the lifetime of the fetcher; no eviction
    cache: Mutex<HashMap<MovieId, String>>,
}

impl PosterFetcher<HttpTransport> {
    /// Fetcher over the real HTTP transport
    pub fn from_config(config: &PosterConfig) -> Result<Self, TransportError> {
        Ok(Self::new(HttpTransport::new(config)?, config))
    }
}

impl<T: MetadataTransport> PosterFetcher<T> {
    pub fn new(transport: T, config: &PosterConfig) -> Self {
        Self {
            transport,
            retry: config.retry,
            image_base_url: config.image_base_url.clone(),
            sleeper: Arc::new(TokioSleeper),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the sleeper used between attempts
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Poster URL for `movie_id`, or a placeholder; never an error.
    pub async fn fetch_poster(&self, movie_id: MovieId) -> String {
        match self.try_fetch_poster(movie_id).await {
            Ok(url) => url,
            Err(e) => {
                match e.kind {
                    FailureKind::Timeout => warn!("Timeout fetching poster for movie ID {}", movie_id),
                    FailureKind::Connection => {
                        warn!("Connection error fetching poster for movie ID {}", movie_id)
                    }
                    FailureKind::Generic => warn!("Error fetching poster: {}", e.source),
                }
                e.placeholder_url().to_string()
            }
        }
    }

    /// Like [`fetch_poster`](Self::fetch_poster) but reports exhausted retries.
    ///
    /// Only resolved outcomes (a poster, or the no-poster placeholder) are
    /// cached; a failed lookup is attempted again next time.
    pub async fn try_fetch_poster(&self, movie_id: MovieId) -> Result<String, PosterFetchError> {
        if let Some(url) = self.cached(movie_id) {
            debug!(movie_id, "Poster cache hit");
            return Ok(url);
        }

        let outcome = retry::run(&self.retry, self.sleeper.as_ref(), |_| {
            self.transport.movie_details(movie_id)
        })
        .await;

        match outcome {
            Ok((details, attempts)) => {
                let url = self.poster_url(&details);
                debug!(movie_id, attempts, url = %url, "Resolved poster");
                self.cache.lock().insert(movie_id, url.clone());
                Ok(url)
            }
            Err((error, attempts)) => Err(PosterFetchError {
                movie_id,
                kind: FailureKind::classify(&error),
                attempts,
                source: error,
            }),
        }
    }

    pub fn cached(&self, movie_id: MovieId) -> Option<String> {
        self.cache.lock().get(&movie_id).cloned()
    }

    pub fn cache_len(&self) -> usize {
        self.cache.lock().len()
    }

    fn poster_url(&self, details: &MovieDetails) -> String {
        match details.poster() {
            Some(path) => format!("{}{}", self.image_base_url, path),
            None => NO_POSTER_URL.to_string(),
        }
    }
}
