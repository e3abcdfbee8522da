//! # Recommendation Service
//!
//! Given an exact movie title:
//! 1. Look up its row in the similarity matrix
//! 2. Rank every other movie by score
//! 3. Keep the top five
//! 4. Fetch a poster for each, in rank order
//!
//! Poster failures never fail a recommendation; they show up as
//! placeholder URLs in the result.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use data_loader::{MovieCatalog, MovieId, MovieRecord};
use poster_client::{HttpTransport, MetadataTransport, PosterFetcher};

use crate::error::Result;
use crate::ranking::{self, Neighbor};

/// Number of movies returned per recommendation
pub const DEFAULT_RECOMMENDATIONS: usize = 5;

/// One recommended movie
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub movie_id: MovieId,
    pub title: String,
    pub score: f32,
    pub poster_url: String,
}

/// Recommendations for one query, best match first
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationResult {
    pub query: String,
    pub items: Vec<Recommendation>,
}

impl RecommendationResult {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn titles(&self) -> Vec<&str> {
        self.items.iter().map(|r| r.title.as_str()).collect()
    }
}

/// Recommendation service over a shared, read-only catalog
pub struct RecommendationService<T = HttpTransport> {
    catalog: Arc<MovieCatalog>,
    posters: PosterFetcher<T>,
    limit: usize,
}

impl<T: MetadataTransport> RecommendationService<T> {
    pub fn new(catalog: Arc<MovieCatalog>, posters: PosterFetcher<T>) -> Self {
        Self {
            catalog,
            posters,
            limit: DEFAULT_RECOMMENDATIONS,
        }
    }

    /// Change how many movies a recommendation returns
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn catalog(&self) -> &MovieCatalog {
        &self.catalog
    }

    pub fn posters(&self) -> &PosterFetcher<T> {
        &self.posters
    }

    /// Every title, in catalog order, for populating a selection list
    pub fn list_titles(&self) -> Vec<&str> {
        self.catalog.titles().collect()
    }

    /// Titles containing `query`, ignoring case; see [`MovieCatalog::search_titles`]
    pub fn search_titles(&self, query: &str) -> Vec<&MovieRecord> {
        self.catalog.search_titles(query)
    }

    /// Ranked neighbors of `title` without poster lookups
    pub fn similar_movies(&self, title: &str) -> Result<Vec<Neighbor>> {
        ranking::similar_movies(&self.catalog, title, self.limit)
    }

    /// Main entry point: recommendations with posters for an exact title
    pub async fn recommend(&self, title: &str) -> Result<RecommendationResult> {
        let start_time = Instant::now();

        let neighbors = self.similar_movies(title).inspect_err(|e| warn!("{}", e))?;
        info!("Ranked {} neighbors for '{}'", neighbors.len(), title);

        // Sequential, so the result order is the ranking order
        let mut items = Vec::with_capacity(neighbors.len());
        for neighbor in neighbors {
            let Some(movie) = self.catalog.get_by_index(neighbor.index) else {
                continue;
            };

            let poster_url = self.posters.fetch_poster(movie.id).await;
            items.push(Recommendation {
                movie_id: movie.id,
                title: movie.title.clone(),
                score: neighbor.score,
                poster_url,
            });
        }

        info!(
            "Recommended {} movies for '{}' in {:.2?}",
            items.len(),
            title,
            start_time.elapsed()
        );

        Ok(RecommendationResult {
            query: title.to_string(),
            items,
        })
    }
}
