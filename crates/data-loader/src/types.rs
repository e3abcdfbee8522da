//! Core domain types for the movie catalog.
//!
//! - `MovieRecord`: one row of the movie table
//! - `SimilarityMatrix`: dense square matrix of precomputed scores
//! - `MovieCatalog`: both of the above plus a title index, built once at
//!   startup and shared read-only (behind an `Arc`) for the process lifetime

use crate::error::{DataLoadError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

// =============================================================================
// Type Aliases
// =============================================================================

/// Identifier of a movie in the external metadata API
pub type MovieId = u32;

/// Row (and column) position of a movie in the similarity matrix
pub type RowIndex = usize;

// =============================================================================
// MovieRecord
// =============================================================================

/// A movie as it appears in the movie table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieRecord {
    /// External metadata-API identifier, used to look up the poster
    pub id: MovieId,
    /// Lookup key for recommendations
    pub title: String,
    /// Row position in the similarity matrix
    pub index: RowIndex,
}

impl MovieRecord {
    pub fn new(id: MovieId, title: impl Into<String>, index: RowIndex) -> Self {
        Self {
            id,
            title: title.into(),
            index,
        }
    }
}

// =============================================================================
// SimilarityMatrix
// =============================================================================

/// Dense square matrix of similarity scores, stored row-major.
///
/// Entry `[i][j]` is the similarity between movie `i` and movie `j`.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    dim: usize,
    scores: Vec<f32>,
}

impl SimilarityMatrix {
    /// Build a matrix from nested rows, rejecting anything that isn't square.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let dim = rows.len();
        let mut scores = Vec::with_capacity(dim * dim);

        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != dim {
                return Err(DataLoadError::NotSquare {
                    row,
                    expected: dim,
                    found: values.len(),
                });
            }
            scores.extend(values);
        }

        Ok(Self { dim, scores })
    }

    /// Number of rows (equal to the number of columns)
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Scores of one movie against every movie, in matrix order
    pub fn row(&self, index: RowIndex) -> Option<&[f32]> {
        if index >= self.dim {
            return None;
        }
        let start = index * self.dim;
        Some(&self.scores[start..start + self.dim])
    }

    pub fn score(&self, i: RowIndex, j: RowIndex) -> Option<f32> {
        self.row(i).and_then(|row| row.get(j).copied())
    }
}

// =============================================================================
// MovieCatalog - the read-only context object
// =============================================================================

/// Movie table, similarity matrix and title index.
///
/// There are no mutators: once built, a catalog never changes. Methods
/// return references into the owned data.
#[derive(Debug)]
pub struct MovieCatalog {
    /// Records in ingestion order; `movies[i].index == i`
    movies: Vec<MovieRecord>,
    /// Title -> row index (first occurrence wins)
    title_index: HashMap<String, RowIndex>,
    similarity: SimilarityMatrix,
}

impl MovieCatalog {
    /// Assemble a catalog, checking that the records and the matrix agree.
    pub fn new(movies: Vec<MovieRecord>, similarity: SimilarityMatrix) -> Result<Self> {
        if movies.is_empty() {
            return Err(DataLoadError::ValidationError(
                "movie table is empty".to_string(),
            ));
        }

        if movies.len() != similarity.dim() {
            return Err(DataLoadError::DimensionMismatch {
                movies: movies.len(),
                matrix: similarity.dim(),
            });
        }

        let mut title_index = HashMap::with_capacity(movies.len());
        for (position, movie) in movies.iter().enumerate() {
            if movie.index != position {
                return Err(DataLoadError::ValidationError(format!(
                    "movie '{}' has row index {} but sits at position {}",
                    movie.title, movie.index, position
                )));
            }

            if title_index.contains_key(&movie.title) {
                warn!(
                    title = %movie.title,
                    row = position,
                    "Duplicate title in movie table, keeping the first occurrence"
                );
                continue;
            }
            title_index.insert(movie.title.clone(), position);
        }

        Ok(Self {
            movies,
            title_index,
            similarity,
        })
    }

    /// Find a movie by its exact title
    pub fn get_by_title(&self, title: &str) -> Option<&MovieRecord> {
        self.title_index
            .get(title)
            .and_then(|&index| self.movies.get(index))
    }

    /// Find a movie by its row position
    pub fn get_by_index(&self, index: RowIndex) -> Option<&MovieRecord> {
        self.movies.get(index)
    }

    /// All records, in ingestion order
    pub fn movies(&self) -> &[MovieRecord] {
        &self.movies
    }

    /// Case-insensitive substring search over titles.
    ///
    /// Exact (case-insensitive) matches come first, then ingestion order.
    /// This is for finding a title; lookups by title stay exact.
    pub fn search_titles(&self, query: &str) -> Vec<&MovieRecord> {
        let query = query.to_lowercase();
        let mut matches: Vec<(bool, &MovieRecord)> = self
            .movies
            .iter()
            .filter_map(|movie| {
                let title = movie.title.to_lowercase();
                title.contains(&query).then(|| (title != query, movie))
            })
            .collect();

        // Stable sort keeps ingestion order within each group
        matches.sort_by_key(|(inexact, _)| *inexact);
        matches.into_iter().map(|(_, movie)| movie).collect()
    }

    /// Titles in ingestion order
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.movies.iter().map(|m| m.title.as_str())
    }

    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}
