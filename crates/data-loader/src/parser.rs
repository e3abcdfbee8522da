//! Parsers for the two serialized data files.
//!
//! - movie table: JSON, either a list of `{"movie_id", "title"}` records or
//!   the columnar `{"movie_id": {"0": ..}, "title": {"0": ..}}` layout that a
//!   dataframe `to_dict()` dump produces. Extra columns are ignored.
//! - similarity matrix: JSON array of rows of numbers.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct RawMovie {
    movie_id: MovieId,
    title: String,
}

/// Column name -> (row key -> value)
#[derive(Debug, Deserialize)]
struct ColumnarMovies {
    movie_id: HashMap<String, MovieId>,
    title: HashMap<String, String>,
}

/// Read a whole file and deserialize it as JSON
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })?;

    serde_json::from_slice(&bytes).map_err(|e| DataLoadError::ParseError {
        file: file_name(path),
        reason: e.to_string(),
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Parse the movie table
///
/// Records are returned in ingestion order with `index` set to their
/// position, which is also their row in the similarity matrix.
pub fn parse_movies(path: &Path) -> Result<Vec<MovieRecord>> {
    let value: serde_json::Value = read_json(path)?;
    let file = file_name(path);

    let raw = if value.is_array() {
        serde_json::from_value::<Vec<RawMovie>>(value).map_err(|e| DataLoadError::ParseError {
            file: file.clone(),
            reason: e.to_string(),
        })?
    } else {
        let columns: ColumnarMovies =
            serde_json::from_value(value).map_err(|e| DataLoadError::ParseError {
                file: file.clone(),
                reason: e.to_string(),
            })?;
        columnar_to_rows(columns, &file)?
    };

    Ok(raw
        .into_iter()
        .enumerate()
        .map(|(index, movie)| MovieRecord::new(movie.movie_id, movie.title, index))
        .collect())
}

/// Zip the `title` and `movie_id` columns back into rows, ordered by row key
fn columnar_to_rows(columns: ColumnarMovies, file: &str) -> Result<Vec<RawMovie>> {
    let ColumnarMovies {
        mut movie_id,
        title,
    } = columns;

    let mut rows = Vec::with_capacity(title.len());
    for (key, title) in title {
        let row: usize = key.parse().map_err(|_| DataLoadError::ParseError {
            file: file.to_string(),
            reason: format!("Invalid row key: {}", key),
        })?;

        let id = movie_id
            .remove(&key)
            .ok_or_else(|| DataLoadError::ParseError {
                file: file.to_string(),
                reason: format!("Missing movie_id for row {}", key),
            })?;

        rows.push((row, RawMovie { movie_id: id, title }));
    }

    if let Some(key) = movie_id.keys().next() {
        return Err(DataLoadError::ParseError {
            file: file.to_string(),
            reason: format!("Missing title for row {}", key),
        });
    }

    rows.sort_by_key(|(row, _)| *row);
    Ok(rows.into_iter().map(|(_, movie)| movie).collect())
}

/// Parse the similarity matrix
pub fn parse_similarity(path: &Path) -> Result<SimilarityMatrix> {
    let rows: Vec<Vec<f32>> = read_json(path)?;
    SimilarityMatrix::from_rows(rows)
}
