//! Nearest-neighbor ranking over one row of the similarity matrix.
//!
//! Pure and synchronous; no poster lookups happen here.

use std::cmp::Ordering;

use data_loader::{MovieCatalog, RowIndex};

use crate::error::{RecommendError, Result};

/// A movie ranked against the query movie
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: RowIndex,
    pub score: f32,
}

/// Rank every entry of `row` by descending score and keep the first `limit`,
/// skipping `query` itself.
///
/// The sort is stable, so equal scores keep matrix order. NaN ranks last.
pub fn rank_row(row: &[f32], query: RowIndex, limit: usize) -> Vec<Neighbor> {
    let mut ranked: Vec<Neighbor> = row
        .iter()
        .enumerate()
        .map(|(index, &score)| Neighbor { index, score })
        .collect();

    ranked.sort_by(|a, b| descending(a.score, b.score));

    ranked
        .into_iter()
        .filter(|n| n.index != query)
        .take(limit)
        .collect()
}

/// Total order, highest first, NaN after everything else.
/// `-0.0` and `0.0` compare equal.
fn descending(a: f32, b: f32) -> Ordering {
    let key = |s: f32| {
        if s.is_nan() {
            f32::NEG_INFINITY
        } else if s == 0.0 {
            0.0
        } else {
            s
        }
    };
    key(b).total_cmp(&key(a))
}

/// The `limit` movies most similar to `title`
pub fn similar_movies(catalog: &MovieCatalog, title: &str, limit: usize) -> Result<Vec<Neighbor>> {
    let not_found = || RecommendError::MovieNotFound {
        title: title.to_string(),
    };

    let movie = catalog.get_by_title(title).ok_or_else(not_found)?;
    let row = catalog.similarity().row(movie.index).ok_or_else(not_found)?;

    Ok(rank_row(row, movie.index, limit))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices(neighbors: &[Neighbor]) -> Vec<RowIndex> {
        neighbors.iter().map(|n| n.index).collect()
    }

    #[test]
    fn test_rank_row_sorts_by_score_descending() {
        let row = [1.0, 0.2, 0.9, 0.5, 0.7];
        let ranked = rank_row(&row, 0, 5);

        assert_eq!(indices(&ranked), vec![2, 4, 3, 1]);
        assert_eq!(ranked[0].score, 0.9);
    }

    #[test]
    fn test_rank_row_truncates_to_limit() {
        let row = [1.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7];
        let ranked = rank_row(&row, 0, 5);

        assert_eq!(indices(&ranked), vec![7, 6, 5, 4, 3]);
    }

    #[test]
    fn test_rank_row_ties_keep_matrix_order() {
        let row = [0.5, 1.0, 0.5, 0.5, 0.9];
        let ranked = rank_row(&row, 1, 5);

        assert_eq!(indices(&ranked), vec![4, 0, 2, 3]);
    }

    #[test]
    fn test_rank_row_excludes_query_even_when_not_top() {
        // Another movie scores higher than the self-similarity
        let row = [0.4, 0.8, 0.6];
        let ranked = rank_row(&row, 0, 5);

        assert_eq!(indices(&ranked), vec![1, 2]);
    }

    #[test]
    fn test_rank_row_nan_ranks_last() {
        let row = [1.0, f32::NAN, 0.1, 0.3];
        let ranked = rank_row(&row, 0, 5);

        assert_eq!(indices(&ranked), vec![3, 2, 1]);
    }

    #[test]
    fn test_rank_row_signed_zeros_are_ties() {
        let row = [1.0, -0.0, 0.0, 0.0, -0.0];
        let ranked = rank_row(&row, 0, 5);

        assert_eq!(indices(&ranked), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_rank_row_single_movie() {
        assert!(rank_row(&[1.0], 0, 5).is_empty());
    }
}
