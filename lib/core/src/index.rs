use crate::{Error, FeatureMatrix, Result};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// One entry of a similarity result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub client_id: u64,
    pub score: f64,
}

/// Nearest-neighbor index over the standardized candidate population.
///
/// Built once at startup and read-only afterwards; queries are independent
/// brute-force cosine scans, so concurrent reads need no coordination.
#[derive(Debug)]
pub struct SimilarityIndex {
    matrix: FeatureMatrix,
    id_to_row: AHashMap<u64, usize>,
    k: usize,
}

impl SimilarityIndex {
    /// Build an index answering queries for the `k` most similar clients.
    ///
    /// Requires more candidates than requested neighbors, since the query
    /// client is excluded from its own result.
    pub fn build(matrix: FeatureMatrix, k: usize) -> Result<Self> {
        if k == 0 {
            return Err(Error::InvalidConfig(
                "neighbor count must be at least 1".to_string(),
            ));
        }
        if matrix.len() <= k {
            return Err(Error::InsufficientCandidates {
                candidates: matrix.len(),
                requested: k,
            });
        }

        let id_to_row = matrix
            .ids()
            .iter()
            .enumerate()
            .map(|(row, &id)| (id, row))
            .collect();

        Ok(Self {
            matrix,
            id_to_row,
            k,
        })
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.matrix.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }

    /// Configured neighbor count.
    #[inline]
    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    #[must_use]
    pub fn contains(&self, client_id: u64) -> bool {
        self.id_to_row.contains_key(&client_id)
    }

    /// The `k` most similar other clients to `client_id`, in descending
    /// similarity order.
    ///
    /// Scores are `1 - cosine_distance` and are deliberately not clamped:
    /// an anti-correlated candidate can score below zero, and clamping
    /// would erase the ordering between such candidates. Ties are broken
    /// by original snapshot row order, so output is deterministic.
    pub fn neighbors(&self, client_id: u64) -> Result<Vec<Neighbor>> {
        let query_row = *self
            .id_to_row
            .get(&client_id)
            .ok_or(Error::ClientNotFound(client_id))?;
        let query = &self.matrix.rows()[query_row];

        // Distance scan over every other candidate. The self match would
        // always come back first at distance 0, so it is skipped outright.
        let mut scored: Vec<(usize, f64)> = self
            .matrix
            .rows()
            .iter()
            .enumerate()
            .filter(|(row, _)| *row != query_row)
            .map(|(row, candidate)| (row, query.cosine_distance(candidate)))
            .collect();

        scored.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(self.k);

        Ok(scored
            .into_iter()
            .map(|(row, distance)| Neighbor {
                client_id: self.matrix.ids()[row],
                score: 1.0 - distance,
            })
            .collect())
    }
}
