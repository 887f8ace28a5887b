use crate::{Error, FeatureVector, Result};
use ahash::AHashSet;

/// The candidate population's feature vectors, one row per client.
///
/// Built once at startup from the feature store snapshot and read-only for
/// the lifetime of the process. Construction validates that every row has
/// the same dimensionality as the header and that client ids are unique.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    ids: Vec<u64>,
    columns: Vec<String>,
    rows: Vec<FeatureVector>,
}

impl FeatureMatrix {
    pub fn new(ids: Vec<u64>, columns: Vec<String>, rows: Vec<FeatureVector>) -> Result<Self> {
        if rows.is_empty() {
            return Err(Error::EmptyMatrix);
        }
        if ids.len() != rows.len() {
            return Err(Error::InvalidConfig(format!(
                "{} ids for {} rows",
                ids.len(),
                rows.len()
            )));
        }

        let dim = columns.len();
        for row in &rows {
            if row.dim() != dim {
                return Err(Error::DimensionMismatch {
                    expected: dim,
                    actual: row.dim(),
                });
            }
        }

        let mut seen = AHashSet::with_capacity(ids.len());
        for &id in &ids {
            if !seen.insert(id) {
                return Err(Error::DuplicateClient(id));
            }
        }

        Ok(Self { ids, columns, rows })
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of feature columns.
    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.columns.len()
    }

    #[inline]
    #[must_use]
    pub fn ids(&self) -> &[u64] {
        &self.ids
    }

    #[inline]
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[FeatureVector] {
        &self.rows
    }

    pub fn row(&self, idx: usize) -> Option<&FeatureVector> {
        self.rows.get(idx)
    }

    /// Iterate rows in original snapshot order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &FeatureVector)> {
        self.ids.iter().copied().zip(self.rows.iter())
    }
}
