//! Imputation and standardization fitted on the candidate population.
//!
//! Both transforms are fitted exactly once, on the full candidate matrix, and
//! the fitted parameters are retained so that any later vector (a query, in
//! principle) goes through the identical transform.

use crate::{Error, FeatureMatrix, FeatureVector, Result};

/// Replaces missing values with the per-column median of the present values.
///
/// Missing values are represented as `None`; non-finite floats must already
/// have been mapped to `None` by the snapshot reader.
#[derive(Debug, Clone)]
pub struct MedianImputer {
    medians: Vec<f64>,
}

impl MedianImputer {
    /// Fit per-column medians over the rows of `data` (row-major, one
    /// `Vec<Option<f64>>` per client, all of dimension `dim`).
    ///
    /// A column with no present values gets median 0.0, matching a
    /// standardized all-missing column.
    pub fn fit(data: &[Vec<Option<f64>>], dim: usize) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::EmptyMatrix);
        }
        for row in data {
            if row.len() != dim {
                return Err(Error::DimensionMismatch {
                    expected: dim,
                    actual: row.len(),
                });
            }
        }

        let mut medians = Vec::with_capacity(dim);
        for col in 0..dim {
            let mut present: Vec<f64> = data.iter().filter_map(|row| row[col]).collect();
            if present.is_empty() {
                medians.push(0.0);
                continue;
            }
            present.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            let mid = present.len() / 2;
            let median = if present.len() % 2 == 0 {
                (present[mid - 1] + present[mid]) / 2.0
            } else {
                present[mid]
            };
            medians.push(median);
        }

        Ok(Self { medians })
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.medians.len()
    }

    #[must_use]
    pub fn medians(&self) -> &[f64] {
        &self.medians
    }

    /// Fill the gaps in one row.
    pub fn transform(&self, row: &[Option<f64>]) -> Result<FeatureVector> {
        if row.len() != self.dim() {
            return Err(Error::DimensionMismatch {
                expected: self.dim(),
                actual: row.len(),
            });
        }
        let filled = row
            .iter()
            .zip(self.medians.iter())
            .map(|(cell, median)| cell.unwrap_or(*median))
            .collect();
        Ok(FeatureVector::new(filled))
    }
}

/// Rescales each column to zero mean and unit variance.
///
/// Uses the population standard deviation, like scikit-learn's
/// StandardScaler. A constant column (std 0) is shifted to zero and left
/// unscaled.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl StandardScaler {
    pub fn fit(rows: &[FeatureVector], dim: usize) -> Result<Self> {
        if rows.is_empty() {
            return Err(Error::EmptyMatrix);
        }
        for row in rows {
            if row.dim() != dim {
                return Err(Error::DimensionMismatch {
                    expected: dim,
                    actual: row.dim(),
                });
            }
        }

        let n = rows.len() as f64;
        let mut means = vec![0.0; dim];
        for row in rows {
            for (mean, x) in means.iter_mut().zip(row.as_slice()) {
                *mean += x;
            }
        }
        for mean in &mut means {
            *mean /= n;
        }

        let mut vars = vec![0.0; dim];
        for row in rows {
            for (col, x) in row.as_slice().iter().enumerate() {
                let d = x - means[col];
                vars[col] += d * d;
            }
        }
        let stds = vars.into_iter().map(|v| (v / n).sqrt()).collect();

        Ok(Self { means, stds })
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.means.len()
    }

    #[must_use]
    pub fn means(&self) -> &[f64] {
        &self.means
    }

    #[must_use]
    pub fn stds(&self) -> &[f64] {
        &self.stds
    }

    pub fn transform(&self, vector: &FeatureVector) -> Result<FeatureVector> {
        if vector.dim() != self.dim() {
            return Err(Error::DimensionMismatch {
                expected: self.dim(),
                actual: vector.dim(),
            });
        }
        let scaled = vector
            .as_slice()
            .iter()
            .enumerate()
            .map(|(col, x)| {
                let std = self.stds[col];
                if std == 0.0 {
                    x - self.means[col]
                } else {
                    (x - self.means[col]) / std
                }
            })
            .collect();
        Ok(FeatureVector::new(scaled))
    }
}

/// Impute then standardize a raw candidate snapshot, keeping both fitted
/// transforms for later queries.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    imputer: MedianImputer,
    scaler: StandardScaler,
}

impl Preprocessor {
    /// Fit both stages on the candidate population and return the fitted
    /// preprocessor along with the transformed matrix.
    pub fn fit_transform(
        ids: Vec<u64>,
        columns: Vec<String>,
        raw: &[Vec<Option<f64>>],
    ) -> Result<(Self, FeatureMatrix)> {
        let dim = columns.len();
        let imputer = MedianImputer::fit(raw, dim)?;
        let imputed: Vec<FeatureVector> = raw
            .iter()
            .map(|row| imputer.transform(row))
            .collect::<Result<_>>()?;

        let scaler = StandardScaler::fit(&imputed, dim)?;
        let scaled: Vec<FeatureVector> = imputed
            .iter()
            .map(|v| scaler.transform(v))
            .collect::<Result<_>>()?;

        let matrix = FeatureMatrix::new(ids, columns, scaled)?;
        Ok((Self { imputer, scaler }, matrix))
    }

    /// Run one raw row through the transforms fitted on the population.
    pub fn transform(&self, row: &[Option<f64>]) -> Result<FeatureVector> {
        let imputed = self.imputer.transform(row)?;
        self.scaler.transform(&imputed)
    }

    #[must_use]
    pub fn imputer(&self) -> &MedianImputer {
        &self.imputer
    }

    #[must_use]
    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }
}
