use serde::{Deserialize, Serialize};

/// A client's feature vector: a fixed-order sequence of numeric attributes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureVector {
    data: Vec<f64>,
}

impl FeatureVector {
    #[inline]
    #[must_use]
    pub fn new(data: Vec<f64>) -> Self {
        Self { data }
    }

    #[inline]
    #[must_use]
    pub fn from_slice(data: &[f64]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Dot product with another vector of the same dimension.
    /// Two accumulators for better pipelining.
    #[inline]
    pub fn dot(&self, other: &FeatureVector) -> f64 {
        if self.dim() != other.dim() {
            return 0.0;
        }
        let a = &self.data;
        let b = &other.data;
        let mut sum1 = 0.0;
        let mut sum2 = 0.0;
        let mut i = 0;
        while i + 1 < a.len() {
            sum1 += a[i] * b[i];
            sum2 += a[i + 1] * b[i + 1];
            i += 2;
        }
        if i < a.len() {
            sum1 += a[i] * b[i];
        }
        sum1 + sum2
    }

    /// Euclidean norm.
    #[inline]
    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Cosine similarity with another vector.
    ///
    /// Mismatched dimensions or a zero-norm operand yield 0.0 rather than NaN,
    /// so downstream ordering stays total.
    #[inline]
    pub fn cosine_similarity(&self, other: &FeatureVector) -> f64 {
        if self.dim() != other.dim() {
            return 0.0;
        }

        let dot_product = self.dot(other);
        let norm_a = self.norm();
        let norm_b = other.norm();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot_product / (norm_a * norm_b)
    }

    /// Cosine distance: 1 minus cosine similarity.
    #[inline]
    pub fn cosine_distance(&self, other: &FeatureVector) -> f64 {
        1.0 - self.cosine_similarity(other)
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(data: Vec<f64>) -> Self {
        Self::new(data)
    }
}
