//! # credrisk Core
//!
//! Core library for the credrisk scoring service.
//!
//! This crate provides the numeric building blocks:
//!
//! - [`FeatureVector`] - A client's fixed-order numeric attributes
//! - [`FeatureMatrix`] - The validated candidate population, read-only after construction
//! - [`MedianImputer`] / [`StandardScaler`] / [`Preprocessor`] - Transforms fitted once on the population
//! - [`SimilarityIndex`] - Cosine nearest-neighbor lookup over the scaled matrix
//!
//! ## Example
//!
//! ```rust
//! use credrisk_core::{FeatureMatrix, FeatureVector, SimilarityIndex};
//!
//! let matrix = FeatureMatrix::new(
//!     vec![100, 101, 102],
//!     vec!["income".to_string(), "credit".to_string()],
//!     vec![
//!         FeatureVector::new(vec![1.0, 0.0]),
//!         FeatureVector::new(vec![0.9, 0.1]),
//!         FeatureVector::new(vec![0.0, 1.0]),
//!     ],
//! ).unwrap();
//!
//! let index = SimilarityIndex::build(matrix, 2).unwrap();
//! let neighbors = index.neighbors(100).unwrap();
//! assert_eq!(neighbors.len(), 2);
//! ```

pub mod error;
pub mod index;
pub mod matrix;
pub mod preprocess;
pub mod vector;

pub use error::{Error, Result};
pub use index::{Neighbor, SimilarityIndex};
pub use matrix::FeatureMatrix;
pub use preprocess::{MedianImputer, Preprocessor, StandardScaler};
pub use vector::FeatureVector;
