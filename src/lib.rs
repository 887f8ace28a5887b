//! # credrisk
//!
//! A credit-default-risk scoring service over a static client snapshot.
//!
//! credrisk loads a preprocessed client extract and a pre-trained
//! gradient-boosting classifier once at startup, builds a cosine
//! nearest-neighbor index over the standardized feature matrix, and serves
//! predictions, typed client profiles, similar-client aggregates and
//! population statistics over REST.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! credrisk --data data/clients.csv.gz --model data/model.json --port 8000
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use credrisk::prelude::*;
//!
//! let store = FeatureStore::load("data/clients.csv.gz", "data/model.json").unwrap();
//! let ctx = AppContext::build(store, 15, 0.5).unwrap();
//!
//! let neighbors = ctx.index().neighbors(100001).unwrap();
//! for n in neighbors {
//!     println!("{}: {:.3}", n.client_id, n.score);
//! }
//! ```
//!
//! ## Crate Structure
//!
//! - [`credrisk-core`](credrisk_core) - Feature vectors, preprocessing, similarity index
//! - [`credrisk-store`](credrisk_store) - Snapshot loading, typed profiles, model inference
//! - [`credrisk-api`](credrisk_api) - REST API and application context

// Re-export core types
pub use credrisk_core::{
    Error, FeatureMatrix, FeatureVector, MedianImputer, Neighbor, Preprocessor, Result,
    SimilarityIndex, StandardScaler,
};

// Re-export the feature store
pub use credrisk_store::{
    BankProfile, ClientDataset, FeatureStore, GradientBoostingModel, PersonalProfile,
};

// Re-export API
pub use credrisk_api::{AppContext, RestApi};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AppContext, BankProfile, ClientDataset, Error, FeatureMatrix, FeatureStore, FeatureVector,
        GradientBoostingModel, Neighbor, PersonalProfile, Preprocessor, RestApi, Result,
        SimilarityIndex,
    };
}
