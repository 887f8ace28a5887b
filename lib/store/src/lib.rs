//! # credrisk Store
//!
//! Feature store for the credrisk scoring service: loads the static client
//! snapshot and the pre-trained classifier once at startup, and exposes
//! typed access to both. Everything here is read-only after [`FeatureStore::load`]
//! returns; any load failure is fatal so the process never serves without data.

pub mod dataset;
pub mod model;
pub mod profile;
pub mod reader;

pub use dataset::{ClientDataset, ID_COLUMN, TARGET_COLUMN};
pub use model::GradientBoostingModel;
pub use profile::{BankProfile, PersonalProfile};
pub use reader::{read_snapshot, RawSnapshot};

use credrisk_core::Result;
use std::path::Path;
use tracing::info;

/// The loaded snapshot and the classifier bound to its feature columns.
pub struct FeatureStore {
    dataset: ClientDataset,
    model: GradientBoostingModel,
}

impl FeatureStore {
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(snapshot_path: P, model_path: Q) -> Result<Self> {
        let snapshot = read_snapshot(snapshot_path)?;
        let dataset = ClientDataset::from_snapshot(snapshot)?;
        info!(
            clients = dataset.len(),
            columns = dataset.columns().len(),
            "snapshot loaded"
        );

        let mut model = GradientBoostingModel::load(model_path)?;
        model.bind(&dataset.feature_columns())?;
        info!(trees = model.num_trees(), "model loaded and bound");

        Ok(Self { dataset, model })
    }

    #[must_use]
    pub fn dataset(&self) -> &ClientDataset {
        &self.dataset
    }

    #[must_use]
    pub fn model(&self) -> &GradientBoostingModel {
        &self.model
    }

    pub fn into_parts(self) -> (ClientDataset, GradientBoostingModel) {
        (self.dataset, self.model)
    }
}
