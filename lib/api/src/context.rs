use credrisk_core::{Error, Preprocessor, Result, SimilarityIndex};
use credrisk_store::{ClientDataset, FeatureStore, GradientBoostingModel};
use std::sync::Arc;
use tracing::info;

/// Everything a request handler needs, built once at startup.
///
/// All members are immutable after construction, so the context is shared
/// across workers as plain `Arc`s with no locking.
pub struct AppContext {
    dataset: Arc<ClientDataset>,
    model: Arc<GradientBoostingModel>,
    index: Arc<SimilarityIndex>,
    preprocessor: Arc<Preprocessor>,
    threshold: f64,
}

impl AppContext {
    /// Fit the preprocessing transforms on the candidate population and
    /// build the similarity index. Any failure here aborts startup.
    pub fn build(store: FeatureStore, neighbors: usize, threshold: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(Error::InvalidConfig(format!(
                "threshold {threshold} outside [0, 1]"
            )));
        }

        let (dataset, model) = store.into_parts();

        let (preprocessor, matrix) = Preprocessor::fit_transform(
            dataset.ids().to_vec(),
            dataset.feature_columns(),
            &dataset.feature_rows(),
        )?;
        let index = SimilarityIndex::build(matrix, neighbors)?;
        info!(
            candidates = index.len(),
            k = index.k(),
            "similarity index built"
        );

        Ok(Self {
            dataset: Arc::new(dataset),
            model: Arc::new(model),
            index: Arc::new(index),
            preprocessor: Arc::new(preprocessor),
            threshold,
        })
    }

    #[must_use]
    pub fn dataset(&self) -> &ClientDataset {
        &self.dataset
    }

    #[must_use]
    pub fn model(&self) -> &GradientBoostingModel {
        &self.model
    }

    #[must_use]
    pub fn index(&self) -> &SimilarityIndex {
        &self.index
    }

    /// The transforms fitted on the candidate population. Queries outside
    /// the snapshot would go through these; in this system candidates and
    /// queries share them.
    #[must_use]
    pub fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    /// Decision threshold on the default probability.
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}
