//! Pre-trained gradient-boosting classifier.
//!
//! The model ships as a JSON dump of the trained ensemble: an init score
//! (base log-odds), the feature names the trees were trained on, and one
//! flat node array per tree. Leaf values already include the learning
//! rate, so scoring is init score plus one leaf per tree through a
//! sigmoid. Missing feature values follow each split's default branch,
//! the way the boosting library routed them during training.

use crate::dataset::ClientDataset;
use ahash::AHashMap;
use credrisk_core::{Error, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

fn default_left() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        #[serde(default = "default_left")]
        default_left: bool,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, Deserialize)]
struct Tree {
    nodes: Vec<Node>,
}

#[derive(Debug, Deserialize)]
struct ModelFile {
    feature_names: Vec<String>,
    #[serde(default)]
    init_score: f64,
    trees: Vec<Tree>,
}

/// Binary default-risk classifier: positive class 1 means "defaulted".
#[derive(Debug)]
pub struct GradientBoostingModel {
    feature_names: Vec<String>,
    init_score: f64,
    trees: Vec<Tree>,
    /// Position of each model feature inside the dataset's feature row,
    /// resolved once by [`bind`](Self::bind).
    columns: Vec<usize>,
}

impl GradientBoostingModel {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let parsed: ModelFile = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| Error::Model(format!("unreadable model dump: {e}")))?;
        Self::from_parts(parsed.feature_names, parsed.init_score, parsed.trees)
    }

    fn from_parts(feature_names: Vec<String>, init_score: f64, trees: Vec<Tree>) -> Result<Self> {
        if trees.is_empty() {
            return Err(Error::Model("model has no trees".to_string()));
        }
        for (t, tree) in trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(Error::Model(format!("tree {t} has no nodes")));
            }
            for node in &tree.nodes {
                if let Node::Split {
                    feature,
                    left,
                    right,
                    ..
                } = node
                {
                    if *feature >= feature_names.len() {
                        return Err(Error::Model(format!(
                            "tree {t} references feature {feature} of {}",
                            feature_names.len()
                        )));
                    }
                    if *left >= tree.nodes.len() || *right >= tree.nodes.len() {
                        return Err(Error::Model(format!("tree {t} has a dangling child index")));
                    }
                }
            }
        }

        Ok(Self {
            feature_names,
            init_score,
            trees,
            columns: Vec::new(),
        })
    }

    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    #[must_use]
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Resolve the model's feature names against the dataset feature
    /// columns. Every model feature must exist in the snapshot; a model
    /// trained on a different extract refuses to serve.
    pub fn bind(&mut self, feature_columns: &[String]) -> Result<()> {
        let positions: AHashMap<&str, usize> = feature_columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect();

        self.columns = self
            .feature_names
            .iter()
            .map(|name| {
                positions
                    .get(name.as_str())
                    .copied()
                    .ok_or_else(|| Error::Model(format!("feature {name} missing from snapshot")))
            })
            .collect::<Result<_>>()?;
        Ok(())
    }

    /// Probability of default (class 1) for one raw feature row, aligned
    /// with the dataset feature columns the model was bound against.
    pub fn predict_proba(&self, row: &[Option<f64>]) -> Result<f64> {
        if self.columns.is_empty() {
            return Err(Error::Model("model not bound to a dataset".to_string()));
        }

        let mut raw = self.init_score;
        for tree in &self.trees {
            raw += self.score_tree(tree, row);
        }
        Ok(sigmoid(raw))
    }

    fn score_tree(&self, tree: &Tree, row: &[Option<f64>]) -> f64 {
        let mut at = 0;
        loop {
            match &tree.nodes[at] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    default_left,
                } => {
                    let cell = row.get(self.columns[*feature]).copied().flatten();
                    at = match cell {
                        Some(v) if v <= *threshold => *left,
                        Some(_) => *right,
                        None if *default_left => *left,
                        None => *right,
                    };
                }
            }
        }
    }

    /// One inference pass over a set of clients, returning an id to
    /// default-probability map. Callers aggregating over a neighbor set go
    /// through here instead of issuing per-client calls.
    pub fn predict_batch(
        &self,
        dataset: &ClientDataset,
        client_ids: &[u64],
    ) -> Result<AHashMap<u64, f64>> {
        let mut out = AHashMap::with_capacity(client_ids.len());
        for &id in client_ids {
            let row = dataset.feature_row(id)?;
            out.insert(id, self.predict_proba(&row)?);
        }
        Ok(out)
    }
}

#[inline]
fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
