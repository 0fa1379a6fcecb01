//! Fitted gradient-boosted ensemble.
//!
//! A [`GbdtModel`] is created by the trainer, persisted as an artifact, and
//! then owned read-only by the predictor for the life of the process. The
//! struct carries everything a serving process must not guess at: the class
//! encoding, the feature layout it was trained against, the hyperparameters,
//! and the held-out evaluation it reported at training time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::features::layout::FEATURE_COUNT;
use crate::model::metrics::EvalReport;
use crate::model::tree::Tree;

/// Fixed training configuration. Deliberately a plain set of constants:
/// two training runs with the same config and data are comparable, and the
/// config travels inside the artifact so nobody has to reconstruct it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    pub n_trees: usize,
    pub learning_rate: f32,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    /// L2 regularization on leaf weights.
    pub lambda: f32,
    /// Seed for the stratified split; the fit itself is deterministic.
    pub seed: u64,
    pub test_fraction: f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_leaf: 1,
            lambda: 1.0,
            seed: 42,
            test_fraction: 0.2,
        }
    }
}

/// The persisted ensemble plus its metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GbdtModel {
    /// Ordered class labels, ascending. The margin/probability head is for
    /// `classes[1]`; `classes[0]` gets the complement. Read this, never
    /// assume an encoding - artifacts have carried both {1,-1} and {1,0}.
    pub classes: [i8; 2],
    /// Initial margin (log-odds of `classes[1]` on the training partition).
    pub base_score: f32,
    pub trees: Vec<Tree>,
    /// Feature names in training order; must match the extractor layout.
    pub feature_names: Vec<String>,
    pub feature_version: u8,
    pub layout_hash: u32,
    /// Total-gain feature importance, normalized to sum 1.
    pub importances: Vec<f32>,
    pub config: TrainConfig,
    pub trained_at: DateTime<Utc>,
    /// Held-out evaluation from the training run.
    pub eval: EvalReport,
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

impl GbdtModel {
    /// Raw ensemble margin for one row.
    pub fn predict_margin(&self, features: &[f32]) -> f32 {
        debug_assert_eq!(features.len(), FEATURE_COUNT);
        let mut margin = self.base_score;
        for tree in &self.trees {
            margin += tree.predict_row(features);
        }
        margin
    }

    /// Probability distribution over `self.classes`, in that order.
    /// Always sums to 1.
    pub fn predict_proba(&self, features: &[f32]) -> [f32; 2] {
        let p_upper = sigmoid(self.predict_margin(features));
        [1.0 - p_upper, p_upper]
    }

    /// Hard label in the artifact's own encoding.
    pub fn predict_class(&self, features: &[f32]) -> i8 {
        let proba = self.predict_proba(features);
        if proba[1] >= proba[0] {
            self.classes[1]
        } else {
            self.classes[0]
        }
    }

    /// Feature names paired with importance, descending.
    pub fn importance_ranking(&self) -> Vec<(String, f32)> {
        let mut ranked: Vec<(String, f32)> = self
            .feature_names
            .iter()
            .cloned()
            .zip(self.importances.iter().copied())
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::features::layout::{layout_hash, FEATURE_LAYOUT, FEATURE_VERSION};
    use crate::model::tree::TreeBuilder;

    pub(crate) fn tiny_model() -> GbdtModel {
        // One stump on feature 0: negative margin when the signal is -1.
        let mut builder = TreeBuilder::new();
        let root = builder.push_node();
        let left = builder.push_node();
        let right = builder.push_node();
        builder.set_split(root, 0, 0.0, left, right, 2.0);
        builder.set_leaf(left, -2.0);
        builder.set_leaf(right, 2.0);

        GbdtModel {
            classes: [-1, 1],
            base_score: 0.0,
            trees: vec![builder.freeze()],
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
            feature_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            importances: {
                let mut imp = vec![0.0f32; FEATURE_COUNT];
                imp[0] = 1.0;
                imp
            },
            config: TrainConfig::default(),
            trained_at: Utc::now(),
            eval: EvalReport::compute(&[1, -1], &[1, -1], &[-1, 1]),
        }
    }

    #[test]
    fn proba_sums_to_one() {
        let model = tiny_model();
        for signal in [-1.0f32, 0.0, 1.0] {
            let mut row = [0.0f32; FEATURE_COUNT];
            row[0] = signal;
            let proba = model.predict_proba(&row);
            assert!((proba[0] + proba[1] - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn class_follows_argmax() {
        let model = tiny_model();
        let mut row = [0.0f32; FEATURE_COUNT];

        row[0] = 1.0;
        let proba = model.predict_proba(&row);
        assert!(proba[1] > proba[0]);
        assert_eq!(model.predict_class(&row), 1);

        row[0] = -1.0;
        let proba = model.predict_proba(&row);
        assert!(proba[0] > proba[1]);
        assert_eq!(model.predict_class(&row), -1);
    }

    #[test]
    fn prediction_is_pure() {
        let model = tiny_model();
        let mut row = [1.0f32; FEATURE_COUNT];
        row[0] = -1.0;
        assert_eq!(model.predict_proba(&row), model.predict_proba(&row));
        assert_eq!(model.predict_class(&row), model.predict_class(&row));
    }

    #[test]
    fn importance_ranking_descends() {
        let model = tiny_model();
        let ranking = model.importance_ranking();
        assert_eq!(ranking[0].0, "UsingIP");
        assert!(ranking[0].1 >= ranking[1].1);
    }
}
