//! Gradient-boosting trainer.
//!
//! Second-order boosting with logistic loss: per round, gradients are
//! `p - y` and hessians `p (1 - p)`, a depth-limited tree is grown by exact
//! greedy split search, and its shrunken leaf values are added to the
//! running margins. Signals are ternary, so every feature has exactly two
//! usable thresholds (-0.5 and 0.5) and split finding is a handful of
//! gradient sums rather than a histogram pass.
//!
//! The fit is deterministic: the only randomness in the whole pipeline is
//! the seeded stratified split.

use chrono::Utc;
use tracing::{debug, info};

use crate::dataset::Dataset;
use crate::error::{PhishguardError, Result};
use crate::features::layout::{layout_hash, FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION};
use crate::model::booster::{GbdtModel, TrainConfig};
use crate::model::metrics::EvalReport;
use crate::model::tree::{NodeId, Tree, TreeBuilder};

const HESS_MIN: f32 = 1e-6;
const MIN_GAIN: f64 = 1e-6;

/// Candidate thresholds separating the ternary values.
const THRESHOLDS: [f32; 2] = [-0.5, 0.5];

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Train on the full labeled table: validate, stratified 80/20 split, fit on
/// the train partition, evaluate on the held-out partition.
pub fn train(dataset: &Dataset, config: TrainConfig) -> Result<GbdtModel> {
    if dataset.is_empty() {
        return Err(PhishguardError::data_shape("dataset has no rows"));
    }
    let classes = dataset.classes();
    if classes.len() != 2 {
        return Err(PhishguardError::data_shape(format!(
            "training requires exactly two classes, found {:?}",
            classes
        )));
    }
    let classes = [classes[0], classes[1]];

    let (train_set, test_set) = dataset.stratified_split(config.test_fraction, config.seed);
    info!(
        train = train_set.len(),
        test = test_set.len(),
        "stratified split complete"
    );

    let model = fit(&train_set, classes, config, &test_set)?;

    info!(
        accuracy = model.eval.accuracy,
        trees = model.trees.len(),
        "training complete"
    );
    Ok(model)
}

/// Fit the ensemble on `train_set` and evaluate on `test_set`.
fn fit(
    train_set: &Dataset,
    classes: [i8; 2],
    config: TrainConfig,
    test_set: &Dataset,
) -> Result<GbdtModel> {
    let n = train_set.len();

    let rows: Vec<[f32; FEATURE_COUNT]> = train_set
        .examples
        .iter()
        .map(|e| {
            let mut row = [0.0f32; FEATURE_COUNT];
            for (dst, &src) in row.iter_mut().zip(e.features.iter()) {
                *dst = src as f32;
            }
            row
        })
        .collect();

    // Binary targets: 1.0 for the upper class.
    let targets: Vec<f32> = train_set
        .examples
        .iter()
        .map(|e| if e.label == classes[1] { 1.0 } else { 0.0 })
        .collect();

    let positive_rate = (targets.iter().sum::<f32>() / n as f32).clamp(1e-6, 1.0 - 1e-6);
    let base_score = (positive_rate / (1.0 - positive_rate)).ln();

    let mut margins = vec![base_score; n];
    let mut grads = vec![0.0f32; n];
    let mut hess = vec![0.0f32; n];
    let mut trees = Vec::with_capacity(config.n_trees);

    for round in 0..config.n_trees {
        for i in 0..n {
            let p = sigmoid(margins[i]);
            grads[i] = p - targets[i];
            hess[i] = (p * (1.0 - p)).max(HESS_MIN);
        }

        let indices: Vec<usize> = (0..n).collect();
        let mut builder = TreeBuilder::new();
        let root = builder.push_node();
        grow_node(
            &mut builder,
            root,
            &indices,
            0,
            &rows,
            &grads,
            &hess,
            &config,
        );
        let tree = builder.freeze();

        for (i, row) in rows.iter().enumerate() {
            margins[i] += tree.predict_row(row);
        }

        if round % 25 == 0 {
            debug!(round, nodes = tree.n_nodes(), "boosting round");
        }
        trees.push(tree);
    }

    let importances = normalized_importances(&trees);

    let mut model = GbdtModel {
        classes,
        base_score,
        trees,
        feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        feature_version: FEATURE_VERSION,
        layout_hash: layout_hash(),
        importances,
        config,
        trained_at: Utc::now(),
        eval: EvalReport::compute(&[], &[], &[classes[0], classes[1]]),
    };
    model.eval = evaluate(&model, test_set);
    Ok(model)
}

/// Evaluate hard-label predictions on a partition.
pub fn evaluate(model: &GbdtModel, partition: &Dataset) -> EvalReport {
    let truth: Vec<i8> = partition.examples.iter().map(|e| e.label).collect();
    let predicted: Vec<i8> = partition
        .examples
        .iter()
        .map(|e| {
            let mut row = [0.0f32; FEATURE_COUNT];
            for (dst, &src) in row.iter_mut().zip(e.features.iter()) {
                *dst = src as f32;
            }
            model.predict_class(&row)
        })
        .collect();
    EvalReport::compute(&truth, &predicted, &model.classes)
}

/// Recursive depth-wise growth with exact greedy split search.
#[allow(clippy::too_many_arguments)]
fn grow_node(
    builder: &mut TreeBuilder,
    node: NodeId,
    indices: &[usize],
    depth: usize,
    rows: &[[f32; FEATURE_COUNT]],
    grads: &[f32],
    hess: &[f32],
    config: &TrainConfig,
) {
    let g_total: f64 = indices.iter().map(|&i| grads[i] as f64).sum();
    let h_total: f64 = indices.iter().map(|&i| hess[i] as f64).sum();

    let make_leaf = |builder: &mut TreeBuilder| {
        let weight = -(g_total / (h_total + config.lambda as f64)) as f32;
        builder.set_leaf(node, weight * config.learning_rate);
    };

    if depth >= config.max_depth || indices.len() < 2 * config.min_samples_leaf {
        make_leaf(builder);
        return;
    }

    let Some(split) = find_best_split(indices, rows, grads, hess, g_total, h_total, config)
    else {
        make_leaf(builder);
        return;
    };

    let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .copied()
        .partition(|&i| rows[i][split.feature as usize] < split.threshold);

    let left = builder.push_node();
    let right = builder.push_node();
    builder.set_split(
        node,
        split.feature,
        split.threshold,
        left,
        right,
        split.gain as f32,
    );

    grow_node(builder, left, &left_idx, depth + 1, rows, grads, hess, config);
    grow_node(builder, right, &right_idx, depth + 1, rows, grads, hess, config);
}

struct Split {
    feature: u32,
    threshold: f32,
    gain: f64,
}

fn find_best_split(
    indices: &[usize],
    rows: &[[f32; FEATURE_COUNT]],
    grads: &[f32],
    hess: &[f32],
    g_total: f64,
    h_total: f64,
    config: &TrainConfig,
) -> Option<Split> {
    let lambda = config.lambda as f64;
    let parent_score = g_total * g_total / (h_total + lambda);

    let mut best: Option<Split> = None;

    for feature in 0..FEATURE_COUNT {
        for &threshold in &THRESHOLDS {
            let mut g_left = 0.0f64;
            let mut h_left = 0.0f64;
            let mut n_left = 0usize;
            for &i in indices {
                if rows[i][feature] < threshold {
                    g_left += grads[i] as f64;
                    h_left += hess[i] as f64;
                    n_left += 1;
                }
            }
            let n_right = indices.len() - n_left;
            if n_left < config.min_samples_leaf || n_right < config.min_samples_leaf {
                continue;
            }

            let g_right = g_total - g_left;
            let h_right = h_total - h_left;
            let gain = 0.5
                * (g_left * g_left / (h_left + lambda)
                    + g_right * g_right / (h_right + lambda)
                    - parent_score);

            if gain > MIN_GAIN && best.as_ref().map(|b| gain > b.gain).unwrap_or(true) {
                best = Some(Split {
                    feature: feature as u32,
                    threshold,
                    gain,
                });
            }
        }
    }

    best
}

/// Total split gain per feature across all trees, normalized to sum 1.
fn normalized_importances(trees: &[Tree]) -> Vec<f32> {
    let mut totals = vec![0.0f64; FEATURE_COUNT];
    for tree in trees {
        tree.accumulate_gains(&mut totals);
    }
    let sum: f64 = totals.iter().sum();
    if sum <= 0.0 {
        return vec![0.0f32; FEATURE_COUNT];
    }
    totals.iter().map(|&t| (t / sum) as f32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::TrainingExample;
    use crate::features::Signal;

    /// Synthetic separable table: legitimate rows are mostly 1s, phishing
    /// rows mostly -1s, with a couple of flipped positions per row so the
    /// trees have something to choose between.
    pub(crate) fn synthetic_dataset(n_per_class: usize) -> Dataset {
        let mut examples = Vec::new();
        for k in 0..n_per_class {
            let mut pos = [1 as Signal; FEATURE_COUNT];
            pos[k % FEATURE_COUNT] = 0;
            pos[(k * 7) % FEATURE_COUNT] = -1;
            examples.push(TrainingExample {
                features: pos,
                label: 1,
            });

            let mut neg = [-1 as Signal; FEATURE_COUNT];
            neg[k % FEATURE_COUNT] = 0;
            neg[(k * 11) % FEATURE_COUNT] = 1;
            examples.push(TrainingExample {
                features: neg,
                label: -1,
            });
        }
        Dataset { examples }
    }

    fn quick_config() -> TrainConfig {
        TrainConfig {
            n_trees: 20,
            ..TrainConfig::default()
        }
    }

    #[test]
    fn learns_separable_data() {
        let dataset = synthetic_dataset(60);
        let model = train(&dataset, quick_config()).unwrap();

        assert!(model.eval.accuracy > 0.9, "accuracy {}", model.eval.accuracy);

        let all_pos = [1.0f32; FEATURE_COUNT];
        let all_neg = [-1.0f32; FEATURE_COUNT];
        assert_eq!(model.predict_class(&all_pos), 1);
        assert_eq!(model.predict_class(&all_neg), -1);
        assert!(model.predict_proba(&all_pos)[1] > 0.5);
        assert!(model.predict_proba(&all_neg)[0] > 0.5);
    }

    #[test]
    fn classes_read_from_data_ascending() {
        let dataset = synthetic_dataset(10);
        let model = train(&dataset, quick_config()).unwrap();
        assert_eq!(model.classes, [-1, 1]);
    }

    #[test]
    fn training_is_deterministic() {
        let dataset = synthetic_dataset(30);
        let a = train(&dataset, quick_config()).unwrap();
        let b = train(&dataset, quick_config()).unwrap();
        assert_eq!(a.base_score, b.base_score);
        assert_eq!(a.eval.accuracy, b.eval.accuracy);
        let row = [1.0f32; FEATURE_COUNT];
        assert_eq!(a.predict_margin(&row), b.predict_margin(&row));
    }

    #[test]
    fn importances_normalized() {
        let dataset = synthetic_dataset(40);
        let model = train(&dataset, quick_config()).unwrap();
        let sum: f32 = model.importances.iter().sum();
        assert!((sum - 1.0).abs() < 1e-4, "importance sum {}", sum);
        assert!(model.importances.iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn rejects_single_class_dataset() {
        let mut dataset = synthetic_dataset(10);
        dataset.examples.retain(|e| e.label == 1);
        let err = train(&dataset, quick_config()).unwrap_err();
        assert!(matches!(err, PhishguardError::DataShape(_)));
    }

    #[test]
    fn rejects_empty_dataset() {
        let err = train(&Dataset::default(), quick_config()).unwrap_err();
        assert!(matches!(err, PhishguardError::DataShape(_)));
    }

    #[test]
    fn config_defaults_are_the_documented_ones() {
        let config = TrainConfig::default();
        assert_eq!(config.n_trees, 100);
        assert_eq!(config.learning_rate, 0.1);
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.seed, 42);
        assert_eq!(config.test_fraction, 0.2);
    }
}
