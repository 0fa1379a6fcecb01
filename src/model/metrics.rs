//! Classification metrics for the held-out evaluation.
//!
//! Everything operates on hard labels in the dataset's own encoding; the
//! trainer computes them once per run and embeds the report in the artifact
//! so a reloaded model can reproduce its reported numbers.

use serde::{Deserialize, Serialize};

/// Per-class precision/recall/F1 plus support.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassReport {
    pub class: i8,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Full evaluation of predictions against truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalReport {
    pub accuracy: f64,
    pub per_class: Vec<ClassReport>,
    /// confusion[i][j] = count of true class `classes[i]` predicted as `classes[j]`.
    pub confusion: Vec<Vec<usize>>,
    /// Class order for the confusion matrix rows/columns, ascending.
    pub classes: Vec<i8>,
    pub n_samples: usize,
}

impl EvalReport {
    /// Compute the report. `classes` must list every label that can occur,
    /// ascending; predictions and truth must have equal length.
    pub fn compute(truth: &[i8], predicted: &[i8], classes: &[i8]) -> Self {
        debug_assert_eq!(truth.len(), predicted.len());

        let index_of = |label: i8| classes.iter().position(|&c| c == label);

        let k = classes.len();
        let mut confusion = vec![vec![0usize; k]; k];
        let mut correct = 0usize;

        for (&t, &p) in truth.iter().zip(predicted.iter()) {
            if t == p {
                correct += 1;
            }
            if let (Some(ti), Some(pi)) = (index_of(t), index_of(p)) {
                confusion[ti][pi] += 1;
            }
        }

        let per_class = classes
            .iter()
            .enumerate()
            .map(|(i, &class)| {
                let tp = confusion[i][i];
                let predicted_as: usize = (0..k).map(|r| confusion[r][i]).sum();
                let support: usize = confusion[i].iter().sum();

                let precision = if predicted_as > 0 {
                    tp as f64 / predicted_as as f64
                } else {
                    0.0
                };
                let recall = if support > 0 {
                    tp as f64 / support as f64
                } else {
                    0.0
                };
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };

                ClassReport {
                    class,
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect();

        let n_samples = truth.len();
        let accuracy = if n_samples > 0 {
            correct as f64 / n_samples as f64
        } else {
            0.0
        };

        Self {
            accuracy,
            per_class,
            confusion,
            classes: classes.to_vec(),
            n_samples,
        }
    }

    /// Multi-line text rendering in the shape of a classification report.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("accuracy: {:.4} ({} samples)\n", self.accuracy, self.n_samples));
        out.push_str("class  precision  recall  f1      support\n");
        for report in &self.per_class {
            out.push_str(&format!(
                "{:>5}  {:>9.4}  {:>6.4}  {:>6.4}  {:>7}\n",
                report.class, report.precision, report.recall, report.f1, report.support
            ));
        }
        out.push_str("confusion matrix (rows = truth):\n");
        for (i, row) in self.confusion.iter().enumerate() {
            out.push_str(&format!("{:>5}  {:?}\n", self.classes[i], row));
        }
        out
    }
}
