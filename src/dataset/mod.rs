//! Labeled dataset loading and partitioning.
//!
//! The training table is a CSV with a header row: the 30 feature columns in
//! layout order, one `class` label column with domain {1, -1}, and an
//! optional leading `Index` column which is dropped. Anything else is a
//! [`PhishguardError::DataShape`] - the trainer fails fast rather than
//! guessing at malformed input.

use std::fs;
use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{PhishguardError, Result};
use crate::features::layout::{FEATURE_COUNT, FEATURE_LAYOUT};
use crate::features::Signal;

/// Name of the label column.
pub const LABEL_COLUMN: &str = "class";

/// One labeled row: 30 ternary signals plus a class in {1, -1}.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingExample {
    pub features: [Signal; FEATURE_COUNT],
    pub label: i8,
}

/// Ordered collection of training examples.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub examples: Vec<TrainingExample>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Load from a CSV file on disk.
    pub fn load_csv(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            PhishguardError::data_shape(format!("cannot read dataset {}: {}", path.display(), e))
        })?;
        Self::parse_csv(&text)
    }

    /// Parse the labeled table from CSV text.
    pub fn parse_csv(text: &str) -> Result<Self> {
        let mut lines = text.lines().filter(|l| !l.trim().is_empty());

        let header = lines
            .next()
            .ok_or_else(|| PhishguardError::data_shape("dataset is empty"))?;
        let columns: Vec<&str> = header.split(',').map(|c| c.trim()).collect();

        let skip_index = columns.first() == Some(&"Index");
        let feature_cols: Vec<&str> = columns
            .iter()
            .copied()
            .skip(usize::from(skip_index))
            .collect();

        let Some((&label_col, feature_names)) = feature_cols.split_last() else {
            return Err(PhishguardError::data_shape("dataset has no columns"));
        };
        if label_col != LABEL_COLUMN {
            return Err(PhishguardError::data_shape(format!(
                "label column '{}' missing, last column is '{}'",
                LABEL_COLUMN, label_col
            )));
        }
        if feature_names.len() != FEATURE_COUNT {
            return Err(PhishguardError::data_shape(format!(
                "expected {} feature columns, found {}",
                FEATURE_COUNT,
                feature_names.len()
            )));
        }
        for (i, (&found, &expected)) in feature_names.iter().zip(FEATURE_LAYOUT.iter()).enumerate()
        {
            if found != expected {
                return Err(PhishguardError::data_shape(format!(
                    "feature column {} is '{}', layout expects '{}'",
                    i, found, expected
                )));
            }
        }

        let mut examples = Vec::new();
        for (line_no, line) in lines.enumerate() {
            let cells: Vec<&str> = line.split(',').map(|c| c.trim()).collect();
            let expected_cells = FEATURE_COUNT + 1 + usize::from(skip_index);
            if cells.len() != expected_cells {
                return Err(PhishguardError::data_shape(format!(
                    "row {}: expected {} cells, found {}",
                    line_no + 2,
                    expected_cells,
                    cells.len()
                )));
            }

            let data = &cells[usize::from(skip_index)..];
            let mut features = [0 as Signal; FEATURE_COUNT];
            for (i, cell) in data[..FEATURE_COUNT].iter().enumerate() {
                let value: i8 = cell.parse().map_err(|_| {
                    PhishguardError::data_shape(format!(
                        "row {}: '{}' is not a signal value",
                        line_no + 2,
                        cell
                    ))
                })?;
                if !matches!(value, -1 | 0 | 1) {
                    return Err(PhishguardError::data_shape(format!(
                        "row {}: signal {} out of range: {}",
                        line_no + 2,
                        i,
                        value
                    )));
                }
                features[i] = value;
            }

            let label: i8 = data[FEATURE_COUNT].parse().map_err(|_| {
                PhishguardError::data_shape(format!(
                    "row {}: label '{}' is not an integer",
                    line_no + 2,
                    data[FEATURE_COUNT]
                ))
            })?;
            if label != 1 && label != -1 {
                return Err(PhishguardError::data_shape(format!(
                    "row {}: label {} outside {{1, -1}}",
                    line_no + 2,
                    label
                )));
            }

            examples.push(TrainingExample { features, label });
        }

        if examples.is_empty() {
            return Err(PhishguardError::data_shape("dataset has a header but no rows"));
        }

        Ok(Self { examples })
    }

    /// Distinct labels present, ascending.
    pub fn classes(&self) -> Vec<i8> {
        let mut classes: Vec<i8> = Vec::new();
        for example in &self.examples {
            if !classes.contains(&example.label) {
                classes.push(example.label);
            }
        }
        classes.sort_unstable();
        classes
    }

    /// Deterministic stratified split: each class is shuffled with the seed
    /// and cut at `test_fraction`, so both partitions preserve the class
    /// balance of the whole table.
    pub fn stratified_split(&self, test_fraction: f64, seed: u64) -> (Dataset, Dataset) {
        let mut rng = StdRng::seed_from_u64(seed);

        let mut train = Vec::new();
        let mut test = Vec::new();

        for class in self.classes() {
            let mut indices: Vec<usize> = self
                .examples
                .iter()
                .enumerate()
                .filter(|(_, e)| e.label == class)
                .map(|(i, _)| i)
                .collect();
            indices.shuffle(&mut rng);

            let n_test = ((indices.len() as f64) * test_fraction).round() as usize;
            for (k, &i) in indices.iter().enumerate() {
                if k < n_test {
                    test.push(self.examples[i].clone());
                } else {
                    train.push(self.examples[i].clone());
                }
            }
        }

        (Dataset { examples: train }, Dataset { examples: test })
    }
}
