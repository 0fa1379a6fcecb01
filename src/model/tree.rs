//! Regression tree storage and traversal.
//!
//! Trees are stored structure-of-arrays: parallel vectors indexed by node id,
//! with node 0 as the root. Only numeric splits exist - the inputs are
//! ternary signals with no missing values, so a feature value either falls
//! left of the threshold or it does not. Split gains are kept per node to
//! feed the feature-importance ranking.

use serde::{Deserialize, Serialize};

pub type NodeId = u32;

/// A single fitted tree. Immutable after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    split_indices: Vec<u32>,
    split_thresholds: Vec<f32>,
    left_children: Vec<u32>,
    right_children: Vec<u32>,
    is_leaf: Vec<bool>,
    leaf_values: Vec<f32>,
    /// Information gain at each split node; 0 at leaves.
    gains: Vec<f32>,
}

/// Mutable builder used during training; frozen into a [`Tree`].
#[derive(Debug, Default)]
pub struct TreeBuilder {
    split_indices: Vec<u32>,
    split_thresholds: Vec<f32>,
    left_children: Vec<u32>,
    right_children: Vec<u32>,
    is_leaf: Vec<bool>,
    leaf_values: Vec<f32>,
    gains: Vec<f32>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a placeholder node, returning its id. The node starts as a
    /// leaf with value 0 and is specialized by `set_split` / `set_leaf`.
    pub fn push_node(&mut self) -> NodeId {
        let id = self.split_indices.len() as NodeId;
        self.split_indices.push(0);
        self.split_thresholds.push(0.0);
        self.left_children.push(0);
        self.right_children.push(0);
        self.is_leaf.push(true);
        self.leaf_values.push(0.0);
        self.gains.push(0.0);
        id
    }

    pub fn set_split(
        &mut self,
        node: NodeId,
        feature: u32,
        threshold: f32,
        left: NodeId,
        right: NodeId,
        gain: f32,
    ) {
        let i = node as usize;
        self.split_indices[i] = feature;
        self.split_thresholds[i] = threshold;
        self.left_children[i] = left;
        self.right_children[i] = right;
        self.is_leaf[i] = false;
        self.gains[i] = gain;
    }

    pub fn set_leaf(&mut self, node: NodeId, value: f32) {
        let i = node as usize;
        self.is_leaf[i] = true;
        self.leaf_values[i] = value;
    }

    pub fn freeze(self) -> Tree {
        Tree {
            split_indices: self.split_indices,
            split_thresholds: self.split_thresholds,
            left_children: self.left_children,
            right_children: self.right_children,
            is_leaf: self.is_leaf,
            leaf_values: self.leaf_values,
            gains: self.gains,
        }
    }
}

impl Tree {
    pub fn n_nodes(&self) -> usize {
        self.is_leaf.len()
    }

    #[inline]
    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.is_leaf[node as usize]
    }

    #[inline]
    pub fn split_index(&self, node: NodeId) -> u32 {
        self.split_indices[node as usize]
    }

    #[inline]
    pub fn split_threshold(&self, node: NodeId) -> f32 {
        self.split_thresholds[node as usize]
    }

    #[inline]
    pub fn gain(&self, node: NodeId) -> f32 {
        self.gains[node as usize]
    }

    /// Walk root to leaf and return the leaf's value.
    pub fn predict_row(&self, features: &[f32]) -> f32 {
        let mut node: NodeId = 0;
        while !self.is_leaf(node) {
            let i = node as usize;
            let value = features[self.split_indices[i] as usize];
            node = if value < self.split_thresholds[i] {
                self.left_children[i]
            } else {
                self.right_children[i]
            };
        }
        self.leaf_values[node as usize]
    }

    /// Accumulate each split's gain into a per-feature total.
    pub fn accumulate_gains(&self, totals: &mut [f64]) {
        for i in 0..self.n_nodes() {
            if !self.is_leaf[i] {
                totals[self.split_indices[i] as usize] += self.gains[i] as f64;
            }
        }
    }

    /// Structural sanity check used by the artifact loader: children in
    /// bounds and no self-loops. Returns false for a malformed tree.
    pub fn is_well_formed(&self) -> bool {
        let n = self.n_nodes();
        if n == 0 {
            return false;
        }
        for i in 0..n {
            if self.is_leaf[i] {
                continue;
            }
            let (l, r) = (self.left_children[i] as usize, self.right_children[i] as usize);
            if l >= n || r >= n || l == i || r == i {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature: u32, threshold: f32, left: f32, right: f32) -> Tree {
        let mut builder = TreeBuilder::new();
        let root = builder.push_node();
        let l = builder.push_node();
        let r = builder.push_node();
        builder.set_split(root, feature, threshold, l, r, 1.5);
        builder.set_leaf(l, left);
        builder.set_leaf(r, right);
        builder.freeze()
    }

    #[test]
    fn predict_simple_tree() {
        let tree = stump(0, 0.5, 1.0, 2.0);
        assert_eq!(tree.predict_row(&[0.3]), 1.0);
        assert_eq!(tree.predict_row(&[0.7]), 2.0);
    }

    #[test]
    fn predict_on_ternary_thresholds() {
        // Split at -0.5 separates -1 from {0, 1}.
        let tree = stump(0, -0.5, -2.0, 2.0);
        assert_eq!(tree.predict_row(&[-1.0]), -2.0);
        assert_eq!(tree.predict_row(&[0.0]), 2.0);
        assert_eq!(tree.predict_row(&[1.0]), 2.0);
    }

    #[test]
    fn gains_accumulate_per_feature() {
        let tree = stump(3, 0.5, -1.0, 1.0);
        let mut totals = vec![0.0f64; 5];
        tree.accumulate_gains(&mut totals);
        assert_eq!(totals[3], 1.5);
        assert_eq!(totals[0], 0.0);
    }

    #[test]
    fn single_leaf_tree_is_constant() {
        let mut builder = TreeBuilder::new();
        let root = builder.push_node();
        builder.set_leaf(root, 0.25);
        let tree = builder.freeze();
        assert_eq!(tree.predict_row(&[9.0, 9.0]), 0.25);
        assert!(tree.is_well_formed());
    }

    #[test]
    fn well_formedness_rejects_self_loop() {
        let mut builder = TreeBuilder::new();
        let root = builder.push_node();
        builder.set_split(root, 0, 0.5, root, root, 0.0);
        assert!(!builder.freeze().is_well_formed());
    }
}
