//! Feature Vector - Core data structure for classifier input
//!
//! **Versioned ternary vector with layout validation**
//!
//! Uses the centralized layout from `layout.rs` for:
//! - Consistent feature ordering
//! - Version tracking
//! - Layout hash for compatibility checks

use serde::{Deserialize, Serialize};

use super::layout::{
    layout_hash, validate_layout, LayoutMismatchError, FEATURE_COUNT, FEATURE_LAYOUT,
    FEATURE_VERSION,
};

// ============================================================================
// TERNARY SIGNAL
// ============================================================================

/// A single ternary signal: 1 legitimate-leaning, -1 phishing-leaning,
/// 0 indeterminate.
pub type Signal = i8;

/// Neutral value used when a signal cannot be evaluated.
pub const INDETERMINATE: Signal = 0;

/// Check that a value is a legal signal.
pub fn is_valid_signal(v: Signal) -> bool {
    matches!(v, -1 | 0 | 1)
}

// ============================================================================
// VERSIONED FEATURE VECTOR
// ============================================================================

/// Versioned feature vector with layout metadata.
///
/// Immutable once produced by the extractor; the model consumes it read-only.
/// Never pass raw `Vec<i8>` between components - the version and hash are
/// what catches an extractor/model layout drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Feature layout version.
    pub version: u8,
    /// CRC32 hash of the feature layout (for mismatch detection).
    pub layout_hash: u32,
    /// Signal values in the order defined by FEATURE_LAYOUT.
    values: [Signal; FEATURE_COUNT],
}

impl FeatureVector {
    /// Create from signal values with the current layout stamp.
    ///
    /// Out-of-range values are clamped to the ternary domain; the extractor
    /// never produces them, but a vector deserialized from elsewhere might.
    pub fn from_values(values: [Signal; FEATURE_COUNT]) -> Self {
        let mut clamped = values;
        for v in clamped.iter_mut() {
            *v = (*v).clamp(-1, 1);
        }
        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values: clamped,
        }
    }

    /// Get signal values as a slice.
    pub fn as_slice(&self) -> &[Signal] {
        &self.values
    }

    /// Get signal by index.
    pub fn get(&self, index: usize) -> Option<Signal> {
        self.values.get(index).copied()
    }

    /// Get signal by name.
    pub fn get_by_name(&self, name: &str) -> Option<Signal> {
        super::layout::feature_index(name).and_then(|i| self.get(i))
    }

    /// Convert to the float row the model scores.
    pub fn to_f32(&self) -> [f32; FEATURE_COUNT] {
        let mut row = [0.0f32; FEATURE_COUNT];
        for (dst, &src) in row.iter_mut().zip(self.values.iter()) {
            *dst = src as f32;
        }
        row
    }

    /// Validate that this vector is compatible with the current layout.
    pub fn validate(&self) -> Result<(), LayoutMismatchError> {
        validate_layout(self.version, self.layout_hash)
    }

    /// Feature names for this vector.
    pub fn feature_names(&self) -> &'static [&'static str] {
        FEATURE_LAYOUT
    }

    /// JSON view with named values, for logging and API responses.
    pub fn to_log_entry(&self) -> serde_json::Value {
        serde_json::json!({
            "feature_version": self.version,
            "layout_hash": self.layout_hash,
            "values": self.values,
            "named_values": FEATURE_LAYOUT.iter()
                .zip(self.values.iter())
                .map(|(name, value)| (name.to_string(), *value))
                .collect::<std::collections::BTreeMap<_, _>>(),
        })
    }
}

impl From<[Signal; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [Signal; FEATURE_COUNT]) -> Self {
        Self::from_values(values)
    }
}

// ============================================================================
// TESTS
// ============================================================================
