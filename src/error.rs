//! Error taxonomy for the classification pipeline.
//!
//! Sub-signal failures never reach this module: the feature extractor
//! absorbs them as indeterminate values. What surfaces here is fatal to the
//! call that raised it - wrong shapes, unreadable artifacts, ambiguous class
//! encodings - and is never silently coerced.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PhishguardError {
    /// Dataset or feature vector has the wrong arity or domain.
    #[error("data shape error: {0}")]
    DataShape(String),

    /// Model artifact missing, unreadable, or structurally corrupt.
    /// Fatal at process start; there is deliberately no fallback model.
    #[error("model load error: {0}")]
    ModelLoad(String),

    /// The artifact's class ordering cannot be determined. Guessing the
    /// encoding silently flips predictions, so this always fails loudly.
    #[error("class encoding ambiguous: {0}")]
    ClassEncodingAmbiguous(String),
}

pub type Result<T> = std::result::Result<T, PhishguardError>;

impl PhishguardError {
    pub fn data_shape(msg: impl Into<String>) -> Self {
        Self::DataShape(msg.into())
    }

    pub fn model_load(msg: impl Into<String>) -> Self {
        Self::ModelLoad(msg.into())
    }

    pub fn ambiguous_classes(msg: impl Into<String>) -> Self {
        Self::ClassEncodingAmbiguous(msg.into())
    }
}
