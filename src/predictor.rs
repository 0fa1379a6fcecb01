//! Serving-side predictor.
//!
//! Wraps a loaded [`GbdtModel`] behind an [`Arc`] so request handlers can
//! share it without locks. The class-to-verdict mapping is resolved once at
//! construction from the artifact's `classes` field: the class encoded `1`
//! means legitimate in every labeling convention this dataset has shipped
//! with ({1, -1} and {1, 0} alike), and anything else refuses to load rather
//! than guess.

use std::sync::Arc;

use serde::Serialize;

use crate::error::{PhishguardError, Result};
use crate::features::layout::FEATURE_COUNT;
use crate::features::{FeatureVector, Signal};
use crate::model::GbdtModel;

/// Final verdict for a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Legitimate,
    Phishing,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Legitimate => "legitimate",
            Label::Phishing => "phishing",
        }
    }
}

/// One scored URL.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Prediction {
    pub label: Label,
    /// Probability of the winning label, as a percentage.
    pub confidence: f32,
    pub proba_legitimate: f32,
    pub proba_phishing: f32,
}

#[derive(Debug, Clone)]
pub struct Predictor {
    model: Arc<GbdtModel>,
    /// Index into `model.classes` of the legitimate class.
    legit_index: usize,
}

impl Predictor {
    /// Build a predictor, resolving the verdict mapping from the artifact.
    pub fn new(model: GbdtModel) -> Result<Self> {
        let legit_index = model
            .classes
            .iter()
            .position(|&c| c == 1)
            .ok_or_else(|| {
                PhishguardError::ambiguous_classes(format!(
                    "classes {:?} contain no legitimate class (1)",
                    model.classes
                ))
            })?;
        if model.classes[0] == model.classes[1] {
            return Err(PhishguardError::ambiguous_classes(format!(
                "classes {:?} are not distinct",
                model.classes
            )));
        }
        Ok(Self {
            model: Arc::new(model),
            legit_index,
        })
    }

    pub fn model(&self) -> &GbdtModel {
        &self.model
    }

    /// Score an extracted feature vector.
    pub fn predict(&self, vector: &FeatureVector) -> Result<Prediction> {
        vector
            .validate()
            .map_err(|e| PhishguardError::data_shape(e.to_string()))?;
        self.predict_signals(vector.as_slice())
    }

    /// Score a raw signal slice. The slice must carry exactly one signal per
    /// feature in the layout.
    pub fn predict_signals(&self, signals: &[Signal]) -> Result<Prediction> {
        if signals.len() != FEATURE_COUNT {
            return Err(PhishguardError::data_shape(format!(
                "expected {} feature signals, got {}",
                FEATURE_COUNT,
                signals.len()
            )));
        }

        let mut row = [0.0f32; FEATURE_COUNT];
        for (slot, &signal) in row.iter_mut().zip(signals.iter()) {
            *slot = signal as f32;
        }

        let proba = self.model.predict_proba(&row);
        let proba_legitimate = proba[self.legit_index];
        let proba_phishing = 1.0 - proba_legitimate;

        let (label, winning) = if proba_legitimate >= proba_phishing {
            (Label::Legitimate, proba_legitimate)
        } else {
            (Label::Phishing, proba_phishing)
        };

        Ok(Prediction {
            label,
            confidence: winning * 100.0,
            proba_legitimate,
            proba_phishing,
        })
    }
}
