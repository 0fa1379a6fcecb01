//! Model artifact persistence.
//!
//! The artifact is versioned JSON. Loading is strict: a missing or corrupt
//! file is a [`PhishguardError::ModelLoad`], and an artifact whose class
//! encoding cannot be read is [`PhishguardError::ClassEncodingAmbiguous`].
//! There is deliberately no fallback to a freshly constructed model - an
//! untrained ensemble scores every URL near the base rate, which looks
//! alive while being useless, so startup fails instead.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{PhishguardError, Result};
use crate::features::layout::{layout_hash, FEATURE_COUNT};
use crate::model::booster::GbdtModel;

/// Bumped when the artifact schema changes incompatibly.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct ModelArtifact {
    format_version: u32,
    #[serde(flatten)]
    model: GbdtModel,
}

/// Persist a fitted model to disk.
pub fn save(model: &GbdtModel, path: &Path) -> Result<()> {
    let artifact = ModelArtifact {
        format_version: ARTIFACT_FORMAT_VERSION,
        model: model.clone(),
    };
    let json = serde_json::to_string(&artifact)
        .map_err(|e| PhishguardError::model_load(format!("serialize artifact: {}", e)))?;
    fs::write(path, json).map_err(|e| {
        PhishguardError::model_load(format!("write artifact {}: {}", path.display(), e))
    })?;
    info!(path = %path.display(), trees = model.trees.len(), "model artifact saved");
    Ok(())
}

/// Load and validate a model artifact.
pub fn load(path: &Path) -> Result<GbdtModel> {
    let text = fs::read_to_string(path).map_err(|e| {
        PhishguardError::model_load(format!("read artifact {}: {}", path.display(), e))
    })?;

    // Check the class encoding before full deserialization so an artifact
    // from a foreign trainer fails with the precise error.
    let value: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| PhishguardError::model_load(format!("artifact is not JSON: {}", e)))?;
    validate_classes(&value)?;

    let artifact: ModelArtifact = serde_json::from_value(value)
        .map_err(|e| PhishguardError::model_load(format!("artifact schema: {}", e)))?;

    if artifact.format_version != ARTIFACT_FORMAT_VERSION {
        return Err(PhishguardError::model_load(format!(
            "artifact format v{} unsupported (expected v{})",
            artifact.format_version, ARTIFACT_FORMAT_VERSION
        )));
    }

    let model = artifact.model;
    if model.feature_names.len() != FEATURE_COUNT {
        return Err(PhishguardError::model_load(format!(
            "artifact trained on {} features, extractor produces {}",
            model.feature_names.len(),
            FEATURE_COUNT
        )));
    }
    if model.layout_hash != layout_hash() {
        return Err(PhishguardError::model_load(format!(
            "artifact layout hash {:08x} does not match current layout {:08x}",
            model.layout_hash,
            layout_hash()
        )));
    }
    if model.trees.is_empty() || model.trees.iter().any(|t| !t.is_well_formed()) {
        return Err(PhishguardError::model_load(
            "artifact contains no usable trees".to_string(),
        ));
    }

    info!(
        path = %path.display(),
        trees = model.trees.len(),
        classes = ?model.classes,
        "model artifact loaded"
    );
    Ok(model)
}

/// The `classes` field is the one thing that must never be guessed at:
/// artifacts in the wild encode the pair as {1,-1} or {1,0} depending on
/// which trainer produced them.
fn validate_classes(value: &serde_json::Value) -> Result<()> {
    let classes = value
        .get("classes")
        .ok_or_else(|| PhishguardError::ambiguous_classes("artifact has no 'classes' field"))?;
    let items = classes
        .as_array()
        .ok_or_else(|| PhishguardError::ambiguous_classes("'classes' is not an array"))?;
    if items.len() != 2 {
        return Err(PhishguardError::ambiguous_classes(format!(
            "'classes' has {} entries, expected 2",
            items.len()
        )));
    }
    let mut parsed = [0i64; 2];
    for (slot, item) in parsed.iter_mut().zip(items.iter()) {
        *slot = item.as_i64().ok_or_else(|| {
            PhishguardError::ambiguous_classes("'classes' entries are not integers")
        })?;
    }
    if parsed[0] == parsed[1] {
        return Err(PhishguardError::ambiguous_classes(
            "'classes' entries are not distinct",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::model::booster::TrainConfig;
    use crate::model::trainer;

    fn trained_model() -> GbdtModel {
        use crate::dataset::TrainingExample;
        use crate::features::Signal;

        let mut examples = Vec::new();
        for k in 0..40 {
            let mut pos = [1 as Signal; FEATURE_COUNT];
            pos[k % FEATURE_COUNT] = 0;
            examples.push(TrainingExample { features: pos, label: 1 });
            let mut neg = [-1 as Signal; FEATURE_COUNT];
            neg[k % FEATURE_COUNT] = 0;
            examples.push(TrainingExample { features: neg, label: -1 });
        }
        let dataset = Dataset { examples };
        trainer::train(
            &dataset,
            TrainConfig {
                n_trees: 10,
                ..TrainConfig::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn round_trip_preserves_predictions_and_eval() {
        let model = trained_model();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");

        save(&model, &path).unwrap();
        let loaded = load(&path).unwrap();

        assert_eq!(loaded.classes, model.classes);
        assert_eq!(loaded.eval.accuracy, model.eval.accuracy);

        let row = [1.0f32; FEATURE_COUNT];
        assert_eq!(loaded.predict_margin(&row), model.predict_margin(&row));
    }

    #[test]
    fn missing_artifact_is_model_load_error() {
        let err = load(Path::new("/nonexistent/model.json")).unwrap_err();
        assert!(matches!(err, PhishguardError::ModelLoad(_)));
    }

    #[test]
    fn corrupt_artifact_is_model_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        fs::write(&path, "{not json").unwrap();
        let err = load(&path).unwrap_err();
        assert!(matches!(err, PhishguardError::ModelLoad(_)));
    }

    #[test]
    fn artifact_without_classes_is_ambiguous() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        fs::write(&path, r#"{"format_version": 1, "trees": []}"#).unwrap();
        let err = load(&path).unwrap_err();
        assert!(matches!(err, PhishguardError::ClassEncodingAmbiguous(_)));
    }

    #[test]
    fn artifact_with_degenerate_classes_is_ambiguous() {
        let model = trained_model();
        let mut value = serde_json::to_value(ModelArtifact {
            format_version: ARTIFACT_FORMAT_VERSION,
            model,
        })
        .unwrap();
        value["classes"] = serde_json::json!([1, 1]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        fs::write(&path, value.to_string()).unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, PhishguardError::ClassEncodingAmbiguous(_)));
    }

    #[test]
    fn layout_mismatch_is_model_load_error() {
        let mut model = trained_model();
        model.layout_hash ^= 0xdead_beef;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        save(&model, &path).unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, PhishguardError::ModelLoad(_)));
    }

    #[test]
    fn zero_one_encoding_loads() {
        // Artifact produced by the {1, 0} labeling convention.
        let mut model = trained_model();
        model.classes = [0, 1];

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        save(&model, &path).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.classes, [0, 1]);
    }
}
