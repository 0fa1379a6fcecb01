//! Request handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::{AppError, AppResult};
use super::AppState;
use crate::predictor::Label;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    model_trees: usize,
    timestamp: i64,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        model_trees: state.predictor.model().trees.len(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct Probabilities {
    pub legitimate: f32,
    pub phishing: f32,
}

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub url: String,
    pub label: Label,
    pub is_safe: bool,
    /// Probability of the verdict, as a percentage.
    pub confidence: f32,
    pub risk_level: &'static str,
    pub probabilities: Probabilities,
    /// Named signal values that went into the verdict.
    pub features: serde_json::Value,
}

fn risk_level(proba_phishing: f32) -> &'static str {
    if proba_phishing < 0.25 {
        "low"
    } else if proba_phishing < 0.5 {
        "medium"
    } else if proba_phishing < 0.75 {
        "high"
    } else {
        "critical"
    }
}

/// Score one URL: extract the 30 signals, run the ensemble, report the
/// verdict with the signal breakdown.
pub async fn scan(
    State(state): State<AppState>,
    Json(request): Json<ScanRequest>,
) -> AppResult<Json<ScanResponse>> {
    let url = request.url.trim().to_string();
    if url.is_empty() {
        return Err(AppError::BadRequest("url must not be empty".to_string()));
    }

    // Extraction does blocking DNS/HTTP work; keep it off the async workers.
    let extractor = state.extractor.clone();
    let extract_url = url.clone();
    let vector = tokio::task::spawn_blocking(move || extractor.extract(&extract_url))
        .await
        .map_err(|e| AppError::InternalError(format!("extraction task failed: {}", e)))?;

    let prediction = state.predictor.predict(&vector)?;

    info!(
        url = %url,
        label = prediction.label.as_str(),
        confidence = prediction.confidence,
        "scan complete"
    );

    Ok(Json(ScanResponse {
        url,
        is_safe: prediction.label == Label::Legitimate,
        label: prediction.label,
        confidence: prediction.confidence,
        risk_level: risk_level(prediction.proba_phishing),
        probabilities: Probabilities {
            legitimate: prediction.proba_legitimate,
            phishing: prediction.proba_phishing,
        },
        features: vector.to_log_entry(),
    }))
}
