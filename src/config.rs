//! Configuration module

use std::env;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the persisted model artifact
    pub model_path: String,

    /// Server port
    pub port: u16,

    /// Path to the labeled training table (CSV)
    pub dataset_path: String,

    /// Per-lookup timeout for remote/content feature signals
    pub lookup_timeout: Duration,

    /// Skip all external lookups; remote/content signals stay indeterminate
    pub offline: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            model_path: env::var("PHISHGUARD_MODEL_PATH")
                .unwrap_or_else(|_| "model.json".to_string()),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),

            dataset_path: env::var("PHISHGUARD_DATASET")
                .unwrap_or_else(|_| "phishing.csv".to_string()),

            lookup_timeout: Duration::from_millis(
                env::var("PHISHGUARD_LOOKUP_TIMEOUT_MS")
                    .ok()
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(3000),
            ),

            offline: env::var("PHISHGUARD_OFFLINE")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }
}
