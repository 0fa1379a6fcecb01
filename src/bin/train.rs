//! Training CLI.
//!
//! Loads the labeled signal table, trains the ensemble with the fixed
//! configuration, logs the held-out evaluation, and writes the model
//! artifact plus a standalone feature-importance file next to it.
//!
//! Usage: `phishguard-train [dataset.csv [model.json]]`; both paths default
//! to the configured environment values.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use phishguard::config::Config;
use phishguard::dataset::Dataset;
use phishguard::model::{self, TrainConfig};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "phishguard=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env();

    let mut args = std::env::args().skip(1);
    let dataset_path = args.next().unwrap_or(config.dataset_path);
    let model_path = args.next().unwrap_or(config.model_path);

    tracing::info!("Loading dataset from {}", dataset_path);
    let dataset = Dataset::load_csv(Path::new(&dataset_path))
        .with_context(|| format!("loading dataset {}", dataset_path))?;
    tracing::info!(
        examples = dataset.len(),
        classes = ?dataset.classes(),
        "dataset loaded"
    );

    let train_config = TrainConfig::default();
    tracing::info!(
        n_trees = train_config.n_trees,
        learning_rate = train_config.learning_rate,
        max_depth = train_config.max_depth,
        seed = train_config.seed,
        "training"
    );

    let trained = model::train(&dataset, train_config)?;

    tracing::info!("held-out evaluation:\n{}", trained.eval.render());
    tracing::info!("top feature importances:");
    for (name, importance) in trained.importance_ranking().into_iter().take(10) {
        tracing::info!("  {:<22} {:.4}", name, importance);
    }

    let model_path = PathBuf::from(model_path);
    model::save(&trained, &model_path)?;

    // Standalone importance file for dashboards that do not read artifacts.
    let importance_path = model_path.with_file_name("feature_importance.json");
    let importance_json = serde_json::to_string_pretty(
        &trained
            .importance_ranking()
            .into_iter()
            .map(|(name, importance)| serde_json::json!({ "feature": name, "importance": importance }))
            .collect::<Vec<_>>(),
    )?;
    std::fs::write(&importance_path, importance_json)
        .with_context(|| format!("writing {}", importance_path.display()))?;

    tracing::info!(
        model = %model_path.display(),
        importances = %importance_path.display(),
        "artifacts written"
    );
    Ok(())
}
