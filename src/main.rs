//! Phishguard API server.
//!
//! Loads the model artifact once, builds the feature extractor per the
//! configured lookup mode, and serves the scan API. A missing or unreadable
//! artifact is fatal at startup: serving from an untrained fallback would
//! answer every request with noise.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use phishguard::config::Config;
use phishguard::features::{DnsIntel, HttpPageFetcher, OfflineLookups, UrlFeatureExtractor};
use phishguard::model;
use phishguard::predictor::Predictor;
use phishguard::serve::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "phishguard=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing::info!("Phishguard server starting...");
    tracing::info!("Model artifact: {}", config.model_path);

    let loaded = model::load(Path::new(&config.model_path))?;
    let predictor = Predictor::new(loaded)?;
    tracing::info!(
        trees = predictor.model().trees.len(),
        accuracy = predictor.model().eval.accuracy,
        "model ready"
    );

    let extractor = if config.offline {
        tracing::info!("offline mode: remote and content signals stay indeterminate");
        UrlFeatureExtractor::new(Arc::new(OfflineLookups), Arc::new(OfflineLookups))
    } else {
        UrlFeatureExtractor::new(
            Arc::new(DnsIntel),
            Arc::new(HttpPageFetcher::new(config.lookup_timeout)),
        )
    };

    let state = AppState {
        extractor: Arc::new(extractor),
        predictor,
    };
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
