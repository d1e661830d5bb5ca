// House Price Estimator - Pricing Service
// REST API with Axum: health, feature list and predictions

use anyhow::{Context, Result};
use house_price_estimator::service::{router, ReportedMetrics, ServiceState};
use house_price_estimator::ServerConfig;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "house_price_estimator=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    // Reported metrics: file if configured, built-in otherwise
    let metrics = match &config.metrics_path {
        Some(path) => {
            let metrics = ReportedMetrics::load(path)?;
            info!(path = %path.display(), "Loaded model metrics");
            metrics
        }
        None => ReportedMetrics::default(),
    };
    info!(r2_score = metrics.r2_score, "Model metrics ready");

    let app = router(Arc::new(ServiceState::new(metrics)));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    info!("🚀 Pricing service running on http://{}", addr);

    axum::serve(listener, app)
        .await
        .context("server error")?;

    Ok(())
}
