use anyhow::Context;
use bideval_engine::BidEvaluator;
use bideval_service::{create_app, ServiceConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config_path = std::env::var("BIDEVAL_CONFIG").ok().map(PathBuf::from);
    let config = ServiceConfig::load(config_path.as_deref()).context("Failed to load service configuration")?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = config.socket_addr()?;
    let app = create_app(BidEvaluator::new(config.engine.clone()));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Bid evaluation service listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
