//! GameGreenEco - Main entry point

use gamegreeneco_app::{session, AppConfig, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gamegreeneco_app=debug,gamegreeneco_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting GameGreenEco");

    let config = AppConfig::from_env()?;
    tracing::debug!("Loaded {:?}", config);

    let state = AppState::init(&config).await?;
    session::run(&state, &config).await?;

    tracing::info!("Session finished");
    Ok(())
}
