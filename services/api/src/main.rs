use std::sync::Arc;

use anyhow::Context;
use api::config::Config;
use api::{router, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    info!("=== CineVerse API ===");
    for dir in [&config.data_dir, &config.uploads_dir] {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    info!("Movie store: {}", config.movies_path().display());
    info!("Frontend: {}", config.public_dir.display());

    let bind = config.bind.clone();
    let app = router(Arc::new(AppState::new(config)));

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("API listening on http://{}", bind);

    axum::serve(listener, app).await?;

    Ok(())
}
