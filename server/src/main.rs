use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use daily_report_server::backend::{config::AppConfig, create_router, initialize_backend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load()?;

    let app_state = initialize_backend(&config).await?;
    let app = create_router(app_state);

    // Start the server
    let listener = TcpListener::bind(&config.server.bind_address)
        .await
        .with_context(|| format!("unable to bind {}", config.server.bind_address))?;
    info!("Starting server on {}", config.server.bind_address);
    axum::serve(listener, app).await?;

    Ok(())
}
