use anyhow::Context;
use tracing_subscriber::EnvFilter;

use doctors_portal::AppState;
use doctors_portal::config::Config;
use doctors_portal::handlers;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let app_state = AppState::new(&config)
        .await
        .context("failed to initialize application state")?;

    let app = handlers::router(app_state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("doctors portal listening on {addr}");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
