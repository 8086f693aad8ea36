use anyhow::Result;
use facegated::{build_router, AppState, Config, GeminiClient, Scanner};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "facegated starting");

    let config = Config::from_env();
    if !config.has_api_key() {
        tracing::warn!(
            "no API key set (FACEGATE_API_KEY / API_KEY); scans will fail at the service"
        );
    }
    if !config.gallery_dir.is_dir() {
        tracing::warn!(
            dir = %config.gallery_dir.display(),
            "gallery directory missing; every scan will use an empty gallery"
        );
    }

    let client = GeminiClient::from_config(&config)?;
    tracing::info!(model = %config.model, "inference client ready");

    let scanner = Scanner::from_config(Arc::new(client), &config);
    let app = build_router(AppState::new(scanner), config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!(addr = %config.bind, "facegated listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    tracing::info!("facegated shutting down");
    Ok(())
}
