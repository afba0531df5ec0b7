use quire_server::{build_router, config::Config, state::AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("Starting quire server...");
    let config = Config::load()?;
    tracing::info!(
        "Configuration loaded (chunk size {}, inter-chunk delay {} ms)",
        config.pipeline.chunk_size,
        config.pipeline.inter_chunk_delay_ms
    );
    if let Some(path) = &config.generation_log.path {
        tracing::info!("Recording generations to {}", path.display());
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = build_router(AppState::new(config)?);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Listening on {}", addr);
    tracing::info!("  - POST /generate-pdf");
    tracing::info!("  - GET  /health");

    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,quire_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
