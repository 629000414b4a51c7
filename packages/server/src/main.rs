use std::sync::Arc;

use anyhow::Context;
use common::SystemClock;
use judge::NodeRunner;
use tracing::info;

use server::config::AppConfig;
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let config = AppConfig::load().context("Failed to load config")?;

    let db = server::database::init_db(&config.database.url)
        .await
        .context("Failed to initialize database")?;
    info!("Database connected and schema synced");

    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState {
        db,
        runner: Arc::new(NodeRunner::new(config.judge.node_bin.clone())),
        clock: Arc::new(SystemClock),
        config,
    };

    let app = server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
