use habit_tracker::remote::{DirectoryRemoteStore, RemoteMirror};
use habit_tracker::{AppState, CompletionStore, Config, router};
use std::{net::SocketAddr, sync::Arc};
use tokio::fs;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    if let Some(parent) = config.data_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let store = CompletionStore::load(config.data_path.clone()).await;
    info!(
        "loaded {} tracked days from {}",
        store.len(),
        store.path().display()
    );

    let remote = config.remote_path.clone().map(|dir| {
        info!("mirroring day records to {}", dir.display());
        RemoteMirror::new(Arc::new(DirectoryRemoteStore::new(dir)))
    });

    let app = router(AppState::new(store, remote));
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
