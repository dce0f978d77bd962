//! Service entrypoint: wires the pipeline and serves the HTTP surface.

mod routes;
mod ws;

use std::process::ExitCode;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tokentide_core::{
    DexScreenerSource, GeckoTerminalSource, HttpClient, JupiterSource, MemorySnapshotStore, Poller,
    ReqwestHttpClient, ServiceConfig, SnapshotBroadcaster, TokenAggregator, TokenSource,
};

use crate::routes::AppState;

#[derive(Debug, Error)]
enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
    #[error("server terminated: {0}")]
    Serve(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "fatal");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tokentide_core=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run() -> Result<(), ServerError> {
    let config = ServiceConfig::from_env();
    info!(?config, "starting tokentide");

    let http_client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
    let sources: Vec<Arc<dyn TokenSource>> = vec![
        Arc::new(DexScreenerSource::new(Arc::clone(&http_client))),
        Arc::new(GeckoTerminalSource::new(Arc::clone(&http_client))),
        Arc::new(JupiterSource::new(Arc::clone(&http_client))),
    ];

    let store = Arc::new(MemorySnapshotStore::new(config.cache_ttl));
    let aggregator = Arc::new(
        TokenAggregator::new(sources, store).with_fetch_timeout(config.fetch_timeout),
    );
    let broadcaster = SnapshotBroadcaster::new(config.broadcast_capacity);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller = Poller::new(
        Arc::clone(&aggregator),
        broadcaster.clone(),
        config.poll_interval,
        shutdown_rx,
    );
    let poller_handle = tokio::spawn(poller.run());

    let state = AppState {
        aggregator,
        broadcaster,
    };
    let app = routes::router(state);

    let addr = format!("{}:{}", config.bind, config.port);
    let listener = TcpListener::bind(&addr).await.map_err(|source| {
        ServerError::Bind {
            addr: addr.clone(),
            source,
        }
    })?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop the poller once the server is down.
    let _ = shutdown_tx.send(true);
    let _ = poller_handle.await;
    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        error!("failed to install ctrl-c handler, running until killed");
        std::future::pending::<()>().await;
    }
}
