//! foxden-server: publishes the "now watching" status over HTTP.
//!
//! Reads configuration from the environment, sets up tracing, picks a
//! store, and serves until SIGINT or SIGTERM.

mod config;
mod error;
mod middleware;
mod routes;
mod state;
mod store;

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let cfg = Config::from_env();
    init_tracing(&cfg);

    let state = Arc::new(AppState::new(cfg.clone()));
    info!(
        version = env!("CARGO_PKG_VERSION"),
        store = state.publisher.store().kind(),
        auth_required = state.publisher.requires_auth(),
        data_file = ?cfg.data_file,
        "foxden-server starting"
    );
    if !state.publisher.requires_auth() {
        warn!("no API key configured; any client may publish");
    }

    let listener = tokio::net::TcpListener::bind(&cfg.bind_address).await?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, routes::build(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("foxden-server stopped");
    Ok(())
}

/// `RUST_LOG` wins over `FOXDEN_LOG`; an unparsable filter means `info`.
fn init_tracing(cfg: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt = tracing_subscriber::fmt().with_env_filter(filter);

    if cfg.log_json {
        fmt.json().init();
    } else {
        fmt.init();
    }
}

/// Resolves on Ctrl-C, or on SIGTERM where the platform has it.
async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM unavailable");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Ctrl-C unavailable");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = interrupt => {}
        _ = terminate => {}
    }
    info!("shutting down");
}
