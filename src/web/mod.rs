//! campusnet-web: REST surface over the campusnet core.
//!
//! The database is initialised once at startup; each request then opens
//! its own [`Storage`](crate::storage::Storage) handle. Handlers translate
//! JSON in and out of the domain modules.

pub mod config;
pub mod handlers;
pub mod router;
pub mod state;
pub mod utils;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use crate::storage::{db_path, Storage};

use config::{Cli, Config};
use state::AppState;

/// Entry point: parse CLI, open the database, serve until signalled.
pub async fn run() {
    let cli = Cli::parse();
    let config = Config::from_cli_and_env(cli);

    crate::logging::init();

    info!("campusnet-web starting");
    info!("  data directory: {}", config.data_dir.display());

    let path = db_path(&config.data_dir);
    Storage::open(&path).expect("failed to open database");
    info!("  database: {}", path.display());

    let app = router::build_router(AppState::shared(path));

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .expect("failed to bind");
    info!("campusnet-web listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    info!("campusnet-web stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
        info!("shutdown: received Ctrl+C");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        signal(SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
        info!("shutdown: received terminate signal");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
