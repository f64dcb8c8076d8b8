//! `apigraph-server` — HTTP service around the API graph editor.
//!
//! # Quick start
//!
//! ```sh
//! # In-memory workspace on the default port:
//! apigraph-server
//!
//! # Persistent SQLite workspace:
//! APIGRAPH_DB=./apigraph.db apigraph-server
//!
//! # Custom bind address and a longer validation debounce:
//! APIGRAPH_BIND=127.0.0.1:8080 APIGRAPH_VALIDATION_DELAY_MS=750 apigraph-server
//! ```
//!
//! # Environment variables
//!
//! See [`apigraph_server::ServerConfig`] for the full list.

use std::sync::Arc;

use apigraph::WORKSPACE_KEY;
use apigraph_server::{
    build_router, restore_editor, AppState, MemoryStorage, ServerConfig, SqliteStorage, Storage,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "apigraph_server=info,tower_http=debug".into()),
        )
        .init();

    let config = ServerConfig::from_env().unwrap_or_else(|e| fatal(e));

    let storage: Arc<dyn Storage> = match &config.db_path {
        Some(path) => {
            tracing::info!("storage: SQLite at {path}");
            Arc::new(SqliteStorage::open(path).unwrap_or_else(|e| {
                fatal(format!("failed to open SQLite database at {path}: {e}"))
            }))
        }
        None => {
            tracing::info!("storage: in-memory (workspace will not survive restart)");
            Arc::new(MemoryStorage::new())
        }
    };

    let editor = restore_editor(storage.as_ref(), WORKSPACE_KEY, &config)
        .await
        .unwrap_or_else(|e| fatal(format!("failed to restore workspace: {e}")));

    let state = AppState {
        editor: Arc::new(editor),
        storage: Arc::clone(&storage),
        workspace_key: WORKSPACE_KEY.to_string(),
    };
    let app = build_router(state.clone());

    tracing::info!("listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .unwrap_or_else(|e| fatal(format!("failed to bind {}: {e}", config.bind_addr)));

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("server error: {e}");
    }

    let workspace = state.editor.workspace();
    match storage.save_workspace(WORKSPACE_KEY, &workspace).await {
        Ok(()) => tracing::info!(
            nodes = workspace.graph.len(),
            edges = workspace.graph.edge_count(),
            "workspace saved on shutdown"
        ),
        Err(e) => tracing::error!("failed to save workspace on shutdown: {e}"),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}

fn fatal(msg: impl std::fmt::Display) -> ! {
    tracing::error!("{msg}");
    eprintln!("apigraph-server: {msg}");
    std::process::exit(2);
}
