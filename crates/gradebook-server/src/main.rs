//! Gradebook Server
//!
//! A small record-management HTTP service for student records: CRUD plus a
//! "topper" query for the highest score. Storage is either a persistent
//! SQLite table or a transient in-memory store, selected at startup.

mod handlers;
mod storage;

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use storage::{Database, MemoryStore, StudentStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn StudentStore>,
}

#[tokio::main]
async fn main() {
    // Set up panic hook to log crashes
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()));
        let payload = if let Some(s) = info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        eprintln!("[PANIC] at {:?}: {}", location, payload);
        tracing::error!("PANIC at {:?}: {}", location, payload);
    }));

    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("[FATAL] Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("Starting Gradebook Server v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_server().await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run_server() -> Result<()> {
    let config = load_config().await.context("Failed to load configuration")?;
    info!(
        "Config loaded: bind={}, backend={:?}, db={}",
        config.bind_address, config.backend, config.database_path
    );

    // Initialize the selected storage backend
    let store: Arc<dyn StudentStore> = match config.backend {
        Backend::Sqlite => Arc::new(
            Database::new(&config.database_path)
                .await
                .context("Failed to initialize database")?,
        ),
        Backend::Memory => {
            info!("Using in-memory storage (records are lost on shutdown)");
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState { store };

    let app = Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // REST API routes
        .merge(api_routes())
        // Layers
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = config
        .bind_address
        .parse()
        .context("Failed to parse bind address")?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/students",
            get(handlers::students::list).post(handlers::students::create),
        )
        // Literal segment takes precedence over ":id", so "topper" is never
        // parsed as a record id.
        .route("/students/topper", get(handlers::students::topper))
        .route(
            "/students/:id",
            get(handlers::students::get)
                .put(handlers::students::update)
                .delete(handlers::students::delete),
        )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backend {
    Sqlite,
    Memory,
}

#[derive(Debug, Clone)]
struct Config {
    bind_address: String,
    database_path: String,
    backend: Backend,
}

async fn load_config() -> Result<Config> {
    let data_dir = std::env::var("DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./data"));

    tokio::fs::create_dir_all(&data_dir)
        .await
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

    let database_path = std::env::var("DATABASE_PATH").unwrap_or_else(|_| {
        let path = data_dir.join("gradebook.db");
        path.to_string_lossy().to_string()
    });

    let bind_address =
        std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8000".to_string());

    let backend = match std::env::var("STORAGE_BACKEND")
        .unwrap_or_else(|_| "sqlite".to_string())
        .as_str()
    {
        "sqlite" => Backend::Sqlite,
        "memory" => Backend::Memory,
        other => anyhow::bail!(
            "Unknown STORAGE_BACKEND '{}' (expected 'sqlite' or 'memory')",
            other
        ),
    };

    Ok(Config {
        bind_address,
        database_path,
        backend,
    })
}
