use axum::{
    routing::get,
    Router,
};
use chrono::NaiveDate;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use crate::storage::HabitStore;
use crate::ui::Icons;

pub mod routes;

/// Server state. Holds no connection: every request opens its own.
pub struct AppState {
    pub database_path: PathBuf,
    /// Source of "today" for listing and toggling
    pub today: fn() -> NaiveDate,
}

impl AppState {
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            database_path,
            today: local_today,
        }
    }
}

/// Current date in the server's local timezone
pub fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Everything `start_server` needs
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    /// Directory with the browser front-end; `None` serves the API only
    pub static_dir: Option<PathBuf>,
    pub cors: bool,
}

pub fn router(state: Arc<AppState>, static_dir: Option<PathBuf>, cors: bool) -> Router {
    let mut app = Router::new()
        .route("/api", get(routes::get_api).post(routes::post_api));

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }
    if cors {
        app = app.layer(CorsLayer::permissive());
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

pub async fn start_server(options: ServerOptions) -> anyhow::Result<()> {
    // Create the schema up front so a bad path fails at startup, not on the first request
    HabitStore::open(&options.database_path)?;

    let state = Arc::new(AppState::new(options.database_path.clone()));
    let app = router(state, options.static_dir.clone(), options.cors);

    let addr: SocketAddr = format!("{}:{}", options.host, options.port).parse()?;
    tracing::info!("Starting server on {} (database: {})", addr, options.database_path.display());
    if let Some(dir) = &options.static_dir {
        tracing::info!("Serving front-end from {}", dir.display());
    }
    println!("{} Server running at http://{}", Icons::ROCKET, addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}
