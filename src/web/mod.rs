//! HTTP front-end.
//!
//! ## Routes
//!
//! | Route | Handler |
//! |---|---|
//! | `GET /` | upload form |
//! | `POST /` | multipart submission → transform → `303` to `/result` |
//! | `GET /result?input_image=&output_image=&name=` | side-by-side display |
//! | `GET /uploads/<name>` | raw uploads (`ServeDir`) |
//! | `GET /static/<name>` | processed results (`ServeDir`) |
//!
//! Form errors re-render the upload page with an inline message; see
//! [`AppError`] for the status mapping.

mod error;
mod handlers;
mod pages;

pub use error::AppError;
pub use handlers::ResultQuery;

use crate::config::ServerConfig;
use crate::imaging::{ImageBackend, RustBackend};
use crate::storage::Storage;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use std::io;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub storage: Storage,
    pub backend: Arc<dyn ImageBackend>,
    pub upload_limit: usize,
}

impl AppState {
    /// Build state from config, creating the storage directories.
    pub async fn new(config: &ServerConfig) -> io::Result<Self> {
        let storage = Storage::open(
            config.storage.upload_dir.clone(),
            config.storage.result_dir.clone(),
        )
        .await?;
        Ok(Self {
            storage,
            backend: Arc::new(RustBackend::new()),
            upload_limit: config.server.max_upload_bytes,
        })
    }
}

pub fn router(state: AppState) -> Router {
    let uploads = ServeDir::new(state.storage.upload_dir());
    let results = ServeDir::new(state.storage.result_dir());

    Router::new()
        .route("/", get(handlers::index).post(handlers::submit))
        .route("/result", get(handlers::show_result))
        .nest_service("/uploads", uploads)
        .nest_service("/static", results)
        .layer(DefaultBodyLimit::max(state.upload_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the app on an already-bound listener until the process stops.
pub async fn serve(listener: TcpListener, state: AppState) -> io::Result<()> {
    axum::serve(listener, router(state)).await
}
