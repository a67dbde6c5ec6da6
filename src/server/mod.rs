//! Persistence backend
//!
//! HTTP service storing uploaded PDFs, highlight batches and view history
//! in SQLite, plus a websocket relay between viewers of the same document.
//! The overlay engine reaches it through
//! [`BackendClient`](crate::client::BackendClient).

pub mod db;
pub mod realtime;
pub mod routes;
mod state;

pub use state::AppState;

use axum::{extract::DefaultBodyLimit, routing::get, Json, Router};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::MessageResponse;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "PDF Highlighter API is running".to_string(),
    })
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = state.config().upload.max_bytes;

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/pdfs", routes::router())
        .nest("/realtime", routes::realtime::router())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
