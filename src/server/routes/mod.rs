//! Route modules for the PDF Highlighter server

pub mod highlights;
pub mod history;
pub mod pdfs;
pub mod realtime;

use axum::Router;

use super::state::AppState;

/// Everything served under `/pdfs`
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(pdfs::router())
        .merge(highlights::router())
        .merge(history::router())
}
