//! View history routes

use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};

use super::pdfs::validate_id;
use crate::api::{AccessRequest, MessageResponse, RecentPdfsResponse};
use crate::error::{AppError, Result};
use crate::server::db::{HistoryRepository, PdfRepository};
use crate::server::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/recent/:user_id", get(recent_pdfs))
        .route("/recent/clear/:user_id", delete(clear_recent))
        .route("/access/:pdf_id", post(record_access))
}

async fn recent_pdfs(State(state): State<AppState>, Path(user_id): Path<String>) -> Result<Json<RecentPdfsResponse>> {
    let recent_pdfs = HistoryRepository::new(state.db()).recent(&user_id).await?;
    Ok(Json(RecentPdfsResponse { recent_pdfs }))
}

async fn clear_recent(State(state): State<AppState>, Path(user_id): Path<String>) -> Result<Json<MessageResponse>> {
    let cleared = HistoryRepository::new(state.db()).clear(&user_id).await?;
    tracing::info!(user_id = %user_id, cleared, "cleared view history");

    Ok(Json(MessageResponse {
        message: "Recent PDFs cleared".to_string(),
    }))
}

async fn record_access(
    State(state): State<AppState>,
    Path(pdf_id): Path<String>,
    Json(data): Json<AccessRequest>,
) -> Result<Json<MessageResponse>> {
    validate_id(&pdf_id)?;
    if PdfRepository::new(state.db()).get(&pdf_id).await?.is_none() {
        return Err(AppError::NotFound("PDF not found".to_string()));
    }

    HistoryRepository::new(state.db())
        .record_access(&data.user_id, &pdf_id)
        .await?;

    Ok(Json(MessageResponse {
        message: "Access recorded".to_string(),
    }))
}
