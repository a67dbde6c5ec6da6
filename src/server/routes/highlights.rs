//! Highlight persistence routes

use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};

use crate::api::{HighlightsResponse, MessageResponse, SaveHighlightsRequest};
use crate::error::{AppError, Result};
use crate::server::db::HighlightRepository;
use crate::server::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/highlights/", post(save_highlights))
        .route("/highlights/:pdf_id", get(list_highlights))
        .route("/highlights/:pdf_id/:timestamp", delete(delete_highlight))
}

/// Store the posted highlights as one batch
async fn save_highlights(
    State(state): State<AppState>,
    Json(data): Json<SaveHighlightsRequest>,
) -> Result<Json<MessageResponse>> {
    let repo = HighlightRepository::new(state.db());
    let batch_id = repo.insert_batch(&data.pdf_id, &data.user_id, &data.highlights).await?;
    tracing::debug!(
        pdf_id = %data.pdf_id,
        batch_id = %batch_id,
        count = data.highlights.len(),
        "saved highlights"
    );

    Ok(Json(MessageResponse {
        message: "Highlights saved successfully".to_string(),
    }))
}

/// All saved batches for a document
async fn list_highlights(
    State(state): State<AppState>,
    Path(pdf_id): Path<String>,
) -> Result<Json<HighlightsResponse>> {
    let repo = HighlightRepository::new(state.db());
    let highlights = repo.list_groups(&pdf_id).await?;
    Ok(Json(HighlightsResponse { pdf_id, highlights }))
}

async fn delete_highlight(
    State(state): State<AppState>,
    Path((pdf_id, timestamp)): Path<(String, String)>,
) -> Result<Json<MessageResponse>> {
    let repo = HighlightRepository::new(state.db());
    let deleted = repo.delete_by_timestamp(&pdf_id, &timestamp).await?;
    if deleted == 0 {
        return Err(AppError::NotFound(format!("Highlight not found: {}", timestamp)));
    }

    Ok(Json(MessageResponse {
        message: "Highlight deleted successfully".to_string(),
    }))
}
