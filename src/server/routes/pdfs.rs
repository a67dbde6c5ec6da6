//! PDF upload and retrieval routes

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::api::{PdfInfo, UploadResponse};
use crate::error::{AppError, Result};
use crate::server::db::PdfRepository;
use crate::server::state::AppState;

const PDF_CONTENT_TYPE: &str = "application/pdf";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload/", post(upload_pdf))
        .route("/pdf/:pdf_id", get(get_pdf))
        .route("/info/:pdf_id", get(get_pdf_info))
}

/// Accept a PDF from the multipart field `file`
async fn upload_pdf(State(state): State<AppState>, mut multipart: Multipart) -> Result<Json<UploadResponse>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("document.pdf").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        tracing::info!("Starting upload for file: {}", filename);

        if content_type != PDF_CONTENT_TYPE {
            tracing::warn!("Invalid file type: {}", content_type);
            return Err(AppError::BadRequest("Only PDF files are allowed".to_string()));
        }

        let data = field.bytes().await?;
        if data.is_empty() {
            tracing::warn!("Empty file uploaded: {}", filename);
            return Err(AppError::BadRequest("Empty file".to_string()));
        }

        let record = PdfRepository::new(state.db())
            .insert(&filename, &content_type, &data)
            .await?;
        tracing::info!("Stored {} ({} bytes) as {}", filename, record.size, record.id);

        return Ok(Json(UploadResponse {
            message: "PDF uploaded successfully".to_string(),
            pdf_id: record.id,
            filename: Some(record.filename),
        }));
    }

    Err(AppError::BadRequest("Missing multipart field: file".to_string()))
}

/// Serve the raw document
async fn get_pdf(State(state): State<AppState>, Path(pdf_id): Path<String>) -> Result<Response> {
    validate_id(&pdf_id)?;

    let content = PdfRepository::new(state.db())
        .content(&pdf_id)
        .await?
        .ok_or_else(|| AppError::NotFound("PDF not found".to_string()))?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, PDF_CONTENT_TYPE)
        .header(header::CONTENT_LENGTH, content.data.len())
        .header(
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", content.filename.replace('"', "")),
        )
        .body(Body::from(content.data))
        .map_err(|e| AppError::Internal(e.to_string()))
}

async fn get_pdf_info(State(state): State<AppState>, Path(pdf_id): Path<String>) -> Result<Json<PdfInfo>> {
    validate_id(&pdf_id)?;

    let record = PdfRepository::new(state.db())
        .get(&pdf_id)
        .await?
        .ok_or_else(|| AppError::NotFound("PDF not found".to_string()))?;

    Ok(Json(PdfInfo {
        filename: record.filename,
    }))
}

pub(crate) fn validate_id(pdf_id: &str) -> Result<()> {
    Uuid::parse_str(pdf_id)
        .map(|_| ())
        .map_err(|_| AppError::BadRequest("Invalid PDF ID format".to_string()))
}
