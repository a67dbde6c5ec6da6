//! Wire types of the backend HTTP contract
//!
//! Shared by the client and the server so both sides agree on field names.

use serde::{Deserialize, Serialize};

use crate::highlights::Highlight;

/// `POST /pdfs/upload/` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub message: String,
    pub pdf_id: String,
    #[serde(default)]
    pub filename: Option<String>,
}

/// `GET /pdfs/info/{id}` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfInfo {
    pub filename: String,
}

/// One saved batch of highlights (one per save request)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightGroup {
    #[serde(default)]
    pub pdf_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub highlights: Vec<Highlight>,
}

/// `GET /pdfs/highlights/{id}` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighlightsResponse {
    #[serde(default)]
    pub pdf_id: String,
    #[serde(default)]
    pub highlights: Vec<HighlightGroup>,
}

impl HighlightsResponse {
    /// All highlights across groups, in save order
    pub fn flatten(self) -> Vec<Highlight> {
        self.highlights
            .into_iter()
            .flat_map(|group| group.highlights)
            .collect()
    }
}

/// `POST /pdfs/highlights/` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveHighlightsRequest {
    pub pdf_id: String,
    pub user_id: String,
    pub highlights: Vec<Highlight>,
}

/// Generic acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// One entry of a user's view history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentPdf {
    pub pdf_id: String,
    pub filename: String,
    pub last_accessed: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_count: Option<i64>,
}

/// `GET /pdfs/recent/{user_id}` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentPdfsResponse {
    #[serde(default)]
    pub recent_pdfs: Vec<RecentPdf>,
}

/// `POST /pdfs/access/{id}` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessRequest {
    pub user_id: String,
}
