//! Backend client errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Rejected locally, no request was sent
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },
}
