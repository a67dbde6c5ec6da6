//! PDF upload with local validation

use super::{BackendClient, ClientError};

/// Shown when the backend upload fails
pub const UPLOAD_FAILED_MESSAGE: &str = "Failed to upload PDF";

/// A file picked for upload
#[derive(Debug, Clone)]
pub struct PdfFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl PdfFile {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data,
        }
    }

    /// Refuse anything that is not a non-empty PDF
    pub fn validate(&self) -> Result<(), ClientError> {
        if !self.content_type.to_ascii_lowercase().contains("pdf") {
            return Err(ClientError::InvalidUpload(format!(
                "{} is not a PDF ({})",
                self.file_name, self.content_type
            )));
        }
        if self.data.is_empty() {
            return Err(ClientError::InvalidUpload(format!("{} is empty", self.file_name)));
        }
        Ok(())
    }
}

/// Where the upload form stands
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UploadState {
    #[default]
    Idle,
    /// Uploaded; the viewer should navigate to this document
    Uploaded { pdf_id: String },
    Failed(String),
}

/// Upload form state
#[derive(Debug, Default)]
pub struct Uploader {
    state: UploadState,
}

impl Uploader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    /// Validate, then upload. Invalid files never reach the network and
    /// leave the state untouched.
    pub async fn upload(&mut self, client: &BackendClient, file: &PdfFile) -> Result<String, ClientError> {
        if let Err(e) = file.validate() {
            tracing::warn!("Rejected upload: {}", e);
            return Err(e);
        }

        match client.upload_pdf(file).await {
            Ok(response) => {
                tracing::info!("Uploaded {} as {}", file.file_name, response.pdf_id);
                self.state = UploadState::Uploaded {
                    pdf_id: response.pdf_id.clone(),
                };
                Ok(response.pdf_id)
            }
            Err(e) => {
                tracing::error!("Error uploading PDF: {}", e);
                self.state = UploadState::Failed(UPLOAD_FAILED_MESSAGE.to_string());
                Err(e)
            }
        }
    }
}
