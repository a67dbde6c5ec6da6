//! Backend client
//!
//! Typed access to the persistence backend. The highlight calls sit behind
//! [`HighlightBackend`] so the document view can run against a fake.

mod error;
mod upload;

pub use error::*;
pub use upload::*;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Response;

use crate::api::{
    AccessRequest, HighlightsResponse, PdfInfo, RecentPdf, RecentPdfsResponse, SaveHighlightsRequest,
    UploadResponse,
};
use crate::config::ViewerConfig;
use crate::highlights::Highlight;

/// Highlight persistence as seen by the document view
#[async_trait]
pub trait HighlightBackend: Send + Sync {
    /// Every highlight saved for a document, flattened in save order
    async fn fetch_highlights(&self, pdf_id: &str) -> Result<Vec<Highlight>, ClientError>;

    /// Append one highlight
    async fn save_highlight(&self, pdf_id: &str, user_id: &str, highlight: &Highlight) -> Result<(), ClientError>;

    /// Delete by identity timestamp
    async fn delete_highlight(&self, pdf_id: &str, timestamp: &str) -> Result<(), ClientError>;
}

/// HTTP client for the backend
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        Self::new(config.api_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Address the viewer loads the document from
    pub fn pdf_url(&self, pdf_id: &str) -> String {
        self.url(&format!("/pdfs/pdf/{}", urlencoding::encode(pdf_id)))
    }

    /// Upload a PDF; refused locally unless it is a non-empty PDF
    pub async fn upload_pdf(&self, file: &PdfFile) -> Result<UploadResponse, ClientError> {
        file.validate()?;

        let part = Part::bytes(file.data.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(self.url("/pdfs/upload/"))
            .multipart(form)
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    pub async fn pdf_bytes(&self, pdf_id: &str) -> Result<Vec<u8>, ClientError> {
        let response = self.http.get(self.pdf_url(pdf_id)).send().await?;
        Ok(check(response).await?.bytes().await?.to_vec())
    }

    pub async fn pdf_info(&self, pdf_id: &str) -> Result<PdfInfo, ClientError> {
        let url = self.url(&format!("/pdfs/info/{}", urlencoding::encode(pdf_id)));
        let response = self.http.get(url).send().await?;
        Ok(check(response).await?.json().await?)
    }

    pub async fn recent_pdfs(&self, user_id: &str) -> Result<Vec<RecentPdf>, ClientError> {
        let url = self.url(&format!("/pdfs/recent/{}", urlencoding::encode(user_id)));
        let response = self.http.get(url).send().await?;
        let body: RecentPdfsResponse = check(response).await?.json().await?;
        Ok(body.recent_pdfs)
    }

    pub async fn clear_recent(&self, user_id: &str) -> Result<(), ClientError> {
        let url = self.url(&format!("/pdfs/recent/clear/{}", urlencoding::encode(user_id)));
        let response = self.http.delete(url).send().await?;
        check(response).await?;
        Ok(())
    }

    pub async fn record_access(&self, pdf_id: &str, user_id: &str) -> Result<(), ClientError> {
        let url = self.url(&format!("/pdfs/access/{}", urlencoding::encode(pdf_id)));
        let response = self
            .http
            .post(url)
            .json(&AccessRequest {
                user_id: user_id.to_string(),
            })
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl HighlightBackend for BackendClient {
    async fn fetch_highlights(&self, pdf_id: &str) -> Result<Vec<Highlight>, ClientError> {
        let url = self.url(&format!("/pdfs/highlights/{}", urlencoding::encode(pdf_id)));
        let response = self.http.get(url).send().await?;
        let body: HighlightsResponse = check(response).await?.json().await?;
        Ok(body.flatten())
    }

    async fn save_highlight(&self, pdf_id: &str, user_id: &str, highlight: &Highlight) -> Result<(), ClientError> {
        let request = SaveHighlightsRequest {
            pdf_id: pdf_id.to_string(),
            user_id: user_id.to_string(),
            highlights: vec![highlight.clone()],
        };
        let response = self
            .http
            .post(self.url("/pdfs/highlights/"))
            .json(&request)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn delete_highlight(&self, pdf_id: &str, timestamp: &str) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(delete_url(&self.base_url, pdf_id, timestamp))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

fn delete_url(base_url: &str, pdf_id: &str, timestamp: &str) -> String {
    format!(
        "{}/pdfs/highlights/{}/{}",
        base_url,
        urlencoding::encode(pdf_id),
        urlencoding::encode(timestamp)
    )
}

/// Turn non-success statuses into errors
async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_is_percent_encoded() {
        let url = delete_url("http://localhost:8000", "abc", "2024-05-01T10:20:30.123Z");
        assert_eq!(
            url,
            "http://localhost:8000/pdfs/highlights/abc/2024-05-01T10%3A20%3A30.123Z"
        );
    }

    #[test]
    fn test_base_url_trailing_slash_is_dropped() {
        let client = BackendClient::new("http://localhost:8000/");
        assert_eq!(client.pdf_url("p1"), "http://localhost:8000/pdfs/pdf/p1");
    }

    #[test]
    fn test_client_from_viewer_config() {
        let config = ViewerConfig {
            api_url: "http://backend:9000//".to_string(),
            ..ViewerConfig::default()
        };
        assert_eq!(BackendClient::from_config(&config).base_url(), "http://backend:9000");
    }
}
