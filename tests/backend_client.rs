//! Backend client against a live server on a loopback port

use pdf_highlighter::client::{BackendClient, ClientError, HighlightBackend, PdfFile, Uploader};
use pdf_highlighter::config::Config;
use pdf_highlighter::geometry::PageRect;
use pdf_highlighter::highlights::Highlight;
use pdf_highlighter::server::{self, db, AppState};
use tokio::net::TcpListener;

async fn spawn_server() -> BackendClient {
    let pool = db::connect_in_memory().await.unwrap();
    let app = server::router(AppState::new(Config::default(), pool));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    BackendClient::new(format!("http://{}/", addr))
}

fn highlight(timestamp: &str, top: f64) -> Highlight {
    let rect = PageRect {
        page_index: 1,
        left: 12.5,
        top,
        width: 180.0,
        height: 14.0,
        text: Some("highlighted words".to_string()),
    };
    Highlight::new(vec![rect], "#ff0000", "highlighted words", timestamp.to_string())
}

#[tokio::test]
async fn test_full_document_lifecycle() {
    let client = spawn_server().await;
    let body = b"%PDF-1.4 lifecycle".to_vec();

    let uploaded = client
        .upload_pdf(&PdfFile::new("lifecycle.pdf", "application/pdf", body.clone()))
        .await
        .unwrap();
    let pdf_id = uploaded.pdf_id;
    assert_eq!(client.pdf_info(&pdf_id).await.unwrap().filename, "lifecycle.pdf");
    assert_eq!(client.pdf_bytes(&pdf_id).await.unwrap(), body);

    let first = highlight("2024-05-01T10:20:30.123Z", 40.0);
    let second = highlight("2024-05-01T10:20:31.456Z", 90.0);
    client.save_highlight(&pdf_id, "reader", &first).await.unwrap();
    client.save_highlight(&pdf_id, "reader", &second).await.unwrap();

    let fetched = client.fetch_highlights(&pdf_id).await.unwrap();
    assert_eq!(fetched, vec![first.clone(), second.clone()]);

    client.delete_highlight(&pdf_id, &first.timestamp).await.unwrap();
    assert_eq!(client.fetch_highlights(&pdf_id).await.unwrap(), vec![second]);

    let err = client
        .delete_highlight(&pdf_id, &first.timestamp)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 404, .. }));

    client.record_access(&pdf_id, "reader").await.unwrap();
    let recent = client.recent_pdfs("reader").await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].pdf_id, pdf_id);
    assert_eq!(recent[0].filename, "lifecycle.pdf");

    client.clear_recent("reader").await.unwrap();
    assert!(client.recent_pdfs("reader").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_server_errors_surface_as_status() {
    let client = spawn_server().await;

    let err = client.pdf_info("not-a-uuid").await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 400, .. }));

    let missing = uuid::Uuid::new_v4().to_string();
    let err = client.record_access(&missing, "reader").await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_uploader_returns_new_document_id() {
    let client = spawn_server().await;
    let mut uploader = Uploader::new();

    let pdf_id = uploader
        .upload(&client, &PdfFile::new("a.pdf", "application/pdf", b"%PDF".to_vec()))
        .await
        .unwrap();
    assert_eq!(client.pdf_info(&pdf_id).await.unwrap().filename, "a.pdf");
}
