//! Uploaded PDF storage

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::Result;

/// Stored document without its bytes
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PdfRecord {
    pub id: String,
    pub filename: String,
    pub content_type: String,
    pub size: i64,
    pub uploaded_at: String,
}

/// Document bytes with what is needed to serve them
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PdfContent {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// PDF repository
pub struct PdfRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PdfRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a document, returning its new id
    pub async fn insert(&self, filename: &str, content_type: &str, data: &[u8]) -> Result<PdfRecord> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO pdfs (id, filename, content_type, size, data, uploaded_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(filename)
        .bind(content_type)
        .bind(data.len() as i64)
        .bind(data)
        .bind(&now)
        .execute(self.pool)
        .await?;

        Ok(PdfRecord {
            id,
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            size: data.len() as i64,
            uploaded_at: now,
        })
    }

    pub async fn get(&self, id: &str) -> Result<Option<PdfRecord>> {
        let record = sqlx::query_as::<_, PdfRecord>(
            r#"
            SELECT id, filename, content_type, size, uploaded_at
            FROM pdfs
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(record)
    }

    pub async fn content(&self, id: &str) -> Result<Option<PdfContent>> {
        let content = sqlx::query_as::<_, PdfContent>(
            r#"
            SELECT filename, content_type, data
            FROM pdfs
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(content)
    }
}
