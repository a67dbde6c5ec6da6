//! Database schema initialization

use sqlx::SqlitePool;

use crate::error::Result;

/// Initialize the database schema
pub async fn initialize_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(SCHEMA_SQL).execute(pool).await?;

    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Uploaded documents
CREATE TABLE IF NOT EXISTS pdfs (
    id TEXT PRIMARY KEY,
    filename TEXT NOT NULL,
    content_type TEXT NOT NULL,
    size INTEGER NOT NULL,
    data BLOB NOT NULL,
    uploaded_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Highlights, one row each; rows saved by one request share a batch_id
CREATE TABLE IF NOT EXISTS highlights (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    pdf_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    batch_id TEXT NOT NULL,
    position INTEGER NOT NULL,
    timestamp TEXT NOT NULL,
    color TEXT NOT NULL,
    text TEXT NOT NULL DEFAULT '',
    rects_json TEXT NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_highlights_pdf_id ON highlights(pdf_id);
CREATE INDEX IF NOT EXISTS idx_highlights_timestamp ON highlights(pdf_id, timestamp);

-- Per-user view history
CREATE TABLE IF NOT EXISTS pdf_history (
    user_id TEXT NOT NULL,
    pdf_id TEXT NOT NULL,
    last_accessed TEXT NOT NULL,
    access_count INTEGER NOT NULL DEFAULT 1,

    PRIMARY KEY (user_id, pdf_id)
);

CREATE INDEX IF NOT EXISTS idx_history_last_accessed ON pdf_history(user_id, last_accessed);
"#;
