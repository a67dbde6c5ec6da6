//! Per-user document view history

use chrono::{SecondsFormat, Utc};
use sqlx::SqlitePool;

use crate::api::RecentPdf;
use crate::error::Result;

/// Entries returned by [`HistoryRepository::recent`]
pub const RECENT_LIMIT: i64 = 10;

/// View history repository
pub struct HistoryRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> HistoryRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Record that `user_id` opened `pdf_id`
    pub async fn record_access(&self, user_id: &str, pdf_id: &str) -> Result<()> {
        // Fixed width so text ordering matches time ordering
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        sqlx::query(
            r#"
            INSERT INTO pdf_history (user_id, pdf_id, last_accessed, access_count)
            VALUES (?, ?, ?, 1)
            ON CONFLICT(user_id, pdf_id) DO UPDATE SET
                last_accessed = excluded.last_accessed,
                access_count = pdf_history.access_count + 1
            "#,
        )
        .bind(user_id)
        .bind(pdf_id)
        .bind(&now)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Most recently opened documents that still exist, newest first
    pub async fn recent(&self, user_id: &str) -> Result<Vec<RecentPdf>> {
        let rows: Vec<(String, String, String, i64)> = sqlx::query_as(
            r#"
            SELECT h.pdf_id, p.filename, h.last_accessed, h.access_count
            FROM pdf_history h
            JOIN pdfs p ON p.id = h.pdf_id
            WHERE h.user_id = ?
            ORDER BY h.last_accessed DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(RECENT_LIMIT)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(pdf_id, filename, last_accessed, access_count)| RecentPdf {
                pdf_id,
                filename,
                last_accessed,
                access_count: Some(access_count),
            })
            .collect())
    }

    /// Forget a user's history, returning how many entries went
    pub async fn clear(&self, user_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM pdf_history WHERE user_id = ?")
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
