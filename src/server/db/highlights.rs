//! Highlight batch storage
//!
//! Each save request becomes one batch. Reads regroup the rows so the
//! response mirrors what was posted, in save order.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::api::HighlightGroup;
use crate::error::Result;
use crate::geometry::PageRect;
use crate::highlights::Highlight;

#[derive(Debug, Clone, sqlx::FromRow)]
struct HighlightRow {
    batch_id: String,
    user_id: String,
    timestamp: String,
    color: String,
    text: String,
    rects_json: String,
}

impl HighlightRow {
    fn into_highlight(self) -> Result<Highlight> {
        let rects: Vec<PageRect> = serde_json::from_str(&self.rects_json)?;
        Ok(Highlight::new(rects, self.color, self.text, self.timestamp))
    }
}

/// Highlight repository
pub struct HighlightRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> HighlightRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Store one batch atomically, returning its id
    pub async fn insert_batch(&self, pdf_id: &str, user_id: &str, highlights: &[Highlight]) -> Result<String> {
        let batch_id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        let mut tx = self.pool.begin().await?;
        for (position, highlight) in highlights.iter().enumerate() {
            let rects_json = serde_json::to_string(&highlight.rects)?;
            sqlx::query(
                r#"
                INSERT INTO highlights (pdf_id, user_id, batch_id, position, timestamp, color, text, rects_json, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(pdf_id)
            .bind(user_id)
            .bind(&batch_id)
            .bind(position as i64)
            .bind(&highlight.timestamp)
            .bind(&highlight.color)
            .bind(&highlight.text)
            .bind(&rects_json)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(batch_id)
    }

    /// Saved batches for a document, oldest first
    pub async fn list_groups(&self, pdf_id: &str) -> Result<Vec<HighlightGroup>> {
        let rows = sqlx::query_as::<_, HighlightRow>(
            r#"
            SELECT batch_id, user_id, timestamp, color, text, rects_json
            FROM highlights
            WHERE pdf_id = ?
            ORDER BY id ASC
            "#,
        )
        .bind(pdf_id)
        .fetch_all(self.pool)
        .await?;

        let mut groups: Vec<(String, HighlightGroup)> = Vec::new();
        for row in rows {
            let batch_id = row.batch_id.clone();
            let user_id = row.user_id.clone();
            let highlight = row.into_highlight()?;

            if let Some((current, group)) = groups.last_mut() {
                if *current == batch_id {
                    group.highlights.push(highlight);
                    continue;
                }
            }
            groups.push((
                batch_id,
                HighlightGroup {
                    pdf_id: pdf_id.to_string(),
                    user_id,
                    highlights: vec![highlight],
                },
            ));
        }

        Ok(groups.into_iter().map(|(_, group)| group).collect())
    }

    /// Delete every highlight of the document carrying this timestamp
    pub async fn delete_by_timestamp(&self, pdf_id: &str, timestamp: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM highlights WHERE pdf_id = ? AND timestamp = ?")
            .bind(pdf_id)
            .bind(timestamp)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
