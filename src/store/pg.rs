//! Direct Postgres backend over the same `media` / `analysis` tables.
//! Expects the tables to exist already.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;

use super::{MediaStore, StoreConnector};
use crate::error::StoreError;
use crate::model::{AnalysisResult, Insights, MediaEntry, MediaId, Sentiment};

type AnalysisRow = (
    Option<String>,
    Option<Json<Vec<String>>>,
    Option<Json<Vec<String>>>,
    Option<Json<Sentiment>>,
);

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MediaStore for PgStore {
    async fn insert_media(&self, entry: &MediaEntry) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO media (id, name, url) VALUES ($1, $2, $3)")
            .bind(entry.id.as_str())
            .bind(&entry.name)
            .bind(&entry.url)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_media(&self, entry: &MediaEntry) -> Result<(), StoreError> {
        sqlx::query("UPDATE media SET name = $2, url = $3 WHERE id = $1")
            .bind(entry.id.as_str())
            .bind(&entry.name)
            .bind(&entry.url)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_media(&self, id: &MediaId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM media WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_analysis(&self, media_id: &MediaId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM analysis WHERE media_id = $1")
            .bind(media_id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_media(&self) -> Result<Vec<MediaEntry>, StoreError> {
        let rows: Vec<(String, String, String)> =
            sqlx::query_as("SELECT id, name, url FROM media ORDER BY created_at ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows
            .into_iter()
            .map(|(id, name, url)| MediaEntry { id: id.into(), name, url })
            .collect())
    }

    async fn fetch_analysis(&self, media_id: &MediaId) -> Result<Option<AnalysisResult>, StoreError> {
        let row: Option<AnalysisRow> = sqlx::query_as(
            r#"
            SELECT summary, topics, action_items, sentiment
            FROM analysis
            WHERE media_id = $1
            "#,
        )
        .bind(media_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| AnalysisResult::new(media_id.clone(), insights_from_row(row))))
    }

    async fn upsert_analysis(&self, result: &AnalysisResult) -> Result<(), StoreError> {
        let ins = &result.insights;
        sqlx::query(
            r#"
            INSERT INTO analysis (media_id, summary, topics, action_items, sentiment)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (media_id)
            DO UPDATE SET summary = EXCLUDED.summary,
                          topics = EXCLUDED.topics,
                          action_items = EXCLUDED.action_items,
                          sentiment = EXCLUDED.sentiment
            "#,
        )
        .bind(result.media_id.as_str())
        .bind(&ins.summary)
        .bind(Json(&ins.topics))
        .bind(Json(&ins.action_items))
        .bind(Json(&ins.sentiment))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// Null columns read as empty values.
fn insights_from_row((summary, topics, action_items, sentiment): AnalysisRow) -> Insights {
    Insights {
        summary: summary.unwrap_or_default(),
        topics: topics.map(|j| j.0).unwrap_or_default(),
        action_items: action_items.map(|j| j.0).unwrap_or_default(),
        sentiment: sentiment.map(|j| j.0).unwrap_or_default(),
    }
}

/// Holds a lazily-connecting pool; the first query opens the connection.
pub struct PgConnector {
    store: Arc<PgStore>,
}

impl PgConnector {
    pub fn new(dsn: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new().max_connections(5).connect_lazy(dsn)?;
        Ok(Self { store: Arc::new(PgStore::new(pool)) })
    }
}

impl StoreConnector for PgConnector {
    fn connect(&self) -> Result<Arc<dyn MediaStore>, StoreError> {
        Ok(self.store.clone())
    }
}
