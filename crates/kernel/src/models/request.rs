//! Translation request model.
//!
//! One row per distinct (fingerprint, source, target) ever seen. Uniqueness
//! is checked by looking up before inserting, not by a constraint, so
//! concurrent first requests can leave duplicates; lookups take the oldest.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::fingerprint::Fingerprint;

/// Translation request record.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct TranslationRequest {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    /// Creation time.
    pub timestamp: DateTime<Utc>,

    /// Source language code.
    pub source: String,

    /// Target language code.
    pub target: String,

    /// Full source text as first submitted.
    pub original_text: String,

    /// Hex fingerprint of `original_text`.
    pub original_text_hash: String,
}

impl TranslationRequest {
    /// Build a new, not yet persisted, request.
    pub fn new(source: &str, target: &str, original_text: &str, fingerprint: &Fingerprint) -> Self {
        Self {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            source: source.to_string(),
            target: target.to_string(),
            original_text: original_text.to_string(),
            original_text_hash: fingerprint.to_hex(),
        }
    }

    /// Find the request for a fingerprint and language pair.
    pub async fn fetch(
        executor: impl PgExecutor<'_>,
        fingerprint: &str,
        source: &str,
        target: &str,
    ) -> Result<Option<Self>> {
        let request = sqlx::query_as::<_, TranslationRequest>(
            r#"
            SELECT id, timestamp, source, target, original_text, original_text_hash
            FROM translation_request
            WHERE original_text_hash = $1 AND source = $2 AND target = $3
            ORDER BY timestamp ASC
            LIMIT 1
            "#,
        )
        .bind(fingerprint)
        .bind(source)
        .bind(target)
        .fetch_optional(executor)
        .await
        .context("failed to fetch translation request")?;

        Ok(request)
    }

    /// Persist this request. Always inserts; callers fetch first.
    pub async fn insert(&self, executor: impl PgExecutor<'_>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO translation_request (id, timestamp, source, target, original_text, original_text_hash)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(self.id)
        .bind(self.timestamp)
        .bind(&self.source)
        .bind(&self.target)
        .bind(&self.original_text)
        .bind(&self.original_text_hash)
        .execute(executor)
        .await
        .context("failed to insert translation request")?;

        Ok(())
    }
}
