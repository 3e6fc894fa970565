//! Read-only `translation` view: a response joined with its request's
//! original text and its rating aggregate.
//!
//! The aggregate is recomputed by the view on every read.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

use super::response::{TranslationMode, TranslationResponse};

/// Row of the `translation` view.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Translation {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub target: String,
    pub mode: TranslationMode,

    /// Text of the matching request, if one was ever stored.
    pub original_text: Option<String>,

    pub original_text_hash: String,
    pub intermediate_text: Option<String>,
    pub translated_text: String,

    /// Sum of vote values.
    pub rating: i64,

    /// Number of votes.
    pub count: i64,
}

const COLUMNS: &str = "id, user_id, timestamp, source, target, mode, original_text, original_text_hash, intermediate_text, translated_text, rating, count";

impl Translation {
    /// Up votes, derived from the vote sum and count.
    pub fn plus_ratings(&self) -> i64 {
        (self.count + self.rating) / 2
    }

    /// Down votes, derived from the vote sum and count.
    pub fn minus_ratings(&self) -> i64 {
        (self.count - self.rating) / 2
    }

    /// View row for a response with no votes.
    pub fn unrated(response: TranslationResponse, original_text: Option<String>) -> Self {
        Self {
            id: response.id,
            user_id: response.user_id,
            timestamp: response.timestamp,
            source: response.source,
            target: response.target,
            mode: response.mode,
            original_text,
            original_text_hash: response.original_text_hash,
            intermediate_text: response.intermediate_text,
            translated_text: response.translated_text,
            rating: 0,
            count: 0,
        }
    }

    pub async fn find_by_id(executor: impl PgExecutor<'_>, id: Uuid) -> Result<Option<Self>> {
        let translation = sqlx::query_as::<_, Translation>(&format!(
            "SELECT {COLUMNS} FROM translation WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await
        .context("failed to fetch translation")?;

        Ok(translation)
    }

    /// Human translations for a fingerprint and language pair, best rated first.
    pub async fn list_human(
        executor: impl PgExecutor<'_>,
        fingerprint: &str,
        source: &str,
        target: &str,
    ) -> Result<Vec<Self>> {
        let translations = sqlx::query_as::<_, Translation>(&format!(
            r#"
            SELECT {COLUMNS} FROM translation
            WHERE original_text_hash = $1 AND source = $2 AND target = $3 AND mode = $4
            ORDER BY rating DESC, timestamp ASC
            "#
        ))
        .bind(fingerprint)
        .bind(source)
        .bind(target)
        .bind(TranslationMode::Human)
        .fetch_all(executor)
        .await
        .context("failed to list human translations")?;

        Ok(translations)
    }
}
