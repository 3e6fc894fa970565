//! Translation response model.
//!
//! Unique on (user, source, target, mode, fingerprint). Machine responses
//! have no user and are shared by everyone; human responses are scoped to
//! the submitting user.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::fingerprint::Fingerprint;

/// How a response was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[repr(i16)]
pub enum TranslationMode {
    /// Machine translation, source to target.
    Direct = 1,
    /// Machine translation through the intermediate language.
    ViaIntermediate = 2,
    /// Submitted by a user.
    Human = 3,
}

impl TranslationMode {
    /// Mode for a wire value, if known.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Direct),
            2 => Some(Self::ViaIntermediate),
            3 => Some(Self::Human),
            _ => None,
        }
    }

    /// Wire value.
    pub fn code(self) -> i16 {
        self as i16
    }

    /// Whether responses in this mode come from the translation provider.
    pub fn is_machine(self) -> bool {
        matches!(self, Self::Direct | Self::ViaIntermediate)
    }
}

/// Translation response record.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct TranslationResponse {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    /// Submitting user (human responses only).
    pub user_id: Option<Uuid>,

    /// Creation time.
    pub timestamp: DateTime<Utc>,

    pub source: String,
    pub target: String,
    pub mode: TranslationMode,

    /// Hex fingerprint of the text this response answers.
    pub original_text_hash: String,

    /// Text in the intermediate language (mode 2 only).
    pub intermediate_text: Option<String>,

    pub translated_text: String,
}

const COLUMNS: &str = "id, user_id, timestamp, source, target, mode, original_text_hash, intermediate_text, translated_text";

impl TranslationResponse {
    /// Build a new, not yet persisted, machine response.
    pub fn machine(
        source: &str,
        target: &str,
        mode: TranslationMode,
        fingerprint: &Fingerprint,
        intermediate_text: Option<String>,
        translated_text: String,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id: None,
            timestamp: Utc::now(),
            source: source.to_string(),
            target: target.to_string(),
            mode,
            original_text_hash: fingerprint.to_hex(),
            intermediate_text,
            translated_text,
        }
    }

    /// Build a new, not yet persisted, human response.
    pub fn human(
        user_id: Uuid,
        source: &str,
        target: &str,
        original_text_hash: &str,
        translated_text: String,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id: Some(user_id),
            timestamp: Utc::now(),
            source: source.to_string(),
            target: target.to_string(),
            mode: TranslationMode::Human,
            original_text_hash: original_text_hash.to_string(),
            intermediate_text: None,
            translated_text,
        }
    }

    /// Find a response by ID.
    pub async fn find_by_id(executor: impl PgExecutor<'_>, id: Uuid) -> Result<Option<Self>> {
        let response = sqlx::query_as::<_, TranslationResponse>(&format!(
            "SELECT {COLUMNS} FROM translation_response WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await
        .context("failed to fetch translation response by id")?;

        Ok(response)
    }

    /// Find the cached response for a fingerprint, language pair and mode.
    pub async fn fetch(
        executor: impl PgExecutor<'_>,
        fingerprint: &str,
        source: &str,
        target: &str,
        mode: TranslationMode,
    ) -> Result<Option<Self>> {
        let response = sqlx::query_as::<_, TranslationResponse>(&format!(
            r#"
            SELECT {COLUMNS} FROM translation_response
            WHERE original_text_hash = $1 AND source = $2 AND target = $3 AND mode = $4
            ORDER BY timestamp ASC
            LIMIT 1
            "#
        ))
        .bind(fingerprint)
        .bind(source)
        .bind(target)
        .bind(mode)
        .fetch_optional(executor)
        .await
        .context("failed to fetch translation response")?;

        Ok(response)
    }

    /// Find a user's own human response for a fingerprint and language pair.
    pub async fn fetch_for_user(
        executor: impl PgExecutor<'_>,
        user_id: Uuid,
        fingerprint: &str,
        source: &str,
        target: &str,
    ) -> Result<Option<Self>> {
        let response = sqlx::query_as::<_, TranslationResponse>(&format!(
            r#"
            SELECT {COLUMNS} FROM translation_response
            WHERE user_id = $1 AND original_text_hash = $2 AND source = $3 AND target = $4 AND mode = $5
            "#
        ))
        .bind(user_id)
        .bind(fingerprint)
        .bind(source)
        .bind(target)
        .bind(TranslationMode::Human)
        .fetch_optional(executor)
        .await
        .context("failed to fetch user translation response")?;

        Ok(response)
    }

    /// Persist this response.
    ///
    /// Returns the raw sqlx error so callers can tell a uniqueness
    /// violation apart from other failures.
    pub async fn insert(&self, executor: impl PgExecutor<'_>) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO translation_response
                (id, user_id, timestamp, source, target, mode, original_text_hash, intermediate_text, translated_text)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(self.id)
        .bind(self.user_id)
        .bind(self.timestamp)
        .bind(&self.source)
        .bind(&self.target)
        .bind(self.mode)
        .bind(&self.original_text_hash)
        .bind(&self.intermediate_text)
        .bind(&self.translated_text)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Delete a response. Returns whether a row was removed.
    pub async fn delete(executor: impl PgExecutor<'_>, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM translation_response WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .context("failed to delete translation response")?;

        Ok(result.rows_affected() > 0)
    }
}
