//! Storage seam for the translation cache, submissions, ratings and users.
//!
//! [`PgTranslationStore`] is the production backend. [`MemoryTranslationStore`]
//! keeps everything in process and enforces the same uniqueness rules; tests
//! and database-less local runs use it.

mod memory;
mod pg;
#[cfg(test)]
pub(crate) mod racing;

pub use memory::MemoryTranslationStore;
pub use pg::PgTranslationStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{
    NewUser, Rating, RatingSummary, RatingValue, Translation, TranslationAccessLog,
    TranslationMode, TranslationRequest, TranslationResponse, User,
};

/// Storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("uniqueness constraint violated")]
    Conflict,

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Rows written by one translate call, committed as a single unit.
#[derive(Debug, Clone)]
pub struct TranslationBatch {
    /// New request, when none existed for the fingerprint and language pair.
    pub request: Option<TranslationRequest>,

    /// New response, on a cache miss.
    pub response: Option<TranslationResponse>,

    pub access_log: TranslationAccessLog,
}

/// Persistence operations used by the services.
#[async_trait]
pub trait TranslationStore: Send + Sync {
    /// Oldest request for a fingerprint and language pair.
    async fn fetch_request(
        &self,
        fingerprint: &str,
        source: &str,
        target: &str,
    ) -> StoreResult<Option<TranslationRequest>>;

    /// Cached response for a fingerprint, language pair and mode.
    ///
    /// For [`TranslationMode::Human`] any user's response matches.
    async fn fetch_response(
        &self,
        fingerprint: &str,
        source: &str,
        target: &str,
        mode: TranslationMode,
    ) -> StoreResult<Option<TranslationResponse>>;

    /// A user's own human response.
    async fn fetch_user_response(
        &self,
        user_id: Uuid,
        fingerprint: &str,
        source: &str,
        target: &str,
    ) -> StoreResult<Option<TranslationResponse>>;

    async fn find_response(&self, id: Uuid) -> StoreResult<Option<TranslationResponse>>;

    /// Insert a response on its own. Fails with [`StoreError::Conflict`] when
    /// the (user, source, target, mode, fingerprint) key is taken.
    async fn insert_response(&self, response: &TranslationResponse) -> StoreResult<()>;

    /// Delete a response and its votes. Returns whether it existed.
    async fn delete_response(&self, id: Uuid) -> StoreResult<bool>;

    async fn find_translation(&self, id: Uuid) -> StoreResult<Option<Translation>>;

    /// Human translations for a fingerprint and language pair, best rated first.
    async fn list_human_translations(
        &self,
        fingerprint: &str,
        source: &str,
        target: &str,
    ) -> StoreResult<Vec<Translation>>;

    async fn find_rating(&self, translation_id: Uuid, user_id: Uuid)
    -> StoreResult<Option<Rating>>;

    /// Fails with [`StoreError::Conflict`] when the user already voted.
    async fn insert_rating(&self, rating: &Rating) -> StoreResult<()>;

    async fn update_rating(
        &self,
        id: Uuid,
        value: RatingValue,
        timestamp: DateTime<Utc>,
    ) -> StoreResult<Option<Rating>>;

    async fn rating_summary(&self, translation_id: Uuid) -> StoreResult<RatingSummary>;

    async fn upsert_user(&self, input: NewUser) -> StoreResult<User>;

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Write every row of `batch` or none of them.
    async fn commit(&self, batch: TranslationBatch) -> StoreResult<()>;

    /// Whether the backend is reachable.
    async fn health(&self) -> bool;
}
