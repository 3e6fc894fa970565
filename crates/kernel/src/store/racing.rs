//! Memory store wrapper that lets tests interleave a competing writer.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use super::{MemoryTranslationStore, StoreResult, TranslationBatch, TranslationStore};
use crate::models::{
    NewUser, Rating, RatingSummary, RatingValue, Translation, TranslationMode,
    TranslationRequest, TranslationResponse, User,
};

/// Delegates to a [`MemoryTranslationStore`], except where a race is staged.
pub struct RacingStore {
    inner: Arc<MemoryTranslationStore>,

    /// Next `find_rating` misses even when a vote exists.
    stale_rating_lookup: AtomicBool,

    /// Written by another caller right after the next `fetch_response` misses.
    competing_response: Mutex<Option<TranslationResponse>>,
}

impl RacingStore {
    pub fn new(inner: Arc<MemoryTranslationStore>) -> Self {
        Self {
            inner,
            stale_rating_lookup: AtomicBool::new(false),
            competing_response: Mutex::new(None),
        }
    }

    pub fn miss_next_rating_lookup(&self) {
        self.stale_rating_lookup.store(true, Ordering::SeqCst);
    }

    pub fn race_next_miss_with(&self, response: TranslationResponse) {
        *self.competing_response.lock() = Some(response);
    }
}

#[async_trait]
impl TranslationStore for RacingStore {
    async fn fetch_request(
        &self,
        fingerprint: &str,
        source: &str,
        target: &str,
    ) -> StoreResult<Option<TranslationRequest>> {
        self.inner.fetch_request(fingerprint, source, target).await
    }

    async fn fetch_response(
        &self,
        fingerprint: &str,
        source: &str,
        target: &str,
        mode: TranslationMode,
    ) -> StoreResult<Option<TranslationResponse>> {
        let found = self
            .inner
            .fetch_response(fingerprint, source, target, mode)
            .await?;
        if found.is_none() {
            let competing = self.competing_response.lock().take();
            if let Some(competing) = competing {
                self.inner.insert_response(&competing).await?;
            }
        }
        Ok(found)
    }

    async fn fetch_user_response(
        &self,
        user_id: Uuid,
        fingerprint: &str,
        source: &str,
        target: &str,
    ) -> StoreResult<Option<TranslationResponse>> {
        self.inner
            .fetch_user_response(user_id, fingerprint, source, target)
            .await
    }

    async fn find_response(&self, id: Uuid) -> StoreResult<Option<TranslationResponse>> {
        self.inner.find_response(id).await
    }

    async fn insert_response(&self, response: &TranslationResponse) -> StoreResult<()> {
        self.inner.insert_response(response).await
    }

    async fn delete_response(&self, id: Uuid) -> StoreResult<bool> {
        self.inner.delete_response(id).await
    }

    async fn find_translation(&self, id: Uuid) -> StoreResult<Option<Translation>> {
        self.inner.find_translation(id).await
    }

    async fn list_human_translations(
        &self,
        fingerprint: &str,
        source: &str,
        target: &str,
    ) -> StoreResult<Vec<Translation>> {
        self.inner
            .list_human_translations(fingerprint, source, target)
            .await
    }

    async fn find_rating(
        &self,
        translation_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<Rating>> {
        if self.stale_rating_lookup.swap(false, Ordering::SeqCst) {
            return Ok(None);
        }
        self.inner.find_rating(translation_id, user_id).await
    }

    async fn insert_rating(&self, rating: &Rating) -> StoreResult<()> {
        self.inner.insert_rating(rating).await
    }

    async fn update_rating(
        &self,
        id: Uuid,
        value: RatingValue,
        timestamp: DateTime<Utc>,
    ) -> StoreResult<Option<Rating>> {
        self.inner.update_rating(id, value, timestamp).await
    }

    async fn rating_summary(&self, translation_id: Uuid) -> StoreResult<RatingSummary> {
        self.inner.rating_summary(translation_id).await
    }

    async fn upsert_user(&self, input: NewUser) -> StoreResult<User> {
        self.inner.upsert_user(input).await
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        self.inner.find_user(id).await
    }

    async fn commit(&self, batch: TranslationBatch) -> StoreResult<()> {
        self.inner.commit(batch).await
    }

    async fn health(&self) -> bool {
        self.inner.health().await
    }
}
