//! PostgreSQL store.

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{StoreError, StoreResult, TranslationBatch, TranslationStore};
use crate::db;
use crate::models::{
    NewUser, Rating, RatingSummary, RatingValue, Translation, TranslationMode,
    TranslationRequest, TranslationResponse, User,
};

/// Store backed by a sqlx connection pool.
#[derive(Clone)]
pub struct PgTranslationStore {
    pool: PgPool,
}

impl PgTranslationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|e| e.is_unique_violation())
}

/// Turn a failed insert into [`StoreError::Conflict`] or a backend error.
fn insert_error(err: sqlx::Error, what: &'static str) -> StoreError {
    if is_unique_violation(&err) {
        StoreError::Conflict
    } else {
        StoreError::Backend(anyhow::Error::new(err).context(what))
    }
}

async fn write_batch(conn: &mut PgConnection, batch: &TranslationBatch) -> StoreResult<()> {
    if let Some(request) = &batch.request {
        request.insert(&mut *conn).await?;
    }
    if let Some(response) = &batch.response {
        response
            .insert(&mut *conn)
            .await
            .map_err(|e| insert_error(e, "failed to insert translation response"))?;
    }
    batch.access_log.insert(&mut *conn).await?;
    Ok(())
}

#[async_trait]
impl TranslationStore for PgTranslationStore {
    async fn fetch_request(
        &self,
        fingerprint: &str,
        source: &str,
        target: &str,
    ) -> StoreResult<Option<TranslationRequest>> {
        Ok(TranslationRequest::fetch(&self.pool, fingerprint, source, target).await?)
    }

    async fn fetch_response(
        &self,
        fingerprint: &str,
        source: &str,
        target: &str,
        mode: TranslationMode,
    ) -> StoreResult<Option<TranslationResponse>> {
        Ok(TranslationResponse::fetch(&self.pool, fingerprint, source, target, mode).await?)
    }

    async fn fetch_user_response(
        &self,
        user_id: Uuid,
        fingerprint: &str,
        source: &str,
        target: &str,
    ) -> StoreResult<Option<TranslationResponse>> {
        Ok(
            TranslationResponse::fetch_for_user(&self.pool, user_id, fingerprint, source, target)
                .await?,
        )
    }

    async fn find_response(&self, id: Uuid) -> StoreResult<Option<TranslationResponse>> {
        Ok(TranslationResponse::find_by_id(&self.pool, id).await?)
    }

    async fn insert_response(&self, response: &TranslationResponse) -> StoreResult<()> {
        response
            .insert(&self.pool)
            .await
            .map_err(|e| insert_error(e, "failed to insert translation response"))
    }

    async fn delete_response(&self, id: Uuid) -> StoreResult<bool> {
        Ok(TranslationResponse::delete(&self.pool, id).await?)
    }

    async fn find_translation(&self, id: Uuid) -> StoreResult<Option<Translation>> {
        Ok(Translation::find_by_id(&self.pool, id).await?)
    }

    async fn list_human_translations(
        &self,
        fingerprint: &str,
        source: &str,
        target: &str,
    ) -> StoreResult<Vec<Translation>> {
        Ok(Translation::list_human(&self.pool, fingerprint, source, target).await?)
    }

    async fn find_rating(
        &self,
        translation_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<Rating>> {
        Ok(Rating::find(&self.pool, translation_id, user_id).await?)
    }

    async fn insert_rating(&self, rating: &Rating) -> StoreResult<()> {
        rating
            .insert(&self.pool)
            .await
            .map_err(|e| insert_error(e, "failed to insert rating"))
    }

    async fn update_rating(
        &self,
        id: Uuid,
        value: RatingValue,
        timestamp: DateTime<Utc>,
    ) -> StoreResult<Option<Rating>> {
        Ok(Rating::update_value(&self.pool, id, value, timestamp).await?)
    }

    async fn rating_summary(&self, translation_id: Uuid) -> StoreResult<RatingSummary> {
        Ok(Rating::summary(&self.pool, translation_id).await?)
    }

    async fn upsert_user(&self, input: NewUser) -> StoreResult<User> {
        Ok(User::upsert(&self.pool, input).await?)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn commit(&self, batch: TranslationBatch) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to begin transaction")?;

        if let Err(e) = write_batch(&mut *tx, &batch).await {
            if let Err(rollback) = tx.rollback().await {
                warn!(error = %rollback, "failed to roll back translation batch");
            }
            return Err(e);
        }

        tx.commit()
            .await
            .context("failed to commit translation batch")?;

        debug!(
            access_log = %batch.access_log.id,
            request = batch.request.is_some(),
            response = batch.response.is_some(),
            "committed translation batch"
        );
        Ok(())
    }

    async fn health(&self) -> bool {
        db::check_health(&self.pool).await
    }
}

impl std::fmt::Debug for PgTranslationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgTranslationStore").finish()
    }
}
