//! Votes on translation responses.
//!
//! One vote per user per response. Voting again overwrites the earlier
//! value; a concurrent first vote is detected through the storage
//! uniqueness constraint and turned into an update.

use std::sync::Arc;

use anyhow::anyhow;
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::metrics::Metrics;
use crate::models::{Rating, RatingSummary, RatingValue};
use crate::store::{StoreError, TranslationStore};

/// A cast vote together with the refreshed counts.
#[derive(Debug, Clone, PartialEq)]
pub struct Vote {
    pub rating: Rating,
    pub summary: RatingSummary,
}

/// Vote casting and counting.
#[derive(Clone)]
pub struct RatingService {
    store: Arc<dyn TranslationStore>,
    metrics: Arc<Metrics>,
}

impl RatingService {
    pub fn new(store: Arc<dyn TranslationStore>, metrics: Arc<Metrics>) -> Self {
        Self { store, metrics }
    }

    /// Cast or change `user_id`'s vote on a response.
    ///
    /// `value` must be `1` or `-1`.
    pub async fn cast_vote(&self, response_id: Uuid, user_id: Uuid, value: i64) -> AppResult<Rating> {
        let value = RatingValue::from_int(value)
            .ok_or_else(|| AppError::InvalidInput("rating must be 1 or -1".to_string()))?;

        if self.store.find_response(response_id).await?.is_none() {
            return Err(AppError::NotFound);
        }

        let rating = match self.store.find_rating(response_id, user_id).await? {
            Some(existing) => self.overwrite(existing.id, value).await?,
            None => {
                let fresh = Rating::new(response_id, user_id, value);
                match self.store.insert_rating(&fresh).await {
                    Ok(()) => fresh,
                    Err(StoreError::Conflict) => {
                        let existing = self
                            .store
                            .find_rating(response_id, user_id)
                            .await?
                            .ok_or_else(|| anyhow!("vote missing after uniqueness conflict"))?;
                        self.overwrite(existing.id, value).await?
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        };

        self.metrics.votes.inc();
        debug!(
            response_id = %response_id,
            user_id = %user_id,
            rating = value.as_int(),
            "vote cast"
        );
        Ok(rating)
    }

    /// Up and down vote counts for a response.
    pub async fn aggregate(&self, response_id: Uuid) -> AppResult<RatingSummary> {
        Ok(self.store.rating_summary(response_id).await?)
    }

    /// Cast a vote and return it with the refreshed counts.
    pub async fn vote(&self, response_id: Uuid, user_id: Uuid, value: i64) -> AppResult<Vote> {
        let rating = self.cast_vote(response_id, user_id, value).await?;
        let summary = self.aggregate(response_id).await?;
        Ok(Vote { rating, summary })
    }

    async fn overwrite(&self, id: Uuid, value: RatingValue) -> AppResult<Rating> {
        self.store
            .update_rating(id, value, Utc::now())
            .await?
            .ok_or_else(|| AppError::Internal(anyhow!("vote {id} vanished during update")))
    }
}

impl std::fmt::Debug for RatingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RatingService").finish()
    }
}
