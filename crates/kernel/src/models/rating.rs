//! Rating model: one up/down vote per user per translation response.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Vote value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[repr(i16)]
pub enum RatingValue {
    Up = 1,
    Down = -1,
}

impl RatingValue {
    /// Vote for a wire value. Only `1` and `-1` are votes.
    pub fn from_int(value: i64) -> Option<Self> {
        match value {
            1 => Some(Self::Up),
            -1 => Some(Self::Down),
            _ => None,
        }
    }

    /// Wire value.
    pub fn as_int(self) -> i16 {
        self as i16
    }
}

/// Rating record.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Rating {
    pub id: Uuid,

    /// Rated translation response.
    pub translation_id: Uuid,

    pub user_id: Uuid,

    /// Time of the latest vote.
    pub timestamp: DateTime<Utc>,

    pub rating: RatingValue,
}

/// Vote counts for one response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RatingSummary {
    pub positive: i64,
    pub negative: i64,
}

impl RatingSummary {
    /// Net score (up votes minus down votes).
    pub fn score(&self) -> i64 {
        self.positive - self.negative
    }

    /// Total votes.
    pub fn total(&self) -> i64 {
        self.positive + self.negative
    }
}

impl Rating {
    /// Build a new, not yet persisted, vote.
    pub fn new(translation_id: Uuid, user_id: Uuid, rating: RatingValue) -> Self {
        Self {
            id: Uuid::now_v7(),
            translation_id,
            user_id,
            timestamp: Utc::now(),
            rating,
        }
    }

    /// Find a user's vote on a response.
    pub async fn find(
        executor: impl PgExecutor<'_>,
        translation_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>> {
        let rating = sqlx::query_as::<_, Rating>(
            r#"
            SELECT id, translation_id, user_id, timestamp, rating
            FROM rating
            WHERE translation_id = $1 AND user_id = $2
            "#,
        )
        .bind(translation_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await
        .context("failed to fetch rating")?;

        Ok(rating)
    }

    /// Persist a new vote.
    ///
    /// Returns the raw sqlx error so a duplicate vote surfaces as a
    /// uniqueness violation.
    pub async fn insert(&self, executor: impl PgExecutor<'_>) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO rating (id, translation_id, user_id, timestamp, rating)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(self.id)
        .bind(self.translation_id)
        .bind(self.user_id)
        .bind(self.timestamp)
        .bind(self.rating)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Overwrite the value and timestamp of an existing vote.
    pub async fn update_value(
        executor: impl PgExecutor<'_>,
        id: Uuid,
        rating: RatingValue,
        timestamp: DateTime<Utc>,
    ) -> Result<Option<Self>> {
        let updated = sqlx::query_as::<_, Rating>(
            r#"
            UPDATE rating SET rating = $1, timestamp = $2
            WHERE id = $3
            RETURNING id, translation_id, user_id, timestamp, rating
            "#,
        )
        .bind(rating)
        .bind(timestamp)
        .bind(id)
        .fetch_optional(executor)
        .await
        .context("failed to update rating")?;

        Ok(updated)
    }

    /// Count up and down votes for a response.
    ///
    /// Computed on every call; nothing is materialized.
    pub async fn summary(
        executor: impl PgExecutor<'_>,
        translation_id: Uuid,
    ) -> Result<RatingSummary> {
        let (positive, negative): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE rating = 1),
                COUNT(*) FILTER (WHERE rating = -1)
            FROM rating
            WHERE translation_id = $1
            "#,
        )
        .bind(translation_id)
        .fetch_one(executor)
        .await
        .context("failed to count ratings")?;

        Ok(RatingSummary { positive, negative })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_plus_and_minus_one_are_votes() {
        assert_eq!(RatingValue::from_int(1), Some(RatingValue::Up));
        assert_eq!(RatingValue::from_int(-1), Some(RatingValue::Down));
        assert_eq!(RatingValue::from_int(0), None);
        assert_eq!(RatingValue::from_int(2), None);
        assert_eq!(RatingValue::from_int(-2), None);
        assert_eq!(RatingValue::Down.as_int(), -1);
    }

    #[test]
    fn summary_score_and_total() {
        let summary = RatingSummary {
            positive: 5,
            negative: 2,
        };
        assert_eq!(summary.score(), 3);
        assert_eq!(summary.total(), 7);
        assert_eq!(RatingSummary::default().score(), 0);
    }
}
