//! Translation access log: one append-only row per translate call.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Bit flags stored on an access log row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AccessFlags(i32);

impl AccessFlags {
    /// No bits set.
    pub const NONE: Self = Self(0);

    /// The access created a new translation response.
    pub const CREATED: Self = Self(1);

    pub const fn from_bits(bits: i32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> i32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Set the bits of `other`, keeping any already set.
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }
}

/// Access log record.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct TranslationAccessLog {
    pub id: Uuid,

    /// Response the access resolved to, once known.
    pub translation_id: Option<Uuid>,

    pub user_id: Option<Uuid>,

    pub timestamp: DateTime<Utc>,

    pub user_agent: String,

    pub remote_address: String,

    /// Raw [`AccessFlags`] bits.
    pub flag: i32,
}

impl TranslationAccessLog {
    /// Start a pending record. Nothing is written until the batch it
    /// belongs to is committed.
    pub fn new(user_id: Option<Uuid>, user_agent: &str, remote_address: &str) -> Self {
        Self {
            id: Uuid::now_v7(),
            translation_id: None,
            user_id,
            timestamp: Utc::now(),
            user_agent: user_agent.to_string(),
            remote_address: remote_address.to_string(),
            flag: AccessFlags::NONE.bits(),
        }
    }

    pub fn flags(&self) -> AccessFlags {
        AccessFlags::from_bits(self.flag)
    }

    /// OR `flags` into the stored bits.
    pub fn set_flags(&mut self, flags: AccessFlags) {
        let mut current = self.flags();
        current.insert(flags);
        self.flag = current.bits();
    }

    /// Record the response this access resolved to.
    pub fn attach(&mut self, translation_id: Uuid) {
        self.translation_id = Some(translation_id);
    }

    /// Persist this record.
    pub async fn insert(&self, executor: impl PgExecutor<'_>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO translation_access_log
                (id, translation_id, user_id, timestamp, user_agent, remote_address, flag)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(self.id)
        .bind(self.translation_id)
        .bind(self.user_id)
        .bind(self.timestamp)
        .bind(&self.user_agent)
        .bind(&self.remote_address)
        .bind(self.flag)
        .execute(executor)
        .await
        .context("failed to insert translation access log")?;

        Ok(())
    }
}
