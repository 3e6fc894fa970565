//! User model.
//!
//! Users are created by the OAuth login collaborator through [`User::upsert`];
//! this crate never authenticates anyone itself.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

/// User record.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub created: DateTime<Utc>,
    pub oauth_provider: String,

    /// Identifier at the OAuth provider. Unique.
    pub oauth_id: String,

    pub oauth_username: Option<String>,
    pub family_name: Option<String>,
    pub given_name: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub locale: Option<String>,
}

/// Profile data reported by an OAuth provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewUser {
    pub oauth_provider: String,
    pub oauth_id: String,
    pub oauth_username: Option<String>,
    pub family_name: Option<String>,
    pub given_name: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub locale: Option<String>,
}

const COLUMNS: &str = "id, created, oauth_provider, oauth_id, oauth_username, family_name, given_name, email, gender, locale";

impl User {
    /// Display name, `"{given} {family}"`.
    pub fn name(&self) -> String {
        let given = self.given_name.as_deref().unwrap_or("");
        let family = self.family_name.as_deref().unwrap_or("");
        format!("{given} {family}").trim().to_string()
    }

    /// Build a user record from provider profile data.
    pub fn from_new(input: NewUser) -> Self {
        Self {
            id: Uuid::now_v7(),
            created: Utc::now(),
            oauth_provider: input.oauth_provider,
            oauth_id: input.oauth_id,
            oauth_username: input.oauth_username,
            family_name: input.family_name,
            given_name: input.given_name,
            email: input.email,
            gender: input.gender,
            locale: input.locale,
        }
    }

    /// Find a user by ID.
    pub async fn find_by_id(executor: impl PgExecutor<'_>, id: Uuid) -> Result<Option<Self>> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await
            .context("failed to fetch user by id")?;

        Ok(user)
    }

    /// Insert a user, or refresh the profile of the user with the same
    /// OAuth id.
    pub async fn upsert(executor: impl PgExecutor<'_>, input: NewUser) -> Result<Self> {
        let fresh = Self::from_new(input);

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users
                (id, created, oauth_provider, oauth_id, oauth_username, family_name, given_name, email, gender, locale)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (oauth_id) DO UPDATE SET
                oauth_provider = EXCLUDED.oauth_provider,
                oauth_username = EXCLUDED.oauth_username,
                family_name = EXCLUDED.family_name,
                given_name = EXCLUDED.given_name,
                email = EXCLUDED.email,
                gender = EXCLUDED.gender,
                locale = EXCLUDED.locale
            RETURNING {COLUMNS}
            "#
        ))
        .bind(fresh.id)
        .bind(fresh.created)
        .bind(&fresh.oauth_provider)
        .bind(&fresh.oauth_id)
        .bind(&fresh.oauth_username)
        .bind(&fresh.family_name)
        .bind(&fresh.given_name)
        .bind(&fresh.email)
        .bind(&fresh.gender)
        .bind(&fresh.locale)
        .fetch_one(executor)
        .await
        .context("failed to upsert user")?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(given: Option<&str>, family: Option<&str>) -> User {
        User::from_new(NewUser {
            oauth_provider: "google".into(),
            oauth_id: "1234".into(),
            given_name: given.map(str::to_string),
            family_name: family.map(str::to_string),
            ..Default::default()
        })
    }

    #[test]
    fn display_name_joins_given_and_family() {
        assert_eq!(user(Some("Ada"), Some("Lovelace")).name(), "Ada Lovelace");
        assert_eq!(user(Some("Ada"), None).name(), "Ada");
        assert_eq!(user(None, None).name(), "");
    }
}
