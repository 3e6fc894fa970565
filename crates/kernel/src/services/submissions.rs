//! Human-submitted translations.
//!
//! A submission answers the same fingerprint and language pair as an
//! existing translation and is scoped to the submitting user: each user
//! can hold one submission per text and language pair.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Translation, TranslationMode, TranslationResponse};
use crate::store::{StoreError, TranslationStore};

/// A human translation, optionally with its author's display name.
#[derive(Debug, Clone, PartialEq)]
pub struct Alternative {
    pub translation: Translation,
    pub author: Option<String>,
}

/// Submission, lookup and removal of human translations.
#[derive(Clone)]
pub struct SubmissionService {
    store: Arc<dyn TranslationStore>,
}

impl SubmissionService {
    pub fn new(store: Arc<dyn TranslationStore>) -> Self {
        Self { store }
    }

    async fn base(&self, translation_id: Uuid) -> AppResult<TranslationResponse> {
        self.store
            .find_response(translation_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Submit `user_id`'s translation of the text behind `translation_id`.
    pub async fn submit(
        &self,
        translation_id: Uuid,
        user_id: Uuid,
        text: &str,
    ) -> AppResult<TranslationResponse> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::InvalidInput(
                "please provide a non-empty translation".to_string(),
            ));
        }

        let base = self.base(translation_id).await?;
        let response = TranslationResponse::human(
            user_id,
            &base.source,
            &base.target,
            &base.original_text_hash,
            text.to_string(),
        );

        match self.store.insert_response(&response).await {
            Ok(()) => {}
            Err(StoreError::Conflict) => {
                return Err(AppError::InvalidInput(
                    "a translation was already submitted".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        }

        info!(
            response_id = %response.id,
            user_id = %user_id,
            source = %response.source,
            target = %response.target,
            "human translation submitted"
        );
        Ok(response)
    }

    /// The caller's own submission for the text behind `translation_id`.
    pub async fn own(&self, translation_id: Uuid, user_id: Uuid) -> AppResult<TranslationResponse> {
        let base = self.base(translation_id).await?;
        self.store
            .fetch_user_response(user_id, &base.original_text_hash, &base.source, &base.target)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Delete a human response owned by `user_id`.
    pub async fn remove(&self, response_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let response = self.base(response_id).await?;
        if response.mode != TranslationMode::Human || response.user_id != Some(user_id) {
            return Err(AppError::Forbidden);
        }

        if !self.store.delete_response(response_id).await? {
            return Err(AppError::NotFound);
        }

        info!(response_id = %response_id, user_id = %user_id, "human translation removed");
        Ok(())
    }

    /// Human translations of the text behind `translation_id`, best rated
    /// first.
    pub async fn alternatives(
        &self,
        translation_id: Uuid,
        include_author: bool,
    ) -> AppResult<Vec<Alternative>> {
        let base = self.base(translation_id).await?;
        let translations = self
            .store
            .list_human_translations(&base.original_text_hash, &base.source, &base.target)
            .await?;

        let mut alternatives = Vec::with_capacity(translations.len());
        for translation in translations {
            let author = match (include_author, translation.user_id) {
                (true, Some(user_id)) => self.store.find_user(user_id).await?.map(|u| u.name()),
                _ => None,
            };
            alternatives.push(Alternative {
                translation,
                author,
            });
        }
        Ok(alternatives)
    }
}

impl std::fmt::Debug for SubmissionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionService").finish()
    }
}
