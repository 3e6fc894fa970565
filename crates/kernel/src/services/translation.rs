//! Translation orchestration.
//!
//! A translate call looks up (or creates) the request and response rows for
//! the text's fingerprint, asks the provider only on a cache miss, and
//! commits everything it created together with the access log entry.
//!
//! Concurrent identical calls may both miss and both ask the provider; the
//! response uniqueness constraint then rejects the second commit, which is
//! logged like any other commit failure while the caller still gets its
//! translation.

use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use super::RequestContext;
use super::access_log;
use crate::compact_id::CompactId;
use crate::error::{AppError, AppResult};
use crate::fingerprint::Fingerprint;
use crate::languages;
use crate::metrics::Metrics;
use crate::models::{Translation, TranslationMode, TranslationRequest, TranslationResponse};
use crate::provider::TranslationProvider;
use crate::store::{TranslationBatch, TranslationStore};

/// Parameters of a translate call, as submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateParams {
    pub text: String,

    /// Raw mode code; validated by [`TranslationService::translate`].
    pub mode: i64,

    pub source: String,
    pub target: String,
}

/// Result of a translate call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateOutcome {
    /// Resolved response. `None` for same-language calls.
    pub id: Option<CompactId>,

    pub intermediate_text: Option<String>,
    pub translated_text: String,
}

/// Coordinates the cache, the provider and the access log.
#[derive(Clone)]
pub struct TranslationService {
    store: Arc<dyn TranslationStore>,
    provider: Arc<dyn TranslationProvider>,
    metrics: Arc<Metrics>,
    intermediate_language: String,
}

impl TranslationService {
    pub fn new(
        store: Arc<dyn TranslationStore>,
        provider: Arc<dyn TranslationProvider>,
        metrics: Arc<Metrics>,
        intermediate_language: impl Into<String>,
    ) -> Self {
        Self {
            store,
            provider,
            metrics,
            intermediate_language: intermediate_language.into(),
        }
    }

    /// Translate `params.text`, serving from the cache when possible.
    ///
    /// A failed commit is logged and counted but does not fail the call.
    pub async fn translate(
        &self,
        params: &TranslateParams,
        context: &RequestContext,
    ) -> AppResult<TranslateOutcome> {
        let source = params.source.as_str();
        let target = params.target.as_str();

        if source == target {
            self.metrics.translations.inc();
            return Ok(TranslateOutcome {
                id: None,
                intermediate_text: None,
                translated_text: params.text.clone(),
            });
        }

        for code in [source, target] {
            if !languages::is_supported(code) {
                return Err(AppError::InvalidLanguage(code.to_string()));
            }
        }

        let mode = TranslationMode::from_code(params.mode)
            .filter(|m| m.is_machine())
            .ok_or(AppError::InvalidMode)?;

        let fingerprint = Fingerprint::of(&params.text);
        let hash = fingerprint.to_hex();

        let mut access = access_log::record(context);

        let new_request = match self.store.fetch_request(&hash, source, target).await? {
            Some(_) => None,
            None => Some(TranslationRequest::new(
                source,
                target,
                &params.text,
                &fingerprint,
            )),
        };

        let (response, new_response) =
            match self.store.fetch_response(&hash, source, target, mode).await? {
                Some(cached) => {
                    self.metrics.cache_hits.inc();
                    (cached, None)
                }
                None => {
                    self.metrics.cache_misses.inc();
                    let fresh = self
                        .machine_translate(&params.text, source, target, mode, &fingerprint, context)
                        .await?;
                    access.mark_created();
                    (fresh.clone(), Some(fresh))
                }
            };

        access.resolve(response.id);
        let created = new_response.is_some();

        let batch = TranslationBatch {
            request: new_request,
            response: new_response,
            access_log: access.finish(),
        };
        if let Err(e) = self.store.commit(batch).await {
            self.metrics.persistence_failures.inc();
            error!(
                error = %e,
                response_id = %response.id,
                fingerprint = %hash,
                "failed to commit translation, rolled back"
            );
        }

        self.metrics.translations.inc();
        info!(
            source,
            target,
            mode = mode.code(),
            fingerprint = %hash,
            response_id = %response.id,
            created,
            "translation served"
        );

        Ok(TranslateOutcome {
            id: Some(CompactId::from(response.id)),
            intermediate_text: response.intermediate_text,
            translated_text: response.translated_text,
        })
    }

    /// Look up a translation with its original text and vote counts.
    pub async fn find(&self, id: Uuid) -> AppResult<Translation> {
        self.store
            .find_translation(id)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Produce a new, not yet persisted, machine response.
    async fn machine_translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
        mode: TranslationMode,
        fingerprint: &Fingerprint,
        context: &RequestContext,
    ) -> AppResult<TranslationResponse> {
        let ua = context.user_agent.as_str();

        let (intermediate, translated) = match mode {
            TranslationMode::Direct => (None, self.call_provider(text, source, target, ua).await?),
            TranslationMode::ViaIntermediate => {
                let pivot = self.intermediate_language.as_str();
                let intermediate = self.call_provider(text, source, pivot, ua).await?;
                let translated = self.call_provider(&intermediate, pivot, target, ua).await?;
                (Some(intermediate), translated)
            }
            TranslationMode::Human => return Err(AppError::InvalidMode),
        };

        Ok(TranslationResponse::machine(
            source,
            target,
            mode,
            fingerprint,
            intermediate,
            translated,
        ))
    }

    async fn call_provider(
        &self,
        text: &str,
        source: &str,
        target: &str,
        user_agent: &str,
    ) -> AppResult<String> {
        // A hop into its own language, such as mode 2 touching the pivot
        if source == target {
            return Ok(text.to_string());
        }

        self.metrics.provider_calls.inc();
        self.provider
            .translate(text, source, target, user_agent)
            .await
            .map_err(|e| {
                self.metrics.provider_failures.inc();
                warn!(error = %e, source, target, "translation provider call failed");
                AppError::Provider(e)
            })
    }
}

impl std::fmt::Debug for TranslationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationService")
            .field("intermediate_language", &self.intermediate_language)
            .finish()
    }
}
