//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::db;
use crate::metrics::Metrics;
use crate::provider::{GoogleTranslateProvider, TranslationProvider};
use crate::services::{RatingService, SubmissionService, TranslationService};
use crate::store::{PgTranslationStore, TranslationStore};

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,

    /// Storage backend.
    store: Arc<dyn TranslationStore>,

    /// Prometheus metrics.
    metrics: Arc<Metrics>,

    /// Translation orchestrator.
    translations: TranslationService,

    /// Vote casting and counting.
    ratings: RatingService,

    /// Human submissions.
    submissions: SubmissionService,
}

impl AppState {
    /// Create application state backed by PostgreSQL and the configured
    /// translation provider.
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = db::create_pool(config)
            .await
            .context("failed to create database pool")?;

        db::run_migrations(&pool)
            .await
            .context("failed to run migrations")?;
        info!("Database migrations applied");

        let provider = GoogleTranslateProvider::new(config)
            .context("failed to create translation provider")?;

        Ok(Self::from_parts(
            config.clone(),
            Arc::new(PgTranslationStore::new(pool)),
            Arc::new(provider),
        ))
    }

    /// Assemble state from an existing store and provider.
    pub fn from_parts(
        config: Config,
        store: Arc<dyn TranslationStore>,
        provider: Arc<dyn TranslationProvider>,
    ) -> Self {
        let metrics = Arc::new(Metrics::new());
        let translations = TranslationService::new(
            store.clone(),
            provider,
            metrics.clone(),
            config.intermediate_language.clone(),
        );
        let ratings = RatingService::new(store.clone(), metrics.clone());
        let submissions = SubmissionService::new(store.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                metrics,
                translations,
                ratings,
                submissions,
            }),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the storage backend.
    pub fn store(&self) -> &Arc<dyn TranslationStore> {
        &self.inner.store
    }

    /// Get the metrics.
    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.inner.metrics
    }

    /// Get the translation service.
    pub fn translations(&self) -> &TranslationService {
        &self.inner.translations
    }

    /// Get the rating service.
    pub fn ratings(&self) -> &RatingService {
        &self.inner.ratings
    }

    /// Get the submission service.
    pub fn submissions(&self) -> &SubmissionService {
        &self.inner.submissions
    }

    /// Check if the storage backend is healthy.
    pub async fn store_healthy(&self) -> bool {
        self.inner.store.health().await
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish()
    }
}
