//! Prometheus metrics collection.
//!
//! Provides application metrics in Prometheus format.

use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::registry::Registry;

/// Application metrics.
pub struct Metrics {
    registry: Registry,

    /// Translations returned to callers, including same-language echoes.
    pub translations: Counter,

    /// Translate calls answered from a stored response.
    pub cache_hits: Counter,

    /// Translate calls that had to ask the provider.
    pub cache_misses: Counter,

    /// Requests sent to the translation provider.
    pub provider_calls: Counter,

    /// Failed provider requests.
    pub provider_failures: Counter,

    /// Translation batches that failed to commit.
    pub persistence_failures: Counter,

    /// Votes cast or changed.
    pub votes: Counter,
}

impl Metrics {
    /// Create a new metrics registry.
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let translations = Counter::default();
        registry.register(
            "translations",
            "Translations served",
            translations.clone(),
        );

        let cache_hits = Counter::default();
        registry.register("cache_hits", "Cache hit count", cache_hits.clone());

        let cache_misses = Counter::default();
        registry.register(
            "cache_misses",
            "Cache miss count",
            cache_misses.clone(),
        );

        let provider_calls = Counter::default();
        registry.register(
            "provider_calls",
            "Translation provider requests",
            provider_calls.clone(),
        );

        let provider_failures = Counter::default();
        registry.register(
            "provider_failures",
            "Failed translation provider requests",
            provider_failures.clone(),
        );

        let persistence_failures = Counter::default();
        registry.register(
            "persistence_failures",
            "Translation batches that failed to commit",
            persistence_failures.clone(),
        );

        let votes = Counter::default();
        registry.register("votes", "Votes cast", votes.clone());

        Self {
            registry,
            translations,
            cache_hits,
            cache_misses,
            provider_calls,
            provider_failures,
            persistence_failures,
            votes,
        }
    }

    /// Encode metrics in Prometheus text format.
    ///
    /// Counters get the `_total` suffix from the encoder.
    ///
    /// # Panics
    ///
    /// Panics if encoding to a `String` buffer fails, which the `fmt::Write`
    /// impl for `String` never does.
    pub fn encode(&self) -> String {
        let mut buffer = String::new();
        // Prometheus encoding to String buffer is infallible
        #[allow(clippy::expect_used)]
        encode(&mut buffer, &self.registry).expect("encoding metrics");
        buffer
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish()
    }
}
