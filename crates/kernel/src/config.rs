//! Configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::languages;

/// Browser user agent sent upstream when the client supplied none.
const FALLBACK_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_8_2) AppleWebKit/537.22 (KHTML, like Gecko) Chrome/25.0.1364.99 Safari/537.22";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Redis connection URL for sessions.
    pub redis_url: String,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// CORS allowed origins (comma-separated, default: "*").
    pub cors_allowed_origins: Vec<String>,

    /// Cookie SameSite policy: "strict", "lax", or "none" (default: "lax").
    pub cookie_same_site: String,

    /// Translation provider endpoint.
    pub provider_url: String,

    /// Optional outbound proxy for provider calls. Direct calls are the fallback.
    pub provider_proxy_url: Option<String>,

    /// Provider request timeout (default: 2 seconds).
    pub provider_timeout: Duration,

    /// Pivot language for mode 2 translations (default: "ja").
    pub intermediate_language: String,

    /// User agent used when a request does not carry one.
    pub default_user_agent: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL environment variable is required")?;

        let redis_url =
            env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| split_list(&v))
            .unwrap_or_else(|_| vec!["*".to_string()]);

        let cookie_same_site = env::var("COOKIE_SAME_SITE")
            .unwrap_or_else(|_| "lax".to_string())
            .to_lowercase();

        let provider_url = env::var("TRANSLATE_PROVIDER_URL")
            .unwrap_or_else(|_| "http://translate.google.com/translate_a/t".to_string());
        url::Url::parse(&provider_url).context("TRANSLATE_PROVIDER_URL must be a valid URL")?;

        let provider_proxy_url = env::var("TRANSLATE_PROXY_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());

        let timeout_secs: u64 = env::var("TRANSLATE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "2".to_string())
            .parse()
            .context("TRANSLATE_TIMEOUT_SECS must be a valid u64")?;

        let intermediate_language =
            env::var("INTERMEDIATE_LANGUAGE").unwrap_or_else(|_| "ja".to_string());
        if !languages::is_supported(&intermediate_language) {
            anyhow::bail!("INTERMEDIATE_LANGUAGE '{intermediate_language}' is not a supported language");
        }

        let default_user_agent =
            env::var("DEFAULT_USER_AGENT").unwrap_or_else(|_| FALLBACK_USER_AGENT.to_string());

        Ok(Self {
            port,
            database_url,
            redis_url,
            database_max_connections,
            cors_allowed_origins,
            cookie_same_site,
            provider_url,
            provider_proxy_url,
            provider_timeout: Duration::from_secs(timeout_secs),
            intermediate_language,
            default_user_agent,
        })
    }

    /// Configuration for running without external services.
    ///
    /// Used by the in-memory state in tests; the database and Redis URLs are
    /// never dialed.
    pub fn for_memory() -> Self {
        Self {
            port: 0,
            database_url: String::new(),
            redis_url: String::new(),
            database_max_connections: 1,
            cors_allowed_origins: vec!["*".to_string()],
            cookie_same_site: "lax".to_string(),
            provider_url: "http://translate.google.com/translate_a/t".to_string(),
            provider_proxy_url: None,
            provider_timeout: Duration::from_secs(2),
            intermediate_language: "ja".to_string(),
            default_user_agent: FALLBACK_USER_AGENT.to_string(),
        }
    }
}

/// Split a comma-separated list, dropping empty entries.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
