//! Outbound machine translation.

mod google;

pub use google::{GoogleTranslateProvider, normalize_user_agent, parse_sentences};

use async_trait::async_trait;

/// Translation provider failures.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider answered with a status other than 200.
    #[error("translation provider returned HTTP {0}")]
    Status(u16),

    #[error("translation provider request failed")]
    Request(#[from] reqwest::Error),

    #[error("malformed translation provider response: {0}")]
    Malformed(String),
}

impl ProviderError {
    /// HTTP status reported by the provider, if it answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status(status) => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            Self::Malformed(_) => None,
        }
    }
}

/// A machine translation backend.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Translate `text` from `source` to `target` on behalf of a client
    /// with the given user agent.
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
        user_agent: &str,
    ) -> Result<String, ProviderError>;
}
