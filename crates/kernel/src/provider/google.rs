//! Google Translate web endpoint.

use std::sync::LazyLock;

use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use super::{ProviderError, TranslationProvider};
use crate::config::Config;

const REFERER: &str = "http://translate.google.com";

#[allow(clippy::expect_used)]
static BROWSER_UA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Mozilla/\d+\.\d+ \(").expect("user agent pattern is a valid regex")
});

/// Wrap a non-browser user agent so the provider accepts it.
pub fn normalize_user_agent(user_agent: &str) -> String {
    if BROWSER_UA.is_match(user_agent) {
        user_agent.to_string()
    } else {
        format!("Mozilla/5.0 ({user_agent})")
    }
}

#[derive(Debug, Deserialize)]
struct Body {
    sentences: Option<Vec<Sentence>>,
    results: Option<Vec<Results>>,
}

#[derive(Debug, Deserialize)]
struct Results {
    sentences: Vec<Sentence>,
}

#[derive(Debug, Deserialize)]
struct Sentence {
    trans: Option<String>,
}

/// Extract the translated text from a provider response body.
///
/// Sentences come from `sentences`, or from `results[0].sentences` when the
/// former is absent. Their `trans` fields are joined with spaces and every
/// line of the result is trimmed. Entries without `trans` (transliteration
/// entries) are skipped.
pub fn parse_sentences(body: &str) -> Result<String, ProviderError> {
    let body: Body =
        serde_json::from_str(body).map_err(|e| ProviderError::Malformed(e.to_string()))?;

    let sentences = match (body.sentences, body.results) {
        (Some(sentences), _) => sentences,
        (None, Some(results)) => results
            .into_iter()
            .next()
            .map(|r| r.sentences)
            .ok_or_else(|| ProviderError::Malformed("empty results".to_string()))?,
        (None, None) => return Err(ProviderError::Malformed("no sentences".to_string())),
    };

    let joined = sentences
        .into_iter()
        .filter_map(|s| s.trans)
        .collect::<Vec<_>>()
        .join(" ");

    Ok(joined.split('\n').map(str::trim).collect::<Vec<_>>().join("\n"))
}

/// Provider calling the Google Translate web endpoint, optionally through a
/// proxy with the direct connection as fallback.
pub struct GoogleTranslateProvider {
    url: String,
    direct: Client,
    proxied: Option<Client>,
}

impl GoogleTranslateProvider {
    pub fn new(config: &Config) -> Result<Self> {
        let direct = Client::builder()
            .timeout(config.provider_timeout)
            .build()
            .context("failed to build translation HTTP client")?;

        let proxied = match &config.provider_proxy_url {
            Some(proxy_url) => {
                let proxy = reqwest::Proxy::all(proxy_url.as_str())
                    .context("invalid translation proxy URL")?;
                Some(
                    Client::builder()
                        .timeout(config.provider_timeout)
                        .proxy(proxy)
                        .build()
                        .context("failed to build proxied translation HTTP client")?,
                )
            }
            None => None,
        };

        Ok(Self {
            url: config.provider_url.clone(),
            direct,
            proxied,
        })
    }

    async fn send(
        &self,
        client: &Client,
        text: &str,
        source: &str,
        target: &str,
        user_agent: &str,
    ) -> Result<Response, reqwest::Error> {
        client
            .post(&self.url)
            .header(reqwest::header::REFERER, REFERER)
            .header(reqwest::header::USER_AGENT, user_agent)
            .form(&[
                ("client", "x"),
                ("sl", source),
                ("tl", target),
                ("text", text),
            ])
            .send()
            .await
    }
}

#[async_trait]
impl TranslationProvider for GoogleTranslateProvider {
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
        user_agent: &str,
    ) -> Result<String, ProviderError> {
        let user_agent = normalize_user_agent(user_agent);

        let response = match &self.proxied {
            Some(proxied) => match self.send(proxied, text, source, target, &user_agent).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(error = %e, "proxied translation request failed, retrying directly");
                    self.send(&self.direct, text, source, target, &user_agent)
                        .await?
                }
            },
            None => {
                self.send(&self.direct, text, source, target, &user_agent)
                    .await?
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let translated = parse_sentences(&body)?;
        debug!(source, target, "translation provider call succeeded");
        Ok(translated)
    }
}

impl std::fmt::Debug for GoogleTranslateProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleTranslateProvider")
            .field("url", &self.url)
            .field("proxied", &self.proxied.is_some())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn browser_user_agents_pass_through() {
        let ua = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";
        assert_eq!(normalize_user_agent(ua), ua);
    }

    #[test]
    fn other_user_agents_are_wrapped() {
        assert_eq!(normalize_user_agent("curl/8.4.0"), "Mozilla/5.0 (curl/8.4.0)");
        assert_eq!(normalize_user_agent("Mozilla/5.0"), "Mozilla/5.0 (Mozilla/5.0)");
        assert_eq!(normalize_user_agent(""), "Mozilla/5.0 ()");
    }

    #[test]
    fn joins_top_level_sentences() {
        let body = r#"{"sentences":[{"trans":"안녕하세요."},{"trans":"반갑습니다."}]}"#;
        assert_eq!(parse_sentences(body).unwrap(), "안녕하세요. 반갑습니다.");
    }

    #[test]
    fn falls_back_to_first_result() {
        let body = r#"{"results":[{"sentences":[{"trans":"こんにちは"}]},{"sentences":[{"trans":"x"}]}]}"#;
        assert_eq!(parse_sentences(body).unwrap(), "こんにちは");
    }

    #[test]
    fn trims_every_line() {
        let body = r#"{"sentences":[{"trans":"first line  \n"},{"trans":"  second line"}]}"#;
        assert_eq!(parse_sentences(body).unwrap(), "first line\nsecond line");
    }

    #[test]
    fn skips_transliteration_entries() {
        let body = r#"{"sentences":[{"trans":"Hallo"},{"translit":"halo"}]}"#;
        assert_eq!(parse_sentences(body).unwrap(), "Hallo");
    }

    #[test]
    fn rejects_unexpected_bodies() {
        assert!(matches!(parse_sentences("not json"), Err(ProviderError::Malformed(_))));
        assert!(matches!(parse_sentences("{}"), Err(ProviderError::Malformed(_))));
        assert!(matches!(
            parse_sentences(r#"{"results":[]}"#),
            Err(ProviderError::Malformed(_))
        ));
    }
}
