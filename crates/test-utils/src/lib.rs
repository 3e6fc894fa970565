#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Translator test utilities.
//!
//! Stub translation providers and an in-memory [`TestApp`] that serves the
//! real kernel routes with a memory session store, so integration tests run
//! without PostgreSQL, Redis or network access.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::extract::Path;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use axum::routing::post;
use http_body_util::BodyExt;
use tower::ServiceExt;
use tower_sessions::{MemoryStore, Session, SessionManagerLayer};
use uuid::Uuid;

use translator_kernel::models::NewUser;
use translator_kernel::provider::{ProviderError, TranslationProvider};
use translator_kernel::session::SESSION_USER_ID;
use translator_kernel::store::{MemoryTranslationStore, TranslationStore};
use translator_kernel::{AppState, Config, routes};

/// Answers `"<target>:<text>"`.
#[derive(Debug, Default)]
pub struct EchoProvider {
    calls: AtomicUsize,
}

impl EchoProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of translate calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationProvider for EchoProvider {
    async fn translate(
        &self,
        text: &str,
        _source: &str,
        target: &str,
        _user_agent: &str,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{target}:{text}"))
    }
}

/// Answers the same text for every call.
#[derive(Debug)]
pub struct FixedProvider {
    text: String,
    calls: AtomicUsize,
}

impl FixedProvider {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationProvider for FixedProvider {
    async fn translate(
        &self,
        _text: &str,
        _source: &str,
        _target: &str,
        _user_agent: &str,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone())
    }
}

/// Fails every call with an HTTP status.
#[derive(Debug)]
pub struct FailingProvider {
    status: u16,
}

impl FailingProvider {
    pub fn new(status: u16) -> Self {
        Self { status }
    }
}

#[async_trait]
impl TranslationProvider for FailingProvider {
    async fn translate(
        &self,
        _text: &str,
        _source: &str,
        _target: &str,
        _user_agent: &str,
    ) -> Result<String, ProviderError> {
        Err(ProviderError::Status(self.status))
    }
}

/// Records the user agent of every call and answers like [`EchoProvider`].
#[derive(Debug, Default)]
pub struct RecordingProvider {
    user_agents: parking_lot::Mutex<Vec<String>>,
}

impl RecordingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_agents(&self) -> Vec<String> {
        self.user_agents.lock().clone()
    }
}

#[async_trait]
impl TranslationProvider for RecordingProvider {
    async fn translate(
        &self,
        text: &str,
        _source: &str,
        target: &str,
        user_agent: &str,
    ) -> Result<String, ProviderError> {
        self.user_agents.lock().push(user_agent.to_string());
        Ok(format!("{target}:{text}"))
    }
}

/// Test-only login: stores the path's user id in the session.
async fn test_login(session: Session, Path(id): Path<Uuid>) -> StatusCode {
    match session.insert(SESSION_USER_ID, id).await {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Kernel routes over an in-memory store.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub store: Arc<MemoryTranslationStore>,
}

impl TestApp {
    /// Build an app answering translations with `provider`.
    pub fn new(provider: Arc<dyn TranslationProvider>) -> Self {
        let store = Arc::new(MemoryTranslationStore::new());
        let state = AppState::from_parts(Config::for_memory(), store.clone(), provider);

        let session_layer = SessionManagerLayer::new(MemoryStore::default()).with_secure(false);

        let router = routes::router()
            .route("/__test/login/{id}", post(test_login))
            .layer(session_layer)
            .with_state(state.clone());

        Self {
            router,
            state,
            store,
        }
    }

    /// Build an app backed by an [`EchoProvider`].
    pub fn with_echo() -> (Self, Arc<EchoProvider>) {
        let provider = Arc::new(EchoProvider::new());
        (Self::new(provider.clone()), provider)
    }

    /// Send a request to the test application.
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }

    /// Send a request with cookies from a previous response.
    pub async fn request_with_cookies(&self, mut request: Request<Body>, cookies: &str) -> Response {
        if !cookies.is_empty() {
            request.headers_mut().insert(
                header::COOKIE,
                cookies.parse().expect("Invalid cookie header"),
            );
        }
        self.request(request).await
    }

    /// Create a user and log them in. Returns the user id and session cookies.
    pub async fn login(&self, given_name: &str) -> (Uuid, String) {
        let user = self
            .store
            .upsert_user(NewUser {
                oauth_provider: "test".to_string(),
                oauth_id: Uuid::now_v7().to_string(),
                given_name: Some(given_name.to_string()),
                family_name: Some("Tester".to_string()),
                ..Default::default()
            })
            .await
            .expect("Failed to create user");

        let response = self
            .request(
                Request::post(format!("/__test/login/{}", user.id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT, "test login failed");

        (user.id, session_cookies(&response))
    }

    /// POST a translate form to `/v1.0/translate`.
    pub async fn translate(&self, text: &str, mode: u8, source: &str, target: &str) -> Response {
        let mode = mode.to_string();
        self.request(form_post(
            "/v1.0/translate",
            &[
                ("t", text),
                ("m", mode.as_str()),
                ("sl", source),
                ("tl", target),
            ],
        ))
        .await
    }
}

/// Build a form-encoded POST request.
pub fn form_post(uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(encode_form(fields)))
        .unwrap()
}

/// Form-encode fields.
pub fn encode_form(fields: &[(&str, &str)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish()
}

/// Extract `name=value` pairs from a response's `Set-Cookie` headers.
pub fn session_cookies(response: &Response) -> String {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Read a response body as text.
pub async fn response_text(response: Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}

/// Read a response body as JSON.
pub async fn response_json(response: Response) -> serde_json::Value {
    let text = response_text(response).await;
    serde_json::from_str(&text).expect("Body is not JSON")
}
