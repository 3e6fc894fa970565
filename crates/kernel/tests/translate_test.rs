//! Translate endpoint integration tests over the in-memory store.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;

use translator_kernel::models::AccessFlags;
use translator_test_utils::{
    FailingProvider, FixedProvider, RecordingProvider, TestApp, form_post, response_json,
    response_text,
};

#[tokio::test]
async fn direct_translation_creates_one_request_and_response() {
    let provider = Arc::new(FixedProvider::new("안녕"));
    let app = TestApp::new(provider.clone());

    let response = app.translate("Hello", 1, "en", "ko").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["translated_text"], "안녕");
    assert_eq!(body["intermediate_text"], Value::Null);
    assert!(body["id"].is_string());
    assert!(body["id_b62"].is_string());

    assert_eq!(app.store.requests().len(), 1);
    assert_eq!(app.store.responses().len(), 1);
    assert_eq!(app.store.requests()[0].original_text, "Hello");
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn intermediate_mode_goes_through_japanese() {
    let (app, provider) = TestApp::with_echo();

    let body = response_json(app.translate("Hello", 2, "en", "ko").await).await;

    assert_eq!(body["intermediate_text"], "ja:Hello");
    assert_eq!(body["translated_text"], "ko:ja:Hello");
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn repeated_translation_hits_cache() {
    let (app, provider) = TestApp::with_echo();

    let first = response_json(app.translate("Good morning", 1, "en", "ko").await).await;
    let second = response_json(app.translate("Good morning", 1, "en", "ko").await).await;

    assert_eq!(first, second);
    assert_eq!(provider.calls(), 1);

    let logs = app.store.access_logs();
    assert_eq!(logs.len(), 2);
    assert!(logs[0].flags().contains(AccessFlags::CREATED));
    assert!(!logs[1].flags().contains(AccessFlags::CREATED));
}

#[tokio::test]
async fn same_language_returns_text_without_ids() {
    let (app, provider) = TestApp::with_echo();

    let body = response_json(app.translate("  Bonjour  ", 1, "fr", "fr").await).await;

    assert_eq!(body["translated_text"], "Bonjour");
    assert_eq!(body["id"], Value::Null);
    assert_eq!(body["id_b62"], Value::Null);
    assert!(app.store.requests().is_empty());
    assert!(app.store.access_logs().is_empty());
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn unsupported_language_is_bad_request() {
    let (app, provider) = TestApp::with_echo();

    let response = app.translate("Hello", 1, "xx", "ko").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response_text(response).await.contains("xx"));

    assert!(app.store.access_logs().is_empty());
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn unknown_mode_is_bad_request() {
    let (app, _provider) = TestApp::with_echo();

    for mode in [0, 3, 9] {
        let response = app.translate("Hello", mode, "en", "ko").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let response = app
        .request(form_post(
            "/v1.0/translate",
            &[("t", "Hello"), ("m", "two"), ("sl", "en"), ("tl", "ko")],
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn provider_status_is_surfaced() {
    let app = TestApp::new(Arc::new(FailingProvider::new(503)));

    let response = app.translate("Hello", 1, "en", "ko").await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(app.store.responses().is_empty());
}

#[tokio::test]
async fn commit_failure_still_delivers_translation() {
    let (app, _provider) = TestApp::with_echo();
    app.store.fail_commits(true);

    let response = app.translate("Hello", 1, "en", "ko").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["translated_text"], "ko:Hello");
    assert!(app.store.responses().is_empty());

    let metrics = app.state.metrics().encode();
    assert!(metrics.contains("persistence_failures_total 1"));
}

#[tokio::test]
async fn deprecated_endpoints_return_plain_text() {
    let (app, _provider) = TestApp::with_echo();

    for uri in ["/translate", "/v0.9/translate"] {
        let response = app
            .request(form_post(
                uri,
                &[("t", "Hello"), ("m", "1"), ("sl", "en"), ("tl", "de")],
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response_text(response).await, "de:Hello");
    }
}

#[tokio::test]
async fn caller_details_are_logged_and_forwarded() {
    let provider = Arc::new(RecordingProvider::new());
    let app = TestApp::new(provider.clone());

    let request = Request::post("/v1.0/translate")
        .header("content-type", "application/x-www-form-urlencoded")
        .header("user-agent", "curl/8.4.0")
        .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
        .body(Body::from("t=Hello&m=1&sl=en&tl=ko"))
        .unwrap();
    let response = app.request(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let logs = app.store.access_logs();
    assert_eq!(logs[0].remote_address, "203.0.113.9");
    assert_eq!(logs[0].user_agent, "curl/8.4.0");
    assert_eq!(provider.user_agents(), vec!["curl/8.4.0".to_string()]);
}

#[tokio::test]
async fn logged_in_user_is_recorded_on_access_log() {
    let (app, _provider) = TestApp::with_echo();
    let (user_id, cookies) = app.login("Min").await;

    let response = app
        .request_with_cookies(
            form_post(
                "/v1.0/translate",
                &[("t", "Hello"), ("m", "1"), ("sl", "en"), ("tl", "ko")],
            ),
            &cookies,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(app.store.access_logs()[0].user_id, Some(user_id));
}
