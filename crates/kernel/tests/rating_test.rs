//! Rating endpoint tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::http::StatusCode;

use translator_kernel::models::RatingValue;
use translator_test_utils::{TestApp, form_post, response_json};

async fn seed(app: &TestApp) -> String {
    let body = response_json(app.translate("Thank you very much", 1, "en", "ja").await).await;
    body["id_b62"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn revote_replaces_previous_vote() {
    let (app, _provider) = TestApp::with_echo();
    let id = seed(&app).await;
    let (_user, cookies) = app.login("Min").await;
    let uri = format!("/v1.0/tr/{id}/rate");

    let first = app
        .request_with_cookies(form_post(&uri, &[("r", "1")]), &cookies)
        .await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = response_json(
        app.request_with_cookies(form_post(&uri, &[("r", "-1")]), &cookies)
            .await,
    )
    .await;
    assert_eq!(second["rating"], -1);
    assert_eq!(second["plus_ratings"], 0);
    assert_eq!(second["minus_ratings"], 1);

    let ratings = app.store.ratings();
    assert_eq!(ratings.len(), 1);
    assert_eq!(ratings[0].rating, RatingValue::Down);
}

#[tokio::test]
async fn aggregate_counts_distinct_voters() {
    let (app, _provider) = TestApp::with_echo();
    let id = seed(&app).await;
    let uri = format!("/v1.0/tr/{id}/rate");

    let mut last = serde_json::Value::Null;
    for (name, value) in [("A", "1"), ("B", "1"), ("C", "-1")] {
        let (_user, cookies) = app.login(name).await;
        last = response_json(
            app.request_with_cookies(form_post(&uri, &[("r", value)]), &cookies)
                .await,
        )
        .await;
    }

    assert_eq!(last["plus_ratings"], 2);
    assert_eq!(last["minus_ratings"], 1);
    assert_eq!(last["translation_id"], id.as_str());
}

#[tokio::test]
async fn invalid_values_are_rejected() {
    let (app, _provider) = TestApp::with_echo();
    let id = seed(&app).await;
    let (_user, cookies) = app.login("Min").await;
    let uri = format!("/v1.0/tr/{id}/rate");

    for value in ["2", "0", "up"] {
        let response = app
            .request_with_cookies(form_post(&uri, &[("r", value)]), &cookies)
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
    assert!(app.store.ratings().is_empty());
}

#[tokio::test]
async fn rating_requires_login_and_existing_response() {
    let (app, _provider) = TestApp::with_echo();
    let id = seed(&app).await;

    let response = app
        .request(form_post(&format!("/v1.0/tr/{id}/rate"), &[("r", "1")]))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (_user, cookies) = app.login("Min").await;
    let response = app
        .request_with_cookies(form_post("/v1.0/tr/1/rate", &[("r", "1")]), &cookies)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn votes_are_counted_in_metrics() {
    let (app, _provider) = TestApp::with_echo();
    let id = seed(&app).await;
    let (_user, cookies) = app.login("Min").await;

    app.request_with_cookies(form_post(&format!("/v1.0/tr/{id}/rate"), &[("r", "1")]), &cookies)
        .await;

    assert!(app.state.metrics().encode().contains("votes_total 1"));
}
