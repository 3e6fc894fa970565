//! Human submission and alternatives listing tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::body::Body;
use axum::http::{Request, StatusCode};

use translator_test_utils::{TestApp, form_post, response_json};

/// Translate a sentence and return its compact id.
async fn seed(app: &TestApp) -> String {
    let body = response_json(app.translate("Where is the station?", 1, "en", "ko").await).await;
    body["id_b62"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn lookup_returns_original_text_and_counts() {
    let (app, _provider) = TestApp::with_echo();
    let id = seed(&app).await;

    let response = app
        .request(Request::get(format!("/v1.0/tr/{id}")).body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["id_b62"], id.as_str());
    assert_eq!(body["original_text"], "Where is the station?");
    assert_eq!(body["translated_text"], "ko:Where is the station?");
    assert_eq!(body["mode"], 1);
    assert_eq!(body["plus_ratings"], 0);
    assert_eq!(body["minus_ratings"], 0);
}

#[tokio::test]
async fn lookup_of_unknown_or_malformed_id() {
    let (app, _provider) = TestApp::with_echo();

    let response = app
        .request(Request::get("/v1.0/tr/zzzz").body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .request(Request::get("/v1.0/tr/not-base62").body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn submission_requires_login() {
    let (app, _provider) = TestApp::with_echo();
    let id = seed(&app).await;

    let response = app
        .request(form_post(&format!("/v1.0/tr/{id}/response"), &[("text", "역이 어디예요?")]))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn submit_fetch_and_delete_own_response() {
    let (app, _provider) = TestApp::with_echo();
    let id = seed(&app).await;
    let (user_id, cookies) = app.login("Min").await;
    let uri = format!("/v1.0/tr/{id}/response");

    let response = app
        .request_with_cookies(form_post(&uri, &[("text", " 역이 어디예요? ")]), &cookies)
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let submitted = response_json(response).await;
    assert_eq!(submitted["translated_text"], "역이 어디예요?");
    assert_eq!(submitted["mode"], 3);

    let response = app
        .request_with_cookies(Request::get(&uri).body(Body::empty()).unwrap(), &cookies)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["id"], submitted["id"]);

    let own_id = submitted["id_b62"].as_str().unwrap();
    let response = app
        .request_with_cookies(
            Request::delete(format!("/v1.0/tr/{own_id}/response"))
                .body(Body::empty())
                .unwrap(),
            &cookies,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    assert!(
        app.store
            .responses()
            .iter()
            .all(|r| r.user_id != Some(user_id))
    );
}

#[tokio::test]
async fn empty_or_duplicate_submission_is_rejected() {
    let (app, _provider) = TestApp::with_echo();
    let id = seed(&app).await;
    let (_user_id, cookies) = app.login("Min").await;
    let uri = format!("/v1.0/tr/{id}/response");

    let response = app
        .request_with_cookies(form_post(&uri, &[("text", "   ")]), &cookies)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request_with_cookies(form_post(&uri, &[("text", "첫 번째")]), &cookies)
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .request_with_cookies(form_post(&uri, &[("text", "두 번째")]), &cookies)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn others_cannot_delete_a_response() {
    let (app, _provider) = TestApp::with_echo();
    let id = seed(&app).await;
    let (_owner, owner_cookies) = app.login("Owner").await;
    let (_other, other_cookies) = app.login("Other").await;

    let submitted = response_json(
        app.request_with_cookies(
            form_post(&format!("/v1.0/tr/{id}/response"), &[("text", "내 번역")]),
            &owner_cookies,
        )
        .await,
    )
    .await;
    let own_id = submitted["id_b62"].as_str().unwrap();

    let response = app
        .request_with_cookies(
            Request::delete(format!("/v1.0/tr/{own_id}/response"))
                .body(Body::empty())
                .unwrap(),
            &other_cookies,
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Machine responses belong to nobody
    let response = app
        .request_with_cookies(
            Request::delete(format!("/v1.0/tr/{id}/response"))
                .body(Body::empty())
                .unwrap(),
            &owner_cookies,
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn alternatives_list_best_rated_first_with_authors() {
    let (app, _provider) = TestApp::with_echo();
    let id = seed(&app).await;
    let (_a, a_cookies) = app.login("Ara").await;
    let (_b, b_cookies) = app.login("Bo").await;
    let (_voter, voter_cookies) = app.login("Voter").await;
    let uri = format!("/v1.0/tr/{id}/response");

    app.request_with_cookies(form_post(&uri, &[("text", "A 번역")]), &a_cookies)
        .await;
    let b = response_json(
        app.request_with_cookies(form_post(&uri, &[("text", "B 번역")]), &b_cookies)
            .await,
    )
    .await;

    let b_id = b["id_b62"].as_str().unwrap();
    let response = app
        .request_with_cookies(
            form_post(&format!("/v1.0/tr/{b_id}/rate"), &[("r", "1")]),
            &voter_cookies,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(
            Request::get(format!("/v1.0/tr/{id}/responses?include=author"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let list = response_json(response).await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["translated_text"], "B 번역");
    assert_eq!(list[0]["plus_ratings"], 1);
    assert_eq!(list[0]["author"], "Bo Tester");
    assert_eq!(list[1]["author"], "Ara Tester");

    let response = app
        .request(
            Request::get(format!("/v1.0/tr/{id}/responses"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    let list = response_json(response).await;
    assert!(list[0].get("author").is_none());
}
