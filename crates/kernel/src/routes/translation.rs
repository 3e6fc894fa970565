//! Translation lookup, human submissions and alternatives.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Form, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::helpers::require_user;
use crate::compact_id::CompactId;
use crate::error::AppResult;
use crate::models::{Translation, TranslationResponse};
use crate::services::Alternative;
use crate::state::AppState;

/// Translation with its original text and vote counts.
#[derive(Debug, Serialize)]
struct TranslationBody {
    id: String,
    id_b62: CompactId,
    source: String,
    target: String,
    mode: i16,
    original_text: Option<String>,
    intermediate_text: Option<String>,
    translated_text: String,
    plus_ratings: i64,
    minus_ratings: i64,
    timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<String>,
}

impl From<Translation> for TranslationBody {
    fn from(t: Translation) -> Self {
        Self {
            id: t.id.to_string(),
            id_b62: CompactId::from(t.id),
            plus_ratings: t.plus_ratings(),
            minus_ratings: t.minus_ratings(),
            source: t.source,
            target: t.target,
            mode: t.mode.code(),
            original_text: t.original_text,
            intermediate_text: t.intermediate_text,
            translated_text: t.translated_text,
            timestamp: t.timestamp,
            author: None,
        }
    }
}

impl From<Alternative> for TranslationBody {
    fn from(alternative: Alternative) -> Self {
        let mut body = Self::from(alternative.translation);
        body.author = alternative.author;
        body
    }
}

/// A stored response.
#[derive(Debug, Serialize)]
struct ResponseBody {
    id: String,
    id_b62: CompactId,
    source: String,
    target: String,
    mode: i16,
    intermediate_text: Option<String>,
    translated_text: String,
    timestamp: DateTime<Utc>,
}

impl From<TranslationResponse> for ResponseBody {
    fn from(r: TranslationResponse) -> Self {
        Self {
            id: r.id.to_string(),
            id_b62: CompactId::from(r.id),
            source: r.source,
            target: r.target,
            mode: r.mode.code(),
            intermediate_text: r.intermediate_text,
            translated_text: r.translated_text,
            timestamp: r.timestamp,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SubmissionForm {
    text: String,
}

#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    include: Option<String>,
}

impl ListQuery {
    fn includes_author(&self) -> bool {
        self.include
            .as_deref()
            .is_some_and(|v| v.split(',').any(|part| part.trim() == "author"))
    }
}

/// GET /v1.0/tr/{id}
async fn show(
    State(state): State<AppState>,
    Path(id): Path<CompactId>,
) -> AppResult<Json<TranslationBody>> {
    let translation = state.translations().find(id.uuid()).await?;
    Ok(Json(translation.into()))
}

/// GET /v1.0/tr/{id}/response
async fn own_response(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<CompactId>,
) -> AppResult<Json<ResponseBody>> {
    let user_id = require_user(&state, &session).await?;
    let response = state.submissions().own(id.uuid(), user_id).await?;
    Ok(Json(response.into()))
}

/// POST /v1.0/tr/{id}/response
async fn submit_response(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<CompactId>,
    Form(form): Form<SubmissionForm>,
) -> AppResult<(StatusCode, Json<ResponseBody>)> {
    let user_id = require_user(&state, &session).await?;
    let response = state
        .submissions()
        .submit(id.uuid(), user_id, &form.text)
        .await?;
    Ok((StatusCode::CREATED, Json(response.into())))
}

/// DELETE /v1.0/tr/{id}/response
async fn delete_response(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<CompactId>,
) -> AppResult<StatusCode> {
    let user_id = require_user(&state, &session).await?;
    state.submissions().remove(id.uuid(), user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1.0/tr/{id}/responses
async fn list_responses(
    State(state): State<AppState>,
    Path(id): Path<CompactId>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<TranslationBody>>> {
    let alternatives = state
        .submissions()
        .alternatives(id.uuid(), query.includes_author())
        .await?;
    Ok(Json(alternatives.into_iter().map(Into::into).collect()))
}

/// Create the translation router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1.0/tr/{id}", get(show))
        .route(
            "/v1.0/tr/{id}/response",
            get(own_response)
                .post(submit_response)
                .delete(delete_response),
        )
        .route("/v1.0/tr/{id}/responses", get(list_responses))
}
