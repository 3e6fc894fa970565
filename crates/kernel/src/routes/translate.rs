//! Translate endpoints.

use axum::extract::State;
use axum::routing::post;
use axum::{Form, Json, Router};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::helpers::{ClientInfo, session_user_id};
use crate::error::{AppError, AppResult};
use crate::services::{TranslateOutcome, TranslateParams};
use crate::state::AppState;

/// Translate form fields.
#[derive(Debug, Deserialize)]
struct TranslateForm {
    /// Source language.
    sl: String,
    /// Target language.
    tl: String,
    /// Mode code.
    m: String,
    /// Text.
    t: String,
}

impl TranslateForm {
    fn params(&self) -> AppResult<TranslateParams> {
        let mode = self.m.trim().parse().map_err(|_| AppError::InvalidMode)?;

        Ok(TranslateParams {
            text: self.t.trim().to_string(),
            mode,
            source: self.sl.trim().to_string(),
            target: self.tl.trim().to_string(),
        })
    }
}

/// Translate result.
#[derive(Debug, Serialize)]
struct TranslateResponse {
    id: Option<String>,
    id_b62: Option<String>,
    intermediate_text: Option<String>,
    translated_text: String,
}

impl From<TranslateOutcome> for TranslateResponse {
    fn from(outcome: TranslateOutcome) -> Self {
        Self {
            id: outcome.id.map(|id| id.uuid().to_string()),
            id_b62: outcome.id.map(|id| id.to_string()),
            intermediate_text: outcome.intermediate_text,
            translated_text: outcome.translated_text,
        }
    }
}

async fn run(
    state: &AppState,
    session: &Session,
    client: ClientInfo,
    form: &TranslateForm,
) -> AppResult<TranslateOutcome> {
    let params = form.params()?;
    let context = client.context(session_user_id(session).await);
    state.translations().translate(&params, &context).await
}

/// POST /v1.0/translate
async fn translate(
    State(state): State<AppState>,
    session: Session,
    client: ClientInfo,
    Form(form): Form<TranslateForm>,
) -> AppResult<Json<TranslateResponse>> {
    let outcome = run(&state, &session, client, &form).await?;
    Ok(Json(outcome.into()))
}

/// POST /translate, POST /v0.9/translate
///
/// Deprecated: returns only the translated text.
async fn translate_text(
    State(state): State<AppState>,
    session: Session,
    client: ClientInfo,
    Form(form): Form<TranslateForm>,
) -> AppResult<String> {
    let outcome = run(&state, &session, client, &form).await?;
    Ok(outcome.translated_text)
}

/// Create the translate router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1.0/translate", post(translate))
        .route("/translate", post(translate_text))
        .route("/v0.9/translate", post(translate_text))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::compact_id::CompactId;

    #[test]
    fn form_fields_are_trimmed() {
        let form = TranslateForm {
            sl: " en ".into(),
            tl: "ko\n".into(),
            m: " 2 ".into(),
            t: "  Hello  ".into(),
        };
        let params = form.params().unwrap();
        assert_eq!(params.source, "en");
        assert_eq!(params.target, "ko");
        assert_eq!(params.mode, 2);
        assert_eq!(params.text, "Hello");
    }

    #[test]
    fn non_numeric_mode_is_invalid() {
        let form = TranslateForm {
            sl: "en".into(),
            tl: "ko".into(),
            m: "two".into(),
            t: "Hello".into(),
        };
        assert!(matches!(form.params(), Err(AppError::InvalidMode)));
    }

    #[test]
    fn response_carries_both_id_forms() {
        let id = Uuid::from_u128(62);
        let body = TranslateResponse::from(TranslateOutcome {
            id: Some(CompactId::from(id)),
            intermediate_text: None,
            translated_text: "안녕".into(),
        });
        assert_eq!(body.id.as_deref(), Some(id.to_string().as_str()));
        assert_eq!(body.id_b62.as_deref(), Some("10"));
    }
}
