//! Rating endpoint.

use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Form, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::helpers::require_user;
use crate::compact_id::CompactId;
use crate::error::{AppError, AppResult};
use crate::services::Vote;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct RateForm {
    r: String,
}

/// A vote with the refreshed counts for the rated response.
#[derive(Debug, Serialize)]
struct VoteBody {
    translation_id: CompactId,
    rating: i16,
    timestamp: DateTime<Utc>,
    plus_ratings: i64,
    minus_ratings: i64,
}

impl From<Vote> for VoteBody {
    fn from(vote: Vote) -> Self {
        Self {
            translation_id: CompactId::from(vote.rating.translation_id),
            rating: vote.rating.rating.as_int(),
            timestamp: vote.rating.timestamp,
            plus_ratings: vote.summary.positive,
            minus_ratings: vote.summary.negative,
        }
    }
}

/// POST /v1.0/tr/{id}/rate
async fn rate(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<CompactId>,
    Form(form): Form<RateForm>,
) -> AppResult<Json<VoteBody>> {
    let user_id = require_user(&state, &session).await?;
    let value: i64 = form
        .r
        .trim()
        .parse()
        .map_err(|_| AppError::InvalidInput("rating must be 1 or -1".to_string()))?;

    let vote = state.ratings().vote(id.uuid(), user_id, value).await?;
    Ok(Json(vote.into()))
}

/// Create the rating router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1.0/tr/{id}/rate", post(rate))
}
