//! Supported language listing.

use std::collections::BTreeMap;

use axum::routing::get;
use axum::{Json, Router};

use crate::languages;
use crate::state::AppState;

/// GET /languages, GET /v1.0/languages
async fn list() -> Json<BTreeMap<&'static str, &'static str>> {
    Json(languages::all())
}

/// Create the languages router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/languages", get(list))
        .route("/v1.0/languages", get(list))
}
