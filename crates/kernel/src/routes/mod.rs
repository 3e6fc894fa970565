//! HTTP route handlers.

pub mod auth;
pub mod health;
pub mod helpers;
pub mod languages;
pub mod metrics;
pub mod rating;
pub mod translate;
pub mod translation;

use axum::Router;

use crate::state::AppState;

/// All application routes, without middleware layers.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(translate::router())
        .merge(languages::router())
        .merge(translation::router())
        .merge(rating::router())
        .merge(auth::router())
        .merge(health::router())
        .merge(metrics::router())
}
