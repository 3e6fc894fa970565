//! Session logout.
//!
//! Logging in happens through the OAuth collaborator, which stores the
//! user id under [`SESSION_USER_ID`](crate::session::SESSION_USER_ID).

use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use tower_sessions::Session;
use tracing::info;

use super::helpers::session_user_id;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /logout
async fn logout(session: Session) -> AppResult<StatusCode> {
    let user_id = session_user_id(&session).await;

    session.delete().await.map_err(|e| {
        tracing::error!(error = %e, "failed to delete session");
        AppError::Internal(anyhow::anyhow!("failed to delete session"))
    })?;

    if let Some(user_id) = user_id {
        info!(user_id = %user_id, "user logged out");
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Create the auth router.
pub fn router() -> Router<AppState> {
    Router::new().route("/logout", post(logout))
}
