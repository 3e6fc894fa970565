//! Shared route helpers: caller details and session users.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::HeaderMap;
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;
use tower_sessions::Session;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::RequestContext;
use crate::session::SESSION_USER_ID;
use crate::state::AppState;

/// User agent and remote address of the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub user_agent: String,
    pub remote_address: String,
}

impl ClientInfo {
    /// Build the service-level context for this caller.
    pub fn context(self, user_id: Option<Uuid>) -> RequestContext {
        RequestContext {
            user_id,
            user_agent: self.user_agent,
            remote_address: self.remote_address,
        }
    }
}

impl FromRequestParts<AppState> for ClientInfo {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user_agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map_or_else(|| state.config().default_user_agent.clone(), str::to_string);

        let addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(Self {
            user_agent,
            remote_address: client_address(addr, &parts.headers),
        })
    }
}

/// Get the client address: first `X-Forwarded-For` entry, then
/// `X-Real-IP`, then the connection address.
pub fn client_address(addr: Option<SocketAddr>, headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for")
        && let Ok(value) = forwarded.to_str()
        && let Some(ip) = value.split(',').next()
        && !ip.trim().is_empty()
    {
        return ip.trim().to_string();
    }

    if let Some(real_ip) = headers.get("x-real-ip")
        && let Ok(value) = real_ip.to_str()
    {
        return value.trim().to_string();
    }

    addr.map(|a| a.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// User id stored in the session, if any.
pub async fn session_user_id(session: &Session) -> Option<Uuid> {
    session.get(SESSION_USER_ID).await.ok().flatten()
}

/// Require a logged-in user that still exists.
pub async fn require_user(state: &AppState, session: &Session) -> AppResult<Uuid> {
    let Some(id) = session_user_id(session).await else {
        return Err(AppError::Unauthorized);
    };

    match state.store().find_user(id).await? {
        Some(user) => Ok(user.id),
        None => Err(AppError::Unauthorized),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn addr() -> Option<SocketAddr> {
        Some("192.0.2.10:443".parse().unwrap())
    }

    #[test]
    fn forwarded_for_wins() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.5, 10.0.0.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.1"));
        assert_eq!(client_address(addr(), &headers), "203.0.113.5");
    }

    #[test]
    fn real_ip_then_socket() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.1"));
        assert_eq!(client_address(addr(), &headers), "198.51.100.1");

        assert_eq!(client_address(addr(), &HeaderMap::new()), "192.0.2.10");
        assert_eq!(client_address(None, &HeaderMap::new()), "unknown");
    }
}
