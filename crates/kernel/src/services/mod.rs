//! Translation, submission and rating services.
//!
//! Handlers build a [`RequestContext`] from the HTTP request and pass it in
//! explicitly; services never read ambient request state.

pub mod access_log;
pub mod ratings;
pub mod submissions;
pub mod translation;

pub use access_log::PendingAccess;
pub use ratings::{RatingService, Vote};
pub use submissions::{Alternative, SubmissionService};
pub use translation::{TranslateOutcome, TranslateParams, TranslationService};

use uuid::Uuid;

/// Caller details captured at the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Authenticated user, if any.
    pub user_id: Option<Uuid>,

    pub user_agent: String,

    pub remote_address: String,
}

impl RequestContext {
    pub fn anonymous(user_agent: impl Into<String>, remote_address: impl Into<String>) -> Self {
        Self {
            user_id: None,
            user_agent: user_agent.into(),
            remote_address: remote_address.into(),
        }
    }
}
