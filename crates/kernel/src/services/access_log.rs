//! Access logging for translate calls.

use tracing::debug;
use uuid::Uuid;

use super::RequestContext;
use crate::models::{AccessFlags, TranslationAccessLog};

/// Access log entry opened at the start of a translate call.
///
/// Held in memory until the call's batch is committed.
#[derive(Debug)]
pub struct PendingAccess {
    log: TranslationAccessLog,
}

/// Start an access log entry for the caller.
pub fn record(context: &RequestContext) -> PendingAccess {
    let log = TranslationAccessLog::new(
        context.user_id,
        &context.user_agent,
        &context.remote_address,
    );
    debug!(access_log = %log.id, remote_address = %log.remote_address, "access recorded");
    PendingAccess { log }
}

impl PendingAccess {
    /// Flag the access as having created a new response.
    pub fn mark_created(&mut self) {
        self.log.set_flags(AccessFlags::CREATED);
    }

    /// Record the response the access resolved to.
    pub fn resolve(&mut self, translation_id: Uuid) {
        self.log.attach(translation_id);
    }

    pub fn log(&self) -> &TranslationAccessLog {
        &self.log
    }

    pub fn finish(self) -> TranslationAccessLog {
        self.log
    }
}
