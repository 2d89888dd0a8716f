use crate::config::RedirectStatus;
use crate::verdict::Verdict;

/// Structured log events for one guard evaluation.
///
/// Every event carries the action name so decisions can be traced back to
/// the route that produced them.
#[derive(Debug)]
pub(crate) struct GuardLog<'a> {
    action: &'a str,
}

impl<'a> GuardLog<'a> {
    pub(crate) fn new(action: &'a str) -> Self {
        Self { action }
    }

    pub(crate) fn bypassed(&self) {
        tracing::trace!(target: "protocol_guard", action = %self.action, "scheme check disabled");
    }

    pub(crate) fn allowed(&self, secure: bool) {
        tracing::debug!(
            target: "protocol_guard",
            action = %self.action,
            secure,
            "request allowed"
        );
    }

    pub(crate) fn redirecting(&self, verdict: Verdict, location: &str, status: RedirectStatus) {
        tracing::info!(
            target: "protocol_guard",
            action = %self.action,
            verdict = %verdict,
            location = %location,
            status = status.code(),
            "redirecting request"
        );
    }
}
