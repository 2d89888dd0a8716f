//! The pre-action hook that enforces the scheme policy.
//!
//! # Integration Flow
//!
//! ```text
//! HTTP Request
//!   ↓
//! Framework code implements GuardRequest / RedirectResponder
//!   ↓
//! ProtocolGuard::ensure_proper_protocol(policy, request, responder)
//!   ↓
//! Decision::Proceed            → run the action
//! Decision::Redirected(..)     → responder already holds the redirect; stop
//! ```

use crate::config::{GlobalConfig, RedirectStatus};
use crate::facts::RequestFacts;
use crate::logging::GuardLog;
use crate::policy::ActionPolicy;
use crate::scheme::Scheme;
use crate::shared::SharedConfig;
use crate::url::redirect_url;
use crate::verdict::evaluate;

use super::{GuardRequest, RedirectResponder};

/// A redirect the guard decided on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    /// Scheme the client is sent to
    pub target: Scheme,
    /// Absolute target URL
    pub location: String,
    /// Status to send
    pub status: RedirectStatus,
}

/// What the surrounding pipeline should do after the guard ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Continue to the action
    Proceed,
    /// Stop; the client is being redirected
    Redirected(Redirect),
}

impl Decision {
    /// Returns `true` if the action should run.
    pub fn should_proceed(&self) -> bool {
        matches!(self, Decision::Proceed)
    }
}

/// Scheme enforcement hook.
///
/// Holds a [`SharedConfig`] handle and reads one snapshot per request, so it
/// can be cloned freely across worker threads.
///
/// # Examples
///
/// ```
/// use protocol_guard::web::{ProtocolGuard, RecordingResponder, RequestAdapter};
/// use protocol_guard::{ActionPolicy, GlobalConfig, RedirectStatus};
///
/// let guard = ProtocolGuard::new(GlobalConfig::default());
/// let policy = ActionPolicy::builder().declare_required(["show"]).build();
///
/// let mut request = RequestAdapter::new("show", "example.com", "/foo?x=1");
/// request.set_port(Some(80));
/// let mut responder = RecordingResponder::new();
///
/// let decision = guard.ensure_proper_protocol(&policy, &request, &mut responder);
///
/// assert!(!decision.should_proceed());
/// let redirect = responder.recorded().unwrap();
/// assert_eq!(redirect.location, "https://example.com/foo?x=1");
/// assert_eq!(redirect.status, RedirectStatus::Found);
/// assert!(responder.transient_kept());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProtocolGuard {
    config: SharedConfig,
}

impl ProtocolGuard {
    /// Creates a guard over a fixed configuration.
    pub fn new(config: GlobalConfig) -> Self {
        Self {
            config: SharedConfig::new(config),
        }
    }

    /// Creates a guard that follows a shared, reloadable configuration.
    pub fn with_shared(config: SharedConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration handle.
    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    /// Decides what to do with `request` without touching any response.
    pub fn decide<R>(&self, policy: &ActionPolicy, request: &R) -> Decision
    where
        R: GuardRequest + ?Sized,
    {
        let config = self.config.snapshot();
        decide_with(&config, policy, request)
    }

    /// Runs the guard: on a redirect verdict the redirect is issued through
    /// `responder` and flash messages are kept for the next request.
    pub fn ensure_proper_protocol<R, C>(
        &self,
        policy: &ActionPolicy,
        request: &R,
        responder: &mut C,
    ) -> Decision
    where
        R: GuardRequest + ?Sized,
        C: RedirectResponder + ?Sized,
    {
        let decision = self.decide(policy, request);

        if let Decision::Redirected(redirect) = &decision {
            responder.redirect(&redirect.location, redirect.status);
            responder.keep_transient_messages();
        }

        decision
    }
}

/// Decides against an explicit configuration snapshot.
pub fn decide_with<R>(config: &GlobalConfig, policy: &ActionPolicy, request: &R) -> Decision
where
    R: GuardRequest + ?Sized,
{
    let facts = RequestFacts::gather(request, config.trusted_scheme_header());
    let log = GuardLog::new(facts.action_name);
    let disabled = config.is_check_disabled();
    let verdict = evaluate(disabled, policy, facts.action_name, facts.is_secure());

    match verdict.target() {
        None => {
            if disabled {
                log.bypassed();
            } else {
                log.allowed(facts.is_secure());
            }
            Decision::Proceed
        }
        Some(target) => {
            let location = redirect_url(config, &facts, target);
            let status = policy
                .redirect_status()
                .unwrap_or_else(|| config.redirect_status());

            log.redirecting(verdict, &location, status);
            Decision::Redirected(Redirect {
                target,
                location,
                status,
            })
        }
    }
}
