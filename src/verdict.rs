use std::fmt;

use crate::policy::ActionPolicy;
use crate::scheme::Scheme;

/// Outcome of checking one request against its action's policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// Handle the request as it is
    Allow,
    /// Send the client to the HTTPS version of the URL
    RedirectToSecure,
    /// Send the client to the plain HTTP version of the URL
    RedirectToInsecure,
}

impl Verdict {
    /// Returns the scheme to redirect to, or `None` for [`Verdict::Allow`].
    pub fn target(self) -> Option<Scheme> {
        match self {
            Verdict::Allow => None,
            Verdict::RedirectToSecure => Some(Scheme::Secure),
            Verdict::RedirectToInsecure => Some(Scheme::Insecure),
        }
    }

    /// Returns `true` for either redirect verdict.
    pub fn is_redirect(self) -> bool {
        self.target().is_some()
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Allow => write!(f, "allow"),
            Verdict::RedirectToSecure => write!(f, "redirect to https"),
            Verdict::RedirectToInsecure => write!(f, "redirect to http"),
        }
    }
}

/// Decides what to do with a request for `action`.
///
/// Rules are applied in order, first match wins:
///
/// 1. Enforcement disabled: allow.
/// 2. HTTPS required and the request is not secure: redirect to HTTPS.
/// 3. Secure request for an action allowed on both schemes: allow.
/// 4. Secure request for an action that does not require HTTPS: redirect to HTTP.
/// 5. Anything else: allow.
///
/// A secure request for a required action therefore falls through to rule 5.
///
/// # Examples
///
/// ```
/// use protocol_guard::{evaluate, ActionPolicy, Verdict};
///
/// let policy = ActionPolicy::builder().declare_required(["pay"]).build();
///
/// assert_eq!(evaluate(false, &policy, "pay", false), Verdict::RedirectToSecure);
/// assert_eq!(evaluate(false, &policy, "pay", true), Verdict::Allow);
/// assert_eq!(evaluate(false, &policy, "browse", true), Verdict::RedirectToInsecure);
/// assert_eq!(evaluate(false, &policy, "browse", false), Verdict::Allow);
/// assert_eq!(evaluate(true, &policy, "pay", false), Verdict::Allow);
/// ```
pub fn evaluate(
    check_disabled: bool,
    policy: &ActionPolicy,
    action: &str,
    request_secure: bool,
) -> Verdict {
    if check_disabled {
        return Verdict::Allow;
    }

    let required = policy.requires_secure(action);

    if required && !request_secure {
        Verdict::RedirectToSecure
    } else if request_secure && policy.allows_both(action) {
        Verdict::Allow
    } else if request_secure && !required {
        Verdict::RedirectToInsecure
    } else {
        Verdict::Allow
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_check_allows_everything() {
        let policy = ActionPolicy::builder()
            .declare_exceptions(Vec::<&str>::new())
            .build();

        assert_eq!(evaluate(true, &policy, "any", false), Verdict::Allow);
        assert_eq!(evaluate(true, &ActionPolicy::default(), "any", true), Verdict::Allow);
    }

    #[test]
    fn required_on_insecure_redirects_secure() {
        let policy = ActionPolicy::builder().declare_required(["show"]).build();
        assert_eq!(evaluate(false, &policy, "show", false), Verdict::RedirectToSecure);
    }

    #[test]
    fn required_on_secure_falls_through_to_allow() {
        let policy = ActionPolicy::builder()
            .declare_required(["show"])
            .declare_allowed(Vec::<&str>::new())
            .build();

        assert_eq!(evaluate(false, &policy, "show", true), Verdict::Allow);
    }

    #[test]
    fn dual_allowed_on_secure_is_allowed() {
        let policy = ActionPolicy::builder().declare_allowed(["feed"]).build();

        assert_eq!(evaluate(false, &policy, "feed", true), Verdict::Allow);
        assert_eq!(evaluate(false, &policy, "feed", false), Verdict::Allow);
    }

    #[test]
    fn secure_request_for_plain_action_redirects_insecure() {
        assert_eq!(
            evaluate(false, &ActionPolicy::default(), "index", true),
            Verdict::RedirectToInsecure
        );
    }

    #[test]
    fn plain_request_for_plain_action_is_allowed() {
        assert_eq!(
            evaluate(false, &ActionPolicy::default(), "index", false),
            Verdict::Allow
        );
    }

    #[test]
    fn required_wins_over_dual_allowed_when_insecure() {
        let policy = ActionPolicy::builder()
            .declare_required(["login"])
            .declare_allowed(["login"])
            .build();

        assert_eq!(evaluate(false, &policy, "login", false), Verdict::RedirectToSecure);
    }

    #[test]
    fn verdict_targets() {
        assert_eq!(Verdict::Allow.target(), None);
        assert_eq!(Verdict::RedirectToSecure.target(), Some(Scheme::Secure));
        assert_eq!(Verdict::RedirectToInsecure.target(), Some(Scheme::Insecure));
        assert!(!Verdict::Allow.is_redirect());
    }
}
