//! Per-route-group scheme policies.
//!
//! An [`ActionPolicy`] is declared once while a route group is set up and is
//! read-only afterwards. Declarations only ever add actions.
//!
//! # Required vs. excepted
//!
//! Without an exceptions list the policy is an allow-list: only the actions
//! passed to [`PolicyBuilder::declare_required`] need HTTPS. As soon as
//! [`PolicyBuilder::declare_exceptions`] is called, even with no actions,
//! the policy flips to "HTTPS for every action except these" and the
//! required list no longer affects the outcome.
//!
//! ```
//! use protocol_guard::ActionPolicy;
//!
//! let policy = ActionPolicy::builder().declare_required(["login"]).build();
//! assert!(policy.requires_secure("login"));
//! assert!(!policy.requires_secure("index"));
//!
//! let flipped = ActionPolicy::builder()
//!     .declare_required(["login"])
//!     .declare_exceptions(Vec::<String>::new())
//!     .build();
//! assert!(flipped.requires_secure("index"));
//! ```

use std::collections::{BTreeSet, HashMap};

use crate::config::RedirectStatus;

/// A list of action names that distinguishes "never declared" from "declared
/// empty".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ActionList {
    /// No declaration was ever made
    #[default]
    Unset,
    /// Declared, possibly with no actions
    Declared(BTreeSet<String>),
}

impl ActionList {
    /// Returns `true` once any declaration has been made.
    pub fn is_declared(&self) -> bool {
        matches!(self, ActionList::Declared(_))
    }

    /// Returns `true` if `action` was declared. Unset lists contain nothing.
    pub fn contains(&self, action: &str) -> bool {
        match self {
            ActionList::Unset => false,
            ActionList::Declared(actions) => actions.contains(action),
        }
    }

    /// Iterates the declared actions in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let actions = match self {
            ActionList::Unset => None,
            ActionList::Declared(actions) => Some(actions),
        };
        actions.into_iter().flatten().map(String::as_str)
    }

    fn extend<I, S>(&mut self, actions: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let ActionList::Unset = self {
            *self = ActionList::Declared(BTreeSet::new());
        }
        if let ActionList::Declared(declared) = self {
            declared.extend(actions.into_iter().map(Into::into));
        }
    }

    fn merge(&self, child: &ActionList) -> ActionList {
        match (self, child) {
            (ActionList::Unset, ActionList::Unset) => ActionList::Unset,
            _ => {
                let mut merged = ActionList::Declared(BTreeSet::new());
                merged.extend(self.iter().chain(child.iter()));
                merged
            }
        }
    }
}

/// Actions that may be served over either scheme.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AllowedActions {
    /// No declaration was ever made
    #[default]
    Unset,
    /// Only these actions
    Declared(BTreeSet<String>),
    /// Every action, including ones never named anywhere
    All,
}

impl AllowedActions {
    /// Returns `true` if `action` may be served over either scheme.
    pub fn allows(&self, action: &str) -> bool {
        match self {
            AllowedActions::Unset => false,
            AllowedActions::Declared(actions) => actions.contains(action),
            AllowedActions::All => true,
        }
    }

    fn extend<I, S>(&mut self, actions: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match self {
            AllowedActions::All => {}
            AllowedActions::Declared(declared) => {
                declared.extend(actions.into_iter().map(Into::into));
            }
            AllowedActions::Unset => {
                *self = AllowedActions::Declared(actions.into_iter().map(Into::into).collect());
            }
        }
    }

    fn merge(&self, child: &AllowedActions) -> AllowedActions {
        match (self, child) {
            (AllowedActions::All, _) | (_, AllowedActions::All) => AllowedActions::All,
            (AllowedActions::Unset, other) | (other, AllowedActions::Unset) => other.clone(),
            (AllowedActions::Declared(parent), AllowedActions::Declared(child)) => {
                AllowedActions::Declared(parent.union(child).cloned().collect())
            }
        }
    }
}

/// Scheme requirements for the actions of one route group.
///
/// The default policy requires nothing, allows nothing on both schemes and
/// has no exceptions, which is also what an undeclared group gets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionPolicy {
    required: ActionList,
    required_except: ActionList,
    allowed: AllowedActions,
    redirect_status: Option<RedirectStatus>,
}

impl ActionPolicy {
    /// Starts declaring a new policy.
    pub fn builder() -> PolicyBuilder {
        PolicyBuilder::default()
    }

    /// Returns `true` if `action` must be served over HTTPS.
    ///
    /// Once an exceptions list exists (even an empty one), every action
    /// except the listed ones requires HTTPS; otherwise only the required
    /// actions do.
    pub fn requires_secure(&self, action: &str) -> bool {
        if self.required_except.is_declared() {
            !self.required_except.contains(action)
        } else {
            self.required.contains(action)
        }
    }

    /// Returns `true` if `action` may be served over either scheme.
    pub fn allows_both(&self, action: &str) -> bool {
        self.allowed.allows(action)
    }

    /// Returns the actions declared as requiring HTTPS.
    pub fn required_actions(&self) -> &ActionList {
        &self.required
    }

    /// Returns the actions excepted from the HTTPS requirement.
    pub fn required_except_actions(&self) -> &ActionList {
        &self.required_except
    }

    /// Returns the actions allowed on both schemes.
    pub fn allowed_actions(&self) -> &AllowedActions {
        &self.allowed
    }

    /// Returns the redirect status override for this group, if any.
    pub fn redirect_status(&self) -> Option<RedirectStatus> {
        self.redirect_status
    }

    /// Combines a parent group's policy with a nested group's declarations.
    ///
    /// Lists are appended. A list is declared in the result if it is declared
    /// in either input, so a parent's exceptions carve-out carries into its
    /// children. The child's redirect status wins over the parent's.
    pub fn merge(&self, child: &ActionPolicy) -> ActionPolicy {
        ActionPolicy {
            required: self.required.merge(&child.required),
            required_except: self.required_except.merge(&child.required_except),
            allowed: self.allowed.merge(&child.allowed),
            redirect_status: child.redirect_status.or(self.redirect_status),
        }
    }
}

/// Registration API for an [`ActionPolicy`].
///
/// Every `declare_*` call appends to the corresponding list, creating it if
/// it was unset.
#[derive(Debug, Default)]
pub struct PolicyBuilder {
    policy: ActionPolicy,
}

impl PolicyBuilder {
    /// Continues declaring on top of an inherited policy.
    pub fn inherit(parent: &ActionPolicy) -> Self {
        Self {
            policy: parent.clone(),
        }
    }

    /// Declares actions that must be served over HTTPS.
    pub fn declare_required<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.policy.required.extend(actions);
        self
    }

    /// Declares actions excepted from the HTTPS requirement.
    ///
    /// Calling this at all, even with no actions, makes HTTPS the default
    /// for every other action.
    pub fn declare_exceptions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.policy.required_except.extend(actions);
        self
    }

    /// Declares actions that may be served over either scheme.
    ///
    /// Names are taken literally: an action called `"all"` is just that
    /// action. Use [`PolicyBuilder::allow_all`] for the wildcard.
    pub fn declare_allowed<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.policy.allowed.extend(actions);
        self
    }

    /// Allows every action on both schemes.
    pub fn allow_all(mut self) -> Self {
        self.policy.allowed = AllowedActions::All;
        self
    }

    /// Overrides the global redirect status for this group.
    pub fn redirect_status(mut self, status: RedirectStatus) -> Self {
        self.policy.redirect_status = Some(status);
        self
    }

    /// Finishes the policy.
    pub fn build(self) -> ActionPolicy {
        self.policy
    }
}

/// Policies keyed by route-group name.
///
/// Lookups for groups that were never registered return the default policy.
#[derive(Debug, Clone, Default)]
pub struct PolicyRegistry {
    groups: HashMap<String, ActionPolicy>,
    fallback: ActionPolicy,
}

impl PolicyRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the policy for `group`, merging into any earlier registration.
    pub fn register(&mut self, group: impl Into<String>, policy: ActionPolicy) {
        let group = group.into();
        let merged = match self.groups.get(&group) {
            Some(existing) => existing.merge(&policy),
            None => policy,
        };
        self.groups.insert(group, merged);
    }

    /// Registers `group` as nested inside `parent`, inheriting its policy.
    pub fn register_nested(
        &mut self,
        parent: &str,
        group: impl Into<String>,
        policy: ActionPolicy,
    ) {
        let inherited = self.policy_for(parent).merge(&policy);
        self.register(group, inherited);
    }

    /// Returns the policy for `group`.
    pub fn policy_for(&self, group: &str) -> &ActionPolicy {
        self.groups.get(group).unwrap_or(&self.fallback)
    }

    /// Returns the number of registered groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns `true` if no group has been registered.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
