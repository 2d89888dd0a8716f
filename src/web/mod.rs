//! Web framework integration surface.
//!
//! This module is the boundary between HTTP frameworks and the guard's
//! decision core. It handles:
//! - Reading the request through [`GuardRequest`]
//! - Issuing redirects and keeping flash messages through [`RedirectResponder`]
//! - Running the check as a pre-action hook ([`ProtocolGuard`])
//!
//! # Design Principles
//!
//! 1. **No Framework Dependencies**: the core only sees the two collaborator
//!    traits. The optional `http` feature adds adapters for the `http` crate.
//!
//! 2. **Scheme Only**: the guard decides on transport scheme. It never
//!    authenticates or authorizes.
//!
//! 3. **Explicit Context**: no global state. Configuration arrives as a
//!    snapshot, policies as values looked up by the integration.
//!
//! # Example Flow
//!
//! ```ignore
//! // In a framework-specific integration (e.g., axum, actix):
//!
//! // 1. At startup
//! let guard = ProtocolGuard::with_shared(SharedConfig::new(load_config(path)?));
//! let mut registry = PolicyRegistry::new();
//! registry.register("accounts", ActionPolicy::builder().declare_required(["login"]).build());
//!
//! // 2. Per request, before the action runs
//! let policy = registry.policy_for(route_group);
//! match guard.ensure_proper_protocol(policy, &request, &mut responder) {
//!     Decision::Proceed => run_action(request),
//!     Decision::Redirected(_) => responder.into_response(),
//! }
//! ```

mod adapter;
mod extract;
#[cfg(feature = "http")]
mod http_adapter;
mod middleware;

pub use adapter::{RecordedRedirect, RecordingResponder, RequestAdapter};
pub use extract::{GuardRequest, RedirectResponder};
#[cfg(feature = "http")]
pub use http_adapter::{HttpRequestView, HttpResponder};
pub use middleware::{decide_with, Decision, ProtocolGuard, Redirect};
