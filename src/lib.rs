//! Per-action transport scheme enforcement.
//!
//! This crate decides, for every incoming request, whether it arrived over
//! the scheme its action requires and, if not, where to redirect it:
//! - **Policies**: each route group declares which actions need HTTPS,
//!   which are excepted, and which may be served over either scheme
//! - **Verdicts**: a pure decision over (policy, action, request is secure)
//! - **Redirects**: the target URL keeps host, port and path across the
//!   scheme change, honoring configured hosts and port translation
//!
//! # Core Types
//!
//! - [`GlobalConfig`]: process-wide hosts, ports, trusted header, redirect status
//! - [`SharedConfig`]: atomically swappable configuration snapshot
//! - [`ActionPolicy`] / [`PolicyBuilder`]: per-route-group declarations
//! - [`Verdict`] and [`evaluate`]: the decision procedure
//! - [`web::ProtocolGuard`]: the pre-action hook wiring it all together
//!
//! # Examples
//!
//! ```
//! use protocol_guard::{ActionPolicy, GlobalConfig, Verdict, evaluate};
//! use protocol_guard::web::{Decision, ProtocolGuard, RequestAdapter};
//!
//! let policy = ActionPolicy::builder()
//!     .declare_required(["login"])
//!     .declare_allowed(["about"])
//!     .build();
//!
//! assert_eq!(evaluate(false, &policy, "login", false), Verdict::RedirectToSecure);
//! assert_eq!(evaluate(false, &policy, "about", true), Verdict::Allow);
//!
//! let guard = ProtocolGuard::new(GlobalConfig::default());
//! let mut request = RequestAdapter::new("login", "example.com", "/login?next=%2F");
//! request.set_port(Some(80));
//!
//! match guard.decide(&policy, &request) {
//!     Decision::Redirected(redirect) => {
//!         assert_eq!(redirect.location, "https://example.com/login?next=%2F");
//!     }
//!     Decision::Proceed => unreachable!(),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
mod error;
mod facts;
mod logging;
pub mod policy;
pub mod scheme;
mod shared;
pub mod url;
mod verdict;
pub mod web;

pub use config::{GlobalConfig, GlobalConfigBuilder, HostSource, RedirectStatus};
pub use error::{ConfigError, ValidationError};
pub use facts::RequestFacts;
pub use policy::{ActionPolicy, PolicyBuilder, PolicyRegistry};
pub use scheme::Scheme;
pub use shared::SharedConfig;
pub use url::redirect_url;
pub use verdict::{evaluate, Verdict};
