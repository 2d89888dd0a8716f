//! Owned-data request and response adapters.

use std::collections::HashMap;

use crate::config::RedirectStatus;

use super::{GuardRequest, RedirectResponder};

/// Framework-agnostic request holding just what the guard reads.
///
/// Integrations that cannot implement [`GuardRequest`] on their own request
/// type can copy the relevant parts into a `RequestAdapter`.
///
/// # Examples
///
/// ```
/// use protocol_guard::web::{GuardRequest, RequestAdapter};
///
/// let mut adapter = RequestAdapter::new("checkout", "shop.example.com", "/cart?step=2");
/// adapter.set_port(Some(80));
/// adapter.add_header("X-Forwarded-Proto", "https");
///
/// assert_eq!(adapter.action_name(), "checkout");
/// assert_eq!(adapter.header_value("x-forwarded-proto"), Some("https"));
/// ```
#[derive(Debug, Clone)]
pub struct RequestAdapter {
    action: String,
    host: String,
    port: Option<u16>,
    path: String,
    transport_secure: bool,
    /// Keyed by lowercased header name
    headers: HashMap<String, String>,
}

impl RequestAdapter {
    /// Creates a plain-HTTP request with no port and no headers.
    pub fn new(action: impl Into<String>, host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            host: host.into(),
            port: None,
            path: path.into(),
            transport_secure: false,
            headers: HashMap::new(),
        }
    }

    /// Marks whether the connection is TLS.
    pub fn set_transport_secure(&mut self, secure: bool) {
        self.transport_secure = secure;
    }

    /// Sets the port the client connected to.
    pub fn set_port(&mut self, port: Option<u16>) {
        self.port = port;
    }

    /// Adds a header, replacing any earlier value for the same name.
    pub fn add_header(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }
}

impl GuardRequest for RequestAdapter {
    fn is_transport_secure(&self) -> bool {
        self.transport_secure
    }

    fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    fn host(&self) -> &str {
        &self.host
    }

    fn port(&self) -> Option<u16> {
        self.port
    }

    fn full_path_with_query(&self) -> &str {
        &self.path
    }

    fn action_name(&self) -> &str {
        &self.action
    }
}

/// A redirect issued through [`RecordingResponder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRedirect {
    /// Target URL
    pub location: String,
    /// Status the redirect was sent with
    pub status: RedirectStatus,
}

/// Responder that records what the guard asked for instead of sending it.
///
/// Useful in tests and for integrations that translate the recorded
/// redirect into their own response type afterwards.
#[derive(Debug, Default)]
pub struct RecordingResponder {
    redirect: Option<RecordedRedirect>,
    transient_kept: bool,
}

impl RecordingResponder {
    /// Creates an empty responder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded redirect, if any.
    pub fn recorded(&self) -> Option<&RecordedRedirect> {
        self.redirect.as_ref()
    }

    /// Returns `true` if flash messages were kept for the next request.
    pub fn transient_kept(&self) -> bool {
        self.transient_kept
    }

    /// Consumes the responder, returning the recorded redirect.
    pub fn into_redirect(self) -> Option<RecordedRedirect> {
        self.redirect
    }
}

impl RedirectResponder for RecordingResponder {
    fn redirect(&mut self, url: &str, status: RedirectStatus) {
        self.redirect = Some(RecordedRedirect {
            location: url.to_string(),
            status,
        });
    }

    fn keep_transient_messages(&mut self) {
        self.transient_kept = true;
    }
}
