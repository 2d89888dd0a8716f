//! Adapters for the `http` crate's request and response types.
//!
//! Enabled with the `http` feature. The request side reads host and port
//! from the URI authority (absolute-form requests) or else the `Host`
//! header; TLS and the routed action name come from the integration, since
//! `http::Request` carries neither.

use http::header::{HOST, LOCATION};
use http::request::Parts;
use http::uri::Authority;
use http::{HeaderValue, Response, StatusCode};

use crate::config::RedirectStatus;

use super::{GuardRequest, RedirectResponder};

/// [`GuardRequest`] view over `http::request::Parts`.
///
/// Requests with no absolute URI and no parseable `Host` header (HTTP/1.0
/// clients, malformed headers) have no host of their own. Supply the
/// server's name through [`HttpRequestView::with_server_name`]; without it
/// [`GuardRequest::host`] is empty and a redirect falls back to the
/// configured host for the target scheme, or renders as `https:///path`
/// when none is configured.
///
/// # Examples
///
/// ```
/// use protocol_guard::web::{GuardRequest, HttpRequestView};
///
/// let (parts, _body) = http::Request::builder()
///     .uri("/orders?page=2")
///     .header("host", "shop.example.com:8080")
///     .body(())
///     .unwrap()
///     .into_parts();
///
/// let view = HttpRequestView::new(&parts, "orders", false);
/// assert_eq!(view.host(), "shop.example.com");
/// assert_eq!(view.port(), Some(8080));
/// assert_eq!(view.full_path_with_query(), "/orders?page=2");
/// ```
#[derive(Debug)]
pub struct HttpRequestView<'a> {
    parts: &'a Parts,
    action: &'a str,
    transport_secure: bool,
    authority: Option<Authority>,
    server_name: Option<&'a str>,
}

impl<'a> HttpRequestView<'a> {
    /// Wraps request parts routed to `action`.
    pub fn new(parts: &'a Parts, action: &'a str, transport_secure: bool) -> Self {
        let authority = parts.uri.authority().cloned().or_else(|| {
            parts
                .headers
                .get(HOST)
                .and_then(|value| value.to_str().ok())
                .and_then(|host| host.parse::<Authority>().ok())
        });

        Self {
            parts,
            action,
            transport_secure,
            authority,
            server_name: None,
        }
    }

    /// Sets the host reported when the request does not name one.
    pub fn with_server_name(mut self, name: &'a str) -> Self {
        self.server_name = Some(name);
        self
    }
}

impl GuardRequest for HttpRequestView<'_> {
    fn is_transport_secure(&self) -> bool {
        self.transport_secure
    }

    fn header_value(&self, name: &str) -> Option<&str> {
        self.parts
            .headers
            .get(name)
            .and_then(|value| value.to_str().ok())
    }

    // Values with obs-text bytes fail `to_str` but are still present.
    fn has_header(&self, name: &str) -> bool {
        self.parts
            .headers
            .get(name)
            .is_some_and(|value| value.as_bytes().iter().any(|b| !b.is_ascii_whitespace()))
    }

    fn host(&self) -> &str {
        match &self.authority {
            Some(authority) => authority.host(),
            None => self.server_name.unwrap_or(""),
        }
    }

    fn port(&self) -> Option<u16> {
        self.authority.as_ref().and_then(Authority::port_u16)
    }

    fn full_path_with_query(&self) -> &str {
        self.parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/")
    }

    fn action_name(&self) -> &str {
        self.action
    }
}

/// [`RedirectResponder`] that builds an `http::Response<()>`.
///
/// The session layer is outside this crate; [`HttpResponder::keep_flash`]
/// tells the integration whether to carry flash messages forward.
///
/// A target URL that is not a valid header value produces no response at
/// all, never a redirect without a `Location`.
#[derive(Debug, Default)]
pub struct HttpResponder {
    response: Option<Response<()>>,
    keep_flash: bool,
}

impl HttpResponder {
    /// Creates a responder with no response yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if flash messages must survive the redirect.
    pub fn keep_flash(&self) -> bool {
        self.keep_flash
    }

    /// Takes the redirect response, if one was issued.
    ///
    /// `None` after a [`Decision::Redirected`](super::Decision::Redirected)
    /// means the target could not be encoded; the integration should answer
    /// with an error instead of running the action.
    pub fn into_response(self) -> Option<Response<()>> {
        self.response
    }
}

impl RedirectResponder for HttpResponder {
    fn redirect(&mut self, url: &str, status: RedirectStatus) {
        let location = match HeaderValue::from_str(url) {
            Ok(location) => location,
            Err(e) => {
                tracing::error!(
                    target: "protocol_guard",
                    location = ?url,
                    error = %e,
                    "redirect target is not a valid header value, no response issued"
                );
                self.response = None;
                return;
            }
        };

        let mut response = Response::new(());
        *response.status_mut() = status_code(status);
        response.headers_mut().insert(LOCATION, location);
        self.response = Some(response);
    }

    fn keep_transient_messages(&mut self) {
        self.keep_flash = true;
    }
}

fn status_code(status: RedirectStatus) -> StatusCode {
    match status {
        RedirectStatus::MovedPermanently => StatusCode::MOVED_PERMANENTLY,
        RedirectStatus::Found => StatusCode::FOUND,
        RedirectStatus::SeeOther => StatusCode::SEE_OTHER,
        RedirectStatus::TemporaryRedirect => StatusCode::TEMPORARY_REDIRECT,
        RedirectStatus::PermanentRedirect => StatusCode::PERMANENT_REDIRECT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::{Decision, ProtocolGuard};
    use crate::{ActionPolicy, GlobalConfig};

    fn location(response: &Response<()>) -> Option<&str> {
        response.headers().get(LOCATION).and_then(|v| v.to_str().ok())
    }

    fn parts(uri: &str, host: Option<&str>) -> Parts {
        let mut builder = http::Request::builder().uri(uri);
        if let Some(host) = host {
            builder = builder.header(HOST, host);
        }
        builder.body(()).expect("valid request").into_parts().0
    }

    #[test]
    fn host_header_without_port() {
        let parts = parts("/", Some("example.com"));
        let view = HttpRequestView::new(&parts, "index", false);

        assert_eq!(view.host(), "example.com");
        assert_eq!(view.port(), None);
    }

    #[test]
    fn absolute_uri_wins_over_host_header() {
        let parts = parts("http://origin.example.com:8080/a?b=c", Some("other.example.com"));
        let view = HttpRequestView::new(&parts, "index", false);

        assert_eq!(view.host(), "origin.example.com");
        assert_eq!(view.port(), Some(8080));
        assert_eq!(view.full_path_with_query(), "/a?b=c");
    }

    #[test]
    fn missing_host_is_empty() {
        let parts = parts("/", None);
        let view = HttpRequestView::new(&parts, "index", false);

        assert_eq!(view.host(), "");
    }

    #[test]
    fn server_name_fills_missing_host() {
        let guard = ProtocolGuard::new(GlobalConfig::default());
        let policy = ActionPolicy::builder().declare_required(["pay"]).build();
        let parts = parts("/pay", None);
        let view = HttpRequestView::new(&parts, "pay", false).with_server_name("shop.example.com");
        let mut responder = HttpResponder::new();

        guard.ensure_proper_protocol(&policy, &view, &mut responder);

        let response = responder.into_response().expect("redirect issued");
        assert_eq!(location(&response), Some("https://shop.example.com/pay"));
    }

    #[test]
    fn server_name_does_not_override_host_header() {
        let parts = parts("/", Some("example.com"));
        let view = HttpRequestView::new(&parts, "index", false).with_server_name("fallback.example");

        assert_eq!(view.host(), "example.com");
    }

    #[test]
    fn opaque_header_bytes_count_as_present() {
        let mut parts = parts("/", Some("example.com"));
        parts.headers.insert(
            "x-forwarded-ssl",
            HeaderValue::from_bytes(b"\xe9t\xe9").expect("obs-text is a valid value"),
        );
        parts
            .headers
            .insert("x-blank", HeaderValue::from_static("  "));
        let view = HttpRequestView::new(&parts, "index", false);

        assert_eq!(view.header_value("x-forwarded-ssl"), None);
        assert!(view.has_header("X-Forwarded-Ssl"));
        assert!(!view.has_header("x-blank"));
        assert!(!view.has_header("x-missing"));
        assert!(crate::scheme::is_secure_request(&view, Some("X-Forwarded-Ssl")));
    }

    #[test]
    fn headers_are_case_insensitive() {
        let parts = http::Request::builder()
            .uri("/")
            .header("X-Forwarded-Ssl", "on")
            .body(())
            .expect("valid request")
            .into_parts()
            .0;
        let view = HttpRequestView::new(&parts, "index", false);

        assert_eq!(view.header_value("x-forwarded-ssl"), Some("on"));
    }

    #[test]
    fn guard_builds_http_redirect() {
        let guard = ProtocolGuard::new(GlobalConfig::default());
        let policy = ActionPolicy::builder().declare_required(["pay"]).build();
        let parts = parts("/pay?amount=5", Some("shop.example.com"));
        let view = HttpRequestView::new(&parts, "pay", false);
        let mut responder = HttpResponder::new();

        guard.ensure_proper_protocol(&policy, &view, &mut responder);

        assert!(responder.keep_flash());
        let response = responder.into_response().expect("redirect issued");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), Some("https://shop.example.com/pay?amount=5"));
    }

    #[test]
    fn resolver_host_with_line_break_falls_back_to_request_host() {
        let guard = ProtocolGuard::new(
            GlobalConfig::builder()
                .secure_host_with(|| Ok("secure.example.com\r\n".to_string()))
                .build(),
        );
        let policy = ActionPolicy::builder().declare_required(["pay"]).build();
        let parts = parts("/pay", Some("shop.example.com"));
        let view = HttpRequestView::new(&parts, "pay", false);
        let mut responder = HttpResponder::new();

        let decision = guard.ensure_proper_protocol(&policy, &view, &mut responder);

        assert!(matches!(decision, Decision::Redirected(_)));
        let response = responder.into_response().expect("redirect issued");
        assert_eq!(location(&response), Some("https://shop.example.com/pay"));
    }

    #[test]
    fn invalid_location_issues_no_response() {
        let mut responder = HttpResponder::new();
        responder.redirect("https://bad.example\r\n/pay", RedirectStatus::Found);

        assert!(responder.into_response().is_none());
    }

    #[test]
    fn status_codes_match() {
        for status in [
            RedirectStatus::MovedPermanently,
            RedirectStatus::Found,
            RedirectStatus::SeeOther,
            RedirectStatus::TemporaryRedirect,
            RedirectStatus::PermanentRedirect,
        ] {
            assert_eq!(status_code(status).as_u16(), status.code());
        }
    }
}
