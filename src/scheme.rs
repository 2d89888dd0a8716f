//! Request scheme detection.

use std::fmt;

use crate::web::GuardRequest;

/// Transport scheme a request arrived on, or should be redirected to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// HTTPS
    Secure,
    /// Plain HTTP
    Insecure,
}

impl Scheme {
    /// Returns the URL protocol for this scheme (`"https"` or `"http"`).
    pub fn protocol(self) -> &'static str {
        match self {
            Scheme::Secure => "https",
            Scheme::Insecure => "http",
        }
    }

    /// Returns the scheme on the other side of a redirect.
    pub fn opposite(self) -> Scheme {
        match self {
            Scheme::Secure => Scheme::Insecure,
            Scheme::Insecure => Scheme::Secure,
        }
    }

    /// Returns `true` for [`Scheme::Secure`].
    pub fn is_secure(self) -> bool {
        matches!(self, Scheme::Secure)
    }

    /// Maps a "request is secure" flag to a scheme.
    pub fn from_secure(secure: bool) -> Scheme {
        if secure {
            Scheme::Secure
        } else {
            Scheme::Insecure
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.protocol())
    }
}

/// Returns `true` if the trusted scheme header is configured and carries a
/// non-blank value on this request.
///
/// The header is taken at face value. Only configure it when an upstream
/// terminator you control sets it and strips any client-supplied copy.
pub fn header_scheme_hint<R>(request: &R, trusted_header: Option<&str>) -> bool
where
    R: GuardRequest + ?Sized,
{
    trusted_header.is_some_and(|name| request.has_header(name))
}

/// Decides whether a request should be treated as secure.
///
/// A request is secure when the transport reports TLS directly, or when the
/// trusted scheme header is present (see [`header_scheme_hint`]).
///
/// # Examples
///
/// ```
/// use protocol_guard::scheme::is_secure_request;
/// use protocol_guard::web::RequestAdapter;
///
/// let mut request = RequestAdapter::new("show", "example.com", "/");
/// assert!(!is_secure_request(&request, Some("X-Forwarded-Ssl")));
///
/// request.add_header("X-Forwarded-Ssl", "on");
/// assert!(is_secure_request(&request, Some("X-Forwarded-Ssl")));
/// assert!(!is_secure_request(&request, None));
/// ```
pub fn is_secure_request<R>(request: &R, trusted_header: Option<&str>) -> bool
where
    R: GuardRequest + ?Sized,
{
    request.is_transport_secure() || header_scheme_hint(request, trusted_header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::RequestAdapter;

    #[test]
    fn protocol_strings() {
        assert_eq!(Scheme::Secure.protocol(), "https");
        assert_eq!(Scheme::Insecure.to_string(), "http");
    }

    #[test]
    fn opposite_flips() {
        assert_eq!(Scheme::Secure.opposite(), Scheme::Insecure);
        assert_eq!(Scheme::Insecure.opposite(), Scheme::Secure);
    }

    #[test]
    fn transport_flag_alone_is_secure() {
        let mut request = RequestAdapter::new("index", "example.com", "/");
        request.set_transport_secure(true);

        assert!(is_secure_request(&request, None));
    }

    #[test]
    fn header_ignored_when_not_configured() {
        let mut request = RequestAdapter::new("index", "example.com", "/");
        request.add_header("X-Forwarded-Proto", "https");

        assert!(!is_secure_request(&request, None));
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let mut request = RequestAdapter::new("index", "example.com", "/");
        request.add_header("x-ssl", "1");

        assert!(is_secure_request(&request, Some("X-SSL")));
    }

    #[test]
    fn blank_header_is_absent() {
        let mut request = RequestAdapter::new("index", "example.com", "/");
        request.add_header("X-SSL", "   ");

        assert!(!header_scheme_hint(&request, Some("X-SSL")));
        assert!(!is_secure_request(&request, Some("X-SSL")));
    }

    #[test]
    fn missing_header_is_insecure() {
        let request = RequestAdapter::new("index", "example.com", "/");
        assert!(!is_secure_request(&request, Some("X-SSL")));
    }
}
