use crate::scheme::header_scheme_hint;
use crate::web::GuardRequest;

/// What the guard needs to know about one request.
///
/// Gathered once per evaluation and dropped with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFacts<'a> {
    /// The transport itself reported TLS
    pub is_directly_secure: bool,
    /// The trusted scheme header was present
    pub header_scheme_hint: bool,
    /// Host the client addressed
    pub host: &'a str,
    /// Port the client connected to, when known
    pub port: Option<u16>,
    /// Path including the query string
    pub path: &'a str,
    /// Action the request is routed to
    pub action_name: &'a str,
}

impl<'a> RequestFacts<'a> {
    /// Reads the facts from a request, consulting `trusted_header` for the
    /// scheme hint.
    pub fn gather<R>(request: &'a R, trusted_header: Option<&str>) -> Self
    where
        R: GuardRequest + ?Sized,
    {
        Self {
            is_directly_secure: request.is_transport_secure(),
            header_scheme_hint: header_scheme_hint(request, trusted_header),
            host: request.host(),
            port: request.port(),
            path: request.full_path_with_query(),
            action_name: request.action_name(),
        }
    }

    /// Returns `true` if the request counts as secure.
    pub fn is_secure(&self) -> bool {
        self.is_directly_secure || self.header_scheme_hint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::RequestAdapter;

    #[test]
    fn gathers_all_fields() {
        let mut request = RequestAdapter::new("search", "example.com", "/search?q=rust");
        request.set_port(Some(8080));
        request.add_header("X-Forwarded-Ssl", "on");

        let facts = RequestFacts::gather(&request, Some("X-Forwarded-Ssl"));

        assert!(!facts.is_directly_secure);
        assert!(facts.header_scheme_hint);
        assert!(facts.is_secure());
        assert_eq!(facts.host, "example.com");
        assert_eq!(facts.port, Some(8080));
        assert_eq!(facts.path, "/search?q=rust");
        assert_eq!(facts.action_name, "search");
    }

    #[test]
    fn plain_request_is_not_secure() {
        let request = RequestAdapter::new("index", "example.com", "/");
        let facts = RequestFacts::gather(&request, None);

        assert!(!facts.is_secure());
    }
}
