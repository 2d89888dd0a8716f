//! Redirect target reconstruction.
//!
//! The target keeps the request's path and query string and swaps in the
//! configured host and port for the target scheme.
//!
//! # Port translation
//!
//! When the request arrived on the other scheme's configured port, the
//! target scheme's configured port is used. Otherwise the request's own port
//! is kept, so a client reaching the app through a port-translating proxy
//! stays on that port. Ports 80 and 443 are never written into the URL.

use crate::config::GlobalConfig;
use crate::facts::RequestFacts;
use crate::scheme::Scheme;

/// Ports browsers assume when none is given.
pub const NORMAL_PORTS: [u16; 2] = [80, 443];

/// Builds the absolute URL to redirect a request to.
///
/// # Examples
///
/// ```
/// use protocol_guard::{redirect_url, GlobalConfig, RequestFacts, Scheme};
/// use protocol_guard::web::RequestAdapter;
///
/// let config = GlobalConfig::default();
/// let mut request = RequestAdapter::new("show", "example.com", "/foo?x=1");
/// request.set_port(Some(80));
///
/// let facts = RequestFacts::gather(&request, None);
/// assert_eq!(redirect_url(&config, &facts, Scheme::Secure), "https://example.com/foo?x=1");
/// ```
pub fn redirect_url(config: &GlobalConfig, facts: &RequestFacts<'_>, target: Scheme) -> String {
    let host = config
        .host_for(target)
        .unwrap_or_else(|| facts.host.to_string());

    format!(
        "{}://{}{}{}",
        target.protocol(),
        host,
        port_string(config, facts.port, target),
        facts.path
    )
}

/// Picks the port the redirect target should use.
pub fn effective_port(config: &GlobalConfig, request_port: Option<u16>, target: Scheme) -> u16 {
    let target_port = config.port_for(target);

    match request_port {
        Some(port) if port == config.port_for(target.opposite()) => target_port,
        Some(port) => port,
        None => target_port,
    }
}

/// Renders the `:<port>` suffix for the redirect target, empty for normal ports.
pub fn port_string(config: &GlobalConfig, request_port: Option<u16>, target: Scheme) -> String {
    let port = effective_port(config, request_port, target);

    if is_normal_port(port) {
        String::new()
    } else {
        format!(":{}", port)
    }
}

/// Returns `true` for the ports omitted from rendered URLs.
pub fn is_normal_port(port: u16) -> bool {
    NORMAL_PORTS.contains(&port)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::RequestAdapter;

    fn url_for(config: &GlobalConfig, port: Option<u16>, target: Scheme) -> String {
        let mut request = RequestAdapter::new("show", "example.com", "/path");
        request.set_port(port);
        redirect_url(config, &RequestFacts::gather(&request, None), target)
    }

    #[test]
    fn default_port_upgrade_drops_port() {
        let config = GlobalConfig::default();
        assert_eq!(url_for(&config, Some(80), Scheme::Secure), "https://example.com/path");
    }

    #[test]
    fn translated_port_is_kept_on_upgrade() {
        let config = GlobalConfig::default();
        assert_eq!(url_for(&config, Some(8080), Scheme::Secure), "https://example.com:8080/path");
    }

    #[test]
    fn default_port_downgrade_drops_port() {
        let config = GlobalConfig::default();
        assert_eq!(url_for(&config, Some(443), Scheme::Insecure), "http://example.com/path");
    }

    #[test]
    fn custom_ports_are_swapped() {
        let config = GlobalConfig::builder()
            .secure_port(8443)
            .insecure_port(8080)
            .build();

        assert_eq!(url_for(&config, Some(8080), Scheme::Secure), "https://example.com:8443/path");
        assert_eq!(url_for(&config, Some(8443), Scheme::Insecure), "http://example.com:8080/path");
    }

    #[test]
    fn missing_port_uses_target_port() {
        let config = GlobalConfig::builder().secure_port(8443).build();

        assert_eq!(url_for(&config, None, Scheme::Secure), "https://example.com:8443/path");
        assert_eq!(url_for(&config, None, Scheme::Insecure), "http://example.com/path");
    }

    #[test]
    fn normal_request_port_is_never_rendered() {
        // 443 is not the configured insecure port here, so it is kept as-is and then omitted.
        let config = GlobalConfig::builder().insecure_port(8080).build();
        assert_eq!(url_for(&config, Some(443), Scheme::Secure), "https://example.com/path");
    }

    #[test]
    fn configured_host_replaces_request_host() {
        let config = GlobalConfig::builder()
            .secure_host("secure.example.com")
            .insecure_host("www.example.com")
            .build();

        assert_eq!(url_for(&config, Some(80), Scheme::Secure), "https://secure.example.com/path");
        assert_eq!(url_for(&config, Some(443), Scheme::Insecure), "http://www.example.com/path");
    }

    #[test]
    fn failing_resolver_falls_back_to_request_host() {
        let config = GlobalConfig::builder()
            .secure_host_with(|| Err("no address".into()))
            .build();

        assert_eq!(url_for(&config, Some(80), Scheme::Secure), "https://example.com/path");
    }

    #[test]
    fn ipv6_host_passes_through() {
        let config = GlobalConfig::default();
        let mut request = RequestAdapter::new("show", "[::1]", "/");
        request.set_port(Some(3000));

        let facts = RequestFacts::gather(&request, None);
        assert_eq!(redirect_url(&config, &facts, Scheme::Secure), "https://[::1]:3000/");
    }

    #[test]
    fn effective_port_rules() {
        let config = GlobalConfig::default();

        assert_eq!(effective_port(&config, Some(80), Scheme::Secure), 443);
        assert_eq!(effective_port(&config, Some(3000), Scheme::Secure), 3000);
        assert_eq!(effective_port(&config, None, Scheme::Secure), 443);
        assert_eq!(effective_port(&config, Some(443), Scheme::Insecure), 80);
        assert_eq!(effective_port(&config, None, Scheme::Insecure), 80);
    }
}
