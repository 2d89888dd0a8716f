//! Process-wide guard configuration.
//!
//! A [`GlobalConfig`] is an immutable snapshot built once at startup, either
//! programmatically through [`GlobalConfig::builder`] or from a TOML file via
//! [`load_config`]. Request handling only ever reads it; hot reconfiguration
//! replaces the whole snapshot through [`SharedConfig`](crate::SharedConfig).
//!
//! # Host sources
//!
//! The secure and insecure hosts are optional. When set they are either a
//! fixed string or a resolver invoked on every read, for deployments where
//! the public host name is only known at runtime (for example the current
//! address of a load balancer). A failing resolver, or one that returns a
//! name that cannot be placed in a `Location` header, counts as "not
//! configured" and the request's own host is used instead.

mod file;

use std::fmt;
use std::sync::Arc;

pub use file::{load_config, validate_config, ConfigFile};

use crate::scheme::Scheme;

/// Port served over HTTPS unless configured otherwise.
pub const DEFAULT_SECURE_PORT: u16 = 443;

/// Port served over plain HTTP unless configured otherwise.
pub const DEFAULT_INSECURE_PORT: u16 = 80;

/// Error returned by a dynamic host resolver.
pub type HostResolveError = Box<dyn std::error::Error + Send + Sync>;

type Resolver = Arc<dyn Fn() -> Result<String, HostResolveError> + Send + Sync>;

/// Where a configured host name comes from.
#[derive(Clone)]
pub enum HostSource {
    /// A fixed host name
    Static(String),
    /// A resolver invoked each time the host is read
    Dynamic(Resolver),
}

impl HostSource {
    /// Creates a fixed host source.
    pub fn fixed(host: impl Into<String>) -> Self {
        HostSource::Static(host.into())
    }

    /// Creates a host source backed by `resolver`.
    ///
    /// The resolver must be fast and free of side effects; it runs on the
    /// request path.
    pub fn dynamic<F>(resolver: F) -> Self
    where
        F: Fn() -> Result<String, HostResolveError> + Send + Sync + 'static,
    {
        HostSource::Dynamic(Arc::new(resolver))
    }

    /// Resolves the host name.
    ///
    /// # Errors
    ///
    /// Returns whatever error a dynamic resolver reports. Static hosts never
    /// fail.
    pub fn resolve(&self) -> Result<String, HostResolveError> {
        match self {
            HostSource::Static(host) => Ok(host.clone()),
            HostSource::Dynamic(resolver) => resolver(),
        }
    }
}

impl fmt::Debug for HostSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostSource::Static(host) => f.debug_tuple("Static").field(host).finish(),
            HostSource::Dynamic(_) => f.write_str("Dynamic(<resolver>)"),
        }
    }
}

impl From<&str> for HostSource {
    fn from(host: &str) -> Self {
        HostSource::fixed(host)
    }
}

impl From<String> for HostSource {
    fn from(host: String) -> Self {
        HostSource::Static(host)
    }
}

/// HTTP status used for scheme redirects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RedirectStatus {
    /// 301 Moved Permanently
    MovedPermanently,
    /// 302 Found
    #[default]
    Found,
    /// 303 See Other
    SeeOther,
    /// 307 Temporary Redirect
    TemporaryRedirect,
    /// 308 Permanent Redirect
    PermanentRedirect,
}

impl RedirectStatus {
    /// Returns the numeric status code.
    pub fn code(self) -> u16 {
        match self {
            RedirectStatus::MovedPermanently => 301,
            RedirectStatus::Found => 302,
            RedirectStatus::SeeOther => 303,
            RedirectStatus::TemporaryRedirect => 307,
            RedirectStatus::PermanentRedirect => 308,
        }
    }

    /// Maps a numeric code back to a redirect status, if it is one.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            301 => Some(RedirectStatus::MovedPermanently),
            302 => Some(RedirectStatus::Found),
            303 => Some(RedirectStatus::SeeOther),
            307 => Some(RedirectStatus::TemporaryRedirect),
            308 => Some(RedirectStatus::PermanentRedirect),
            _ => None,
        }
    }

    /// Returns the canonical reason phrase.
    pub fn reason(self) -> &'static str {
        match self {
            RedirectStatus::MovedPermanently => "Moved Permanently",
            RedirectStatus::Found => "Found",
            RedirectStatus::SeeOther => "See Other",
            RedirectStatus::TemporaryRedirect => "Temporary Redirect",
            RedirectStatus::PermanentRedirect => "Permanent Redirect",
        }
    }
}

impl fmt::Display for RedirectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.reason())
    }
}

/// Process-wide guard settings.
///
/// # Examples
///
/// ```
/// use protocol_guard::{GlobalConfig, RedirectStatus, Scheme};
///
/// let config = GlobalConfig::builder()
///     .secure_host("secure.example.com")
///     .secure_port(8443)
///     .redirect_status(RedirectStatus::MovedPermanently)
///     .build();
///
/// assert_eq!(config.host_for(Scheme::Secure).as_deref(), Some("secure.example.com"));
/// assert_eq!(config.host_for(Scheme::Insecure), None);
/// assert_eq!(config.port_for(Scheme::Insecure), 80);
/// assert_eq!(config.redirect_status(), RedirectStatus::MovedPermanently);
/// ```
#[derive(Debug, Clone)]
pub struct GlobalConfig {
    secure_host: Option<HostSource>,
    secure_port: u16,
    insecure_host: Option<HostSource>,
    insecure_port: u16,
    disable_check: bool,
    trusted_scheme_header: Option<String>,
    redirect_status: Option<RedirectStatus>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            secure_host: None,
            secure_port: DEFAULT_SECURE_PORT,
            insecure_host: None,
            insecure_port: DEFAULT_INSECURE_PORT,
            disable_check: false,
            trusted_scheme_header: None,
            redirect_status: None,
        }
    }
}

impl GlobalConfig {
    /// Starts building a configuration from the defaults.
    pub fn builder() -> GlobalConfigBuilder {
        GlobalConfigBuilder::default()
    }

    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`](crate::ConfigError::Parse) for malformed
    /// TOML and [`ConfigError::Validation`](crate::ConfigError::Validation)
    /// when values are out of range.
    pub fn from_toml_str(content: &str) -> Result<Self, crate::ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        validate_config(&file).map_err(crate::ConfigError::Validation)?;
        Ok(file.into())
    }

    /// Resolves the configured host for `scheme`.
    ///
    /// Returns `None` when no host is configured, a dynamic resolver fails,
    /// or the resolved name is unusable (see [`host_problem`]); callers fall
    /// back to the request's own host.
    pub fn host_for(&self, scheme: Scheme) -> Option<String> {
        let source = match scheme {
            Scheme::Secure => self.secure_host.as_ref(),
            Scheme::Insecure => self.insecure_host.as_ref(),
        }?;

        let host = match source.resolve() {
            Ok(host) => host,
            Err(e) => {
                tracing::warn!(
                    target: "protocol_guard",
                    scheme = %scheme,
                    error = %e,
                    "host resolver failed, falling back to request host"
                );
                return None;
            }
        };

        if let Some(problem) = host_problem(&host) {
            tracing::warn!(
                target: "protocol_guard",
                scheme = %scheme,
                host = ?host,
                problem,
                "configured host is unusable, falling back to request host"
            );
            return None;
        }

        Some(host)
    }

    /// Returns the configured port for `scheme`.
    pub fn port_for(&self, scheme: Scheme) -> u16 {
        match scheme {
            Scheme::Secure => self.secure_port,
            Scheme::Insecure => self.insecure_port,
        }
    }

    /// Returns the configured HTTPS port.
    pub fn secure_port(&self) -> u16 {
        self.secure_port
    }

    /// Returns the configured HTTP port.
    pub fn insecure_port(&self) -> u16 {
        self.insecure_port
    }

    /// Returns `true` when scheme enforcement is switched off entirely.
    pub fn is_check_disabled(&self) -> bool {
        self.disable_check
    }

    /// Returns the name of the header that marks a request as secure, if any.
    pub fn trusted_scheme_header(&self) -> Option<&str> {
        self.trusted_scheme_header.as_deref()
    }

    /// Returns the redirect status, defaulting to `302 Found`.
    pub fn redirect_status(&self) -> RedirectStatus {
        self.redirect_status.unwrap_or_default()
    }
}

/// Returns why `host` cannot be used as a redirect host, or `None` if it can.
///
/// A usable host is non-blank, carries no scheme or path, and has no
/// whitespace or control characters, so the rebuilt URL is always a valid
/// `Location` header value.
pub fn host_problem(host: &str) -> Option<&'static str> {
    if host.trim().is_empty() {
        Some("must not be empty")
    } else if host.contains("://") || host.contains('/') {
        Some("must be a bare host name without scheme or path")
    } else if host.chars().any(|c| c.is_whitespace() || c.is_control()) {
        Some("must not contain whitespace or control characters")
    } else {
        None
    }
}

/// Builder for [`GlobalConfig`].
#[derive(Debug, Default)]
pub struct GlobalConfigBuilder {
    config: GlobalConfig,
}

impl GlobalConfigBuilder {
    /// Sets a fixed HTTPS host.
    pub fn secure_host(mut self, host: impl Into<HostSource>) -> Self {
        self.config.secure_host = Some(host.into());
        self
    }

    /// Sets a resolver for the HTTPS host.
    pub fn secure_host_with<F>(mut self, resolver: F) -> Self
    where
        F: Fn() -> Result<String, HostResolveError> + Send + Sync + 'static,
    {
        self.config.secure_host = Some(HostSource::dynamic(resolver));
        self
    }

    /// Sets the HTTPS port.
    pub fn secure_port(mut self, port: u16) -> Self {
        self.config.secure_port = port;
        self
    }

    /// Sets a fixed HTTP host.
    pub fn insecure_host(mut self, host: impl Into<HostSource>) -> Self {
        self.config.insecure_host = Some(host.into());
        self
    }

    /// Sets a resolver for the HTTP host.
    pub fn insecure_host_with<F>(mut self, resolver: F) -> Self
    where
        F: Fn() -> Result<String, HostResolveError> + Send + Sync + 'static,
    {
        self.config.insecure_host = Some(HostSource::dynamic(resolver));
        self
    }

    /// Sets the HTTP port.
    pub fn insecure_port(mut self, port: u16) -> Self {
        self.config.insecure_port = port;
        self
    }

    /// Turns scheme enforcement off (every request is allowed).
    pub fn disable_check(mut self, disabled: bool) -> Self {
        self.config.disable_check = disabled;
        self
    }

    /// Sets the header an upstream TLS terminator uses to mark secure requests.
    pub fn trusted_scheme_header(mut self, name: impl Into<String>) -> Self {
        self.config.trusted_scheme_header = Some(name.into());
        self
    }

    /// Overrides the default `302 Found` redirect status.
    pub fn redirect_status(mut self, status: RedirectStatus) -> Self {
        self.config.redirect_status = Some(status);
        self
    }

    /// Finishes the configuration.
    pub fn build(self) -> GlobalConfig {
        self.config
    }
}

impl From<ConfigFile> for GlobalConfig {
    fn from(file: ConfigFile) -> Self {
        Self {
            secure_host: file.secure_host.map(HostSource::Static),
            secure_port: file.secure_port,
            insecure_host: file.insecure_host.map(HostSource::Static),
            insecure_port: file.insecure_port,
            disable_check: file.disable_check,
            trusted_scheme_header: file.trusted_scheme_header,
            redirect_status: file.redirect_status.and_then(RedirectStatus::from_code),
        }
    }
}
