//! TOML configuration files.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::{
    host_problem, GlobalConfig, RedirectStatus, DEFAULT_INSECURE_PORT, DEFAULT_SECURE_PORT,
};
use crate::error::{ConfigError, ValidationError};

/// On-disk form of [`GlobalConfig`].
///
/// Only fixed hosts can be expressed in a file; resolvers are set through
/// [`GlobalConfig::builder`].
///
/// ```toml
/// secure_host = "secure.example.com"
/// secure_port = 443
/// insecure_port = 80
/// trusted_scheme_header = "X-Forwarded-Ssl"
/// redirect_status = 301
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Host used for HTTPS redirects (request host when absent)
    pub secure_host: Option<String>,
    /// HTTPS port
    pub secure_port: u16,
    /// Host used for HTTP redirects (request host when absent)
    pub insecure_host: Option<String>,
    /// HTTP port
    pub insecure_port: u16,
    /// Switches scheme enforcement off
    pub disable_check: bool,
    /// Header set by a trusted TLS terminator
    pub trusted_scheme_header: Option<String>,
    /// Numeric redirect status (302 when absent)
    pub redirect_status: Option<u16>,
}

impl Default for ConfigFile {
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

/// Loads and validates a configuration from a TOML file.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read, [`ConfigError::Parse`]
/// for malformed TOML, and [`ConfigError::Validation`] listing every semantic
/// problem found.
pub fn load_config(path: &Path) -> Result<GlobalConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = GlobalConfig::from_toml_str(&content)?;

    tracing::debug!(target: "protocol_guard", path = %path.display(), "configuration loaded");
    Ok(config)
}

/// Runs the semantic checks on a parsed configuration file.
///
/// # Errors
///
/// Returns every problem found, not just the first.
pub fn validate_config(file: &ConfigFile) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if file.secure_port == 0 {
        errors.push(ValidationError::new("secure_port", "must be non-zero"));
    }
    if file.insecure_port == 0 {
        errors.push(ValidationError::new("insecure_port", "must be non-zero"));
    }

    check_host("secure_host", file.secure_host.as_deref(), &mut errors);
    check_host("insecure_host", file.insecure_host.as_deref(), &mut errors);

    if let Some(name) = file.trusted_scheme_header.as_deref() {
        if !is_header_token(name) {
            errors.push(ValidationError::new(
                "trusted_scheme_header",
                format!("'{}' is not a valid header name", name),
            ));
        }
    }

    if let Some(code) = file.redirect_status {
        if RedirectStatus::from_code(code).is_none() {
            errors.push(ValidationError::new(
                "redirect_status",
                format!("{} is not one of 301, 302, 303, 307, 308", code),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_host(field: &'static str, host: Option<&str>, errors: &mut Vec<ValidationError>) {
    let Some(host) = host else {
        return;
    };

    if let Some(problem) = host_problem(host) {
        errors.push(ValidationError::new(field, format!("'{}' {}", host, problem)));
    }
}

// RFC 7230 token characters.
fn is_header_token(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b))
}
