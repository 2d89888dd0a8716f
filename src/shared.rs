use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::{load_config, GlobalConfig};
use crate::error::ConfigError;

/// Cloneable handle to the current [`GlobalConfig`] snapshot.
///
/// Readers take a whole snapshot per request; reconfiguration swaps in a new
/// snapshot atomically, so a request never sees a half-updated config.
///
/// # Examples
///
/// ```
/// use protocol_guard::{GlobalConfig, SharedConfig};
///
/// let shared = SharedConfig::new(GlobalConfig::default());
/// let before = shared.snapshot();
///
/// shared.store(GlobalConfig::builder().secure_port(8443).build());
///
/// assert_eq!(before.secure_port(), 443);
/// assert_eq!(shared.snapshot().secure_port(), 8443);
/// ```
#[derive(Debug, Clone)]
pub struct SharedConfig {
    inner: Arc<ArcSwap<GlobalConfig>>,
}

impl SharedConfig {
    /// Wraps an initial configuration.
    pub fn new(config: GlobalConfig) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(config)),
        }
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> Arc<GlobalConfig> {
        self.inner.load_full()
    }

    /// Replaces the configuration for all subsequent readers.
    pub fn store(&self, config: GlobalConfig) {
        self.inner.store(Arc::new(config));
        tracing::info!(target: "protocol_guard", "configuration replaced");
    }

    /// Loads `path` and swaps it in.
    ///
    /// # Errors
    ///
    /// Returns the load error and keeps the current configuration in place.
    pub fn reload_from(&self, path: &Path) -> Result<(), ConfigError> {
        match load_config(path) {
            Ok(config) => {
                self.store(config);
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    target: "protocol_guard",
                    path = %path.display(),
                    error = %e,
                    "failed to reload configuration, keeping current"
                );
                Err(e)
            }
        }
    }
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self::new(GlobalConfig::default())
    }
}

impl From<GlobalConfig> for SharedConfig {
    fn from(config: GlobalConfig) -> Self {
        Self::new(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn clones_observe_the_same_swaps() {
        let shared = SharedConfig::default();
        let other = shared.clone();

        shared.store(GlobalConfig::builder().disable_check(true).build());

        assert!(other.snapshot().is_check_disabled());
    }

    #[test]
    fn reload_swaps_on_success() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "insecure_port = 8080").expect("write");

        let shared = SharedConfig::default();
        shared.reload_from(file.path()).expect("reload succeeds");

        assert_eq!(shared.snapshot().insecure_port(), 8080);
    }

    #[test]
    fn failed_reload_keeps_current() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "secure_port = 0").expect("write");

        let shared = SharedConfig::new(GlobalConfig::builder().secure_port(8443).build());
        let result = shared.reload_from(file.path());

        assert!(matches!(result, Err(ConfigError::Validation(_))));
        assert_eq!(shared.snapshot().secure_port(), 8443);
    }

    #[test]
    fn snapshots_are_shareable_across_threads() {
        let shared = SharedConfig::default();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                std::thread::spawn(move || shared.snapshot().secure_port())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().expect("thread"), 443);
        }
    }
}
