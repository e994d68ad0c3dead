//! Configuration for the CSRF guard.
//!
//! # Example
//!
//! ```rust
//! use saltcsrf_core::{CsrfConfig, CsrfGuard};
//! use std::time::Duration;
//!
//! let config = CsrfConfig::new()
//!     .salts_env_key("MY_APP_CSRF_SALTS")
//!     .validation_timeout(Duration::from_secs(2));
//!
//! let guard = CsrfGuard::from_config(&config);
//! assert_eq!(guard.source().key(), "MY_APP_CSRF_SALTS");
//! ```

use crate::salt::{EnvSaltSource, DEFAULT_SALTS_ENV_KEY};
use std::time::Duration;

/// Default upper bound for an async validation.
pub const DEFAULT_VALIDATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for CSRF token issuing and validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsrfConfig {
    /// The environment variable holding the comma-separated salt list.
    /// Default: "CSRF_SALTS"
    pub salts_env_key: String,

    /// Deadline applied by async validation helpers.
    /// Default: 5 seconds
    pub validation_timeout: Duration,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            salts_env_key: DEFAULT_SALTS_ENV_KEY.to_string(),
            validation_timeout: DEFAULT_VALIDATION_TIMEOUT,
        }
    }
}

impl CsrfConfig {
    /// Create a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the environment variable the salts are read from.
    pub fn salts_env_key(mut self, key: impl Into<String>) -> Self {
        self.salts_env_key = key.into();
        self
    }

    /// Set the async validation deadline.
    pub fn validation_timeout(mut self, timeout: Duration) -> Self {
        self.validation_timeout = timeout;
        self
    }

    /// Build the salt source described by this configuration.
    pub fn salt_source(&self) -> EnvSaltSource {
        EnvSaltSource::new(self.salts_env_key.clone())
    }
}

/// Load environment variables from a `.env` file in the current directory.
///
/// Existing variables take precedence. A missing file is not an error.
#[cfg(feature = "dotenv")]
pub fn load_dotenv() {
    if let Err(_err) = dotenvy::dotenv() {
        trace_debug!(error = %_err, "no .env file loaded");
    }
}

/// Load environment variables from a specific file.
///
/// Existing variables take precedence.
///
/// # Errors
///
/// Returns the `dotenvy` error when the file is missing or malformed, since
/// an explicitly named file is expected to exist.
#[cfg(feature = "dotenv")]
pub fn load_dotenv_from<P: AsRef<std::path::Path>>(path: P) -> Result<(), dotenvy::Error> {
    dotenvy::from_path(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CsrfConfig::default();
        assert_eq!(config.salts_env_key, "CSRF_SALTS");
        assert_eq!(config.validation_timeout, Duration::from_secs(5));
        assert_eq!(config, CsrfConfig::new());
    }

    #[test]
    fn test_builder() {
        let config = CsrfConfig::new()
            .salts_env_key("OTHER_KEY")
            .validation_timeout(Duration::from_millis(250));

        assert_eq!(config.salts_env_key, "OTHER_KEY");
        assert_eq!(config.validation_timeout, Duration::from_millis(250));
        assert_eq!(config.salt_source().key(), "OTHER_KEY");
    }

    #[cfg(feature = "dotenv")]
    #[test]
    #[serial_test::serial]
    fn test_load_dotenv_from_does_not_override() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "SALTCSRF_DOTENV_NEW=from-file").unwrap();
        writeln!(file, "SALTCSRF_DOTENV_SET=from-file").unwrap();

        std::env::remove_var("SALTCSRF_DOTENV_NEW");
        std::env::set_var("SALTCSRF_DOTENV_SET", "from-env");

        load_dotenv_from(file.path()).unwrap();

        assert_eq!(std::env::var("SALTCSRF_DOTENV_NEW").unwrap(), "from-file");
        assert_eq!(std::env::var("SALTCSRF_DOTENV_SET").unwrap(), "from-env");

        std::env::remove_var("SALTCSRF_DOTENV_NEW");
        std::env::remove_var("SALTCSRF_DOTENV_SET");
    }

    #[cfg(feature = "dotenv")]
    #[test]
    fn test_load_dotenv_from_missing_file() {
        assert!(load_dotenv_from("/definitely/not/here/.env").is_err());
    }
}
