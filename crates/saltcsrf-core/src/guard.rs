//! Issuing and validating tokens against a salt source.

use crate::config::CsrfConfig;
use crate::derive::{derive_hash, TokenHash};
use crate::error::{CsrfError, GenerateError};
use crate::salt::{EnvSaltSource, SaltList, SaltSource};
use crate::token::CsrfToken;
use crate::verify::{verify, Validation};
use std::sync::Arc;

/// A freshly issued token together with its hash under the current salt.
///
/// Hand the token to the client and store the hash where it can be read back
/// when the token is presented again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    token: CsrfToken,
    hash: TokenHash,
}

impl IssuedToken {
    /// The token for the client.
    pub fn token(&self) -> &CsrfToken {
        &self.token
    }

    /// The hash to keep server-side.
    pub fn hash(&self) -> &TokenHash {
        &self.hash
    }

    /// Split into `(token, hash)`.
    pub fn into_parts(self) -> (CsrfToken, TokenHash) {
        (self.token, self.hash)
    }
}

/// Issues anti-forgery tokens and validates them across salt rotations.
///
/// The guard holds no per-request state; every call reads a fresh salt list
/// from its source. Cloning is cheap.
///
/// # Example
///
/// ```rust
/// use saltcsrf_core::{CsrfGuard, SaltList};
///
/// let guard = CsrfGuard::new(SaltList::parse("current-salt,previous-salt"));
///
/// let issued = guard.generate().expect("salts are configured");
/// let result = guard.validate(issued.token().as_str(), issued.hash().as_str());
///
/// assert_eq!(result.salt_index(), Some(0));
/// ```
pub struct CsrfGuard<S = EnvSaltSource> {
    source: Arc<S>,
}

impl<S> Clone for CsrfGuard<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
        }
    }
}

impl<S> std::fmt::Debug for CsrfGuard<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsrfGuard").finish_non_exhaustive()
    }
}

impl CsrfGuard<EnvSaltSource> {
    /// Guard reading salts from `CSRF_SALTS`.
    pub fn from_env() -> Self {
        Self::new(EnvSaltSource::default())
    }

    /// Guard reading salts from the variable named in `config`.
    pub fn from_config(config: &CsrfConfig) -> Self {
        Self::new(config.salt_source())
    }
}

impl Default for CsrfGuard<EnvSaltSource> {
    fn default() -> Self {
        Self::from_env()
    }
}

impl<S: SaltSource> CsrfGuard<S> {
    /// Create a guard over an explicit salt source.
    pub fn new(source: S) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    /// The underlying salt source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Snapshot of the salts the guard would use right now.
    pub fn salt_list(&self) -> SaltList {
        self.source.salt_list()
    }

    /// Issue a new token and its hash under the current salt.
    ///
    /// # Errors
    ///
    /// Fails with [`CsrfError::NoSaltsConfigured`] when the source has no
    /// current salt. The token is generated before the salts are read and is
    /// still available through [`GenerateError::token`].
    pub fn generate(&self) -> Result<IssuedToken, GenerateError> {
        let token = CsrfToken::generate();
        let salts = self.source.salt_list();

        let Some(current) = salts.current().filter(|salt| !salt.is_empty()) else {
            trace_warn!("no salts configured, issuing token without a hash");
            return Err(GenerateError::new(
                token,
                CsrfError::no_salts("salt source returned no current salt"),
            ));
        };

        match derive_hash(token.as_str(), current) {
            Ok(hash) => {
                trace_debug!(salts = salts.len(), "issued CSRF token");
                Ok(IssuedToken { token, hash })
            }
            Err(err) => Err(GenerateError::new(token, err)),
        }
    }

    /// Validate a presented token against its stored hash.
    ///
    /// Every configured salt is tried, current first. See [`Validation`] for
    /// how to tell a current match from a retired one.
    pub fn validate(&self, token: &str, hash: &str) -> Validation {
        verify(token, hash, &self.source.salt_list())
    }
}

#[cfg(feature = "tokio")]
impl<S: SaltSource + 'static> CsrfGuard<S> {
    /// Validate on the blocking thread pool, giving up after `timeout`.
    ///
    /// Derivation cannot be cancelled: on timeout the pair is rejected while
    /// the blocking task runs to completion in the background.
    pub async fn validate_with_timeout(
        &self,
        token: impl Into<String>,
        hash: impl Into<String>,
        timeout: std::time::Duration,
    ) -> Validation {
        let guard = self.clone();
        let (token, hash) = (token.into(), hash.into());
        let task = tokio::task::spawn_blocking(move || guard.validate(&token, &hash));

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(validation)) => validation,
            Ok(Err(_err)) => {
                trace_warn!(error = %_err, "validation task failed, rejecting");
                Validation::Rejected
            }
            Err(_) => {
                trace_warn!(?timeout, "validation timed out, rejecting");
                Validation::Rejected
            }
        }
    }
}
