//! Error types for saltcsrf

use crate::token::CsrfToken;
use std::fmt;
use thiserror::Error;

/// Result type alias for saltcsrf operations
pub type Result<T, E = CsrfError> = std::result::Result<T, E>;

/// Errors surfaced by token issuing and hash derivation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CsrfError {
    /// The salt source produced no usable current salt.
    ///
    /// CSRF protection is unavailable until salts are provisioned; the caller
    /// decides whether to deny the request.
    #[error("No salts configured: {0}")]
    NoSaltsConfigured(String),

    /// An empty salt reached the derivation step.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CsrfError {
    /// Create a `NoSaltsConfigured` error
    pub fn no_salts(message: impl Into<String>) -> Self {
        Self::NoSaltsConfigured(message.into())
    }

    /// Create an `InvalidInput` error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

/// Failure of [`CsrfGuard::generate`](crate::CsrfGuard::generate).
///
/// A token is produced before the salts are consulted, so it is handed back
/// even when no hash could be derived for it.
pub struct GenerateError {
    token: CsrfToken,
    source: CsrfError,
}

impl GenerateError {
    pub(crate) fn new(token: CsrfToken, source: CsrfError) -> Self {
        Self { token, source }
    }

    /// The token that was generated before hashing failed.
    pub fn token(&self) -> &CsrfToken {
        &self.token
    }

    /// Consume the error and keep the generated token.
    pub fn into_token(self) -> CsrfToken {
        self.token
    }

    /// The underlying error kind.
    pub fn kind(&self) -> &CsrfError {
        &self.source
    }
}

impl fmt::Debug for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerateError")
            .field("token", &self.token)
            .field("source", &self.source)
            .finish()
    }
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to issue CSRF token: {}", self.source)
    }
}

impl std::error::Error for GenerateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl From<GenerateError> for CsrfError {
    fn from(err: GenerateError) -> Self {
        err.source
    }
}
