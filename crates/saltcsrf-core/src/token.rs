use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use std::fmt;

/// Length of every generated token, in characters.
pub const TOKEN_LEN: usize = 32;

/// Draw `len` characters uniformly from `[A-Za-z0-9]` using the OS CSPRNG.
pub(crate) fn random_alphanumeric(len: usize) -> String {
    OsRng
        .sample_iter(Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// An opaque anti-forgery token handed to a client.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CsrfToken(String);

impl CsrfToken {
    /// Generate a fresh random token of [`TOKEN_LEN`] alphanumeric characters.
    pub fn generate() -> Self {
        Self(random_alphanumeric(TOKEN_LEN))
    }

    /// Wrap a token presented by a client.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Get the token string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the token and return the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for CsrfToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for CsrfToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for CsrfToken {
    fn from(token: &str) -> Self {
        Self(token.to_owned())
    }
}

impl fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CsrfToken").field(&"***").finish()
    }
}

impl fmt::Display for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
