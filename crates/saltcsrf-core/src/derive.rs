//! Memory-hard hash derivation.
//!
//! A token hash is the scrypt key derived from the token (as password) and
//! one salt, encoded as padded standard base64. The cost parameters are fixed
//! for the lifetime of the process: hashes issued under one set of parameters
//! never match under another.

use crate::error::{CsrfError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fmt;

/// scrypt CPU/memory cost as a power of two (N = 2^15).
pub const LOG_N: u8 = 15;

/// scrypt block size factor.
pub const R: u32 = 8;

/// scrypt parallelism factor.
pub const P: u32 = 1;

/// Length of the derived key in bytes.
pub const KEY_LEN: usize = 32;

/// Length of an encoded hash: padded base64 of [`KEY_LEN`] bytes.
pub const ENCODED_HASH_LEN: usize = (KEY_LEN + 2) / 3 * 4;

/// Base64 text of a derived key, stored alongside the token by the caller.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TokenHash(String);

impl TokenHash {
    /// Wrap an encoded hash presented by a caller.
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// Get the encoded hash.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the hash and return the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for TokenHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for TokenHash {
    fn from(hash: String) -> Self {
        Self(hash)
    }
}

impl fmt::Debug for TokenHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TokenHash").field(&"***").finish()
    }
}

impl fmt::Display for TokenHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Derive the hash of `token` under `salt`.
///
/// Both values are used as raw bytes, so a [`Salt`](crate::Salt) that is not
/// valid UTF-8 derives exactly as configured. An empty salt is rejected
/// before any expensive work is done.
///
/// # Errors
///
/// Returns [`CsrfError::InvalidInput`] when `salt` is empty.
///
/// # Aborts
///
/// The cost constants are compile-time values that scrypt always accepts.
/// If it rejects them anyway the build is broken, so the failure is logged
/// and the process aborts instead of returning an error per request.
pub fn derive_hash(token: impl AsRef<[u8]>, salt: impl AsRef<[u8]>) -> Result<TokenHash> {
    let (token, salt) = (token.as_ref(), salt.as_ref());
    if salt.is_empty() {
        return Err(CsrfError::invalid_input("empty salt"));
    }

    let params = match scrypt::Params::new(LOG_N, R, P, KEY_LEN) {
        Ok(params) => params,
        Err(err) => fatal(&err),
    };

    let mut key = [0u8; KEY_LEN];
    if let Err(err) = scrypt::scrypt(token, salt, &params, &mut key) {
        fatal(&err);
    }

    Ok(TokenHash(STANDARD.encode(key)))
}

fn fatal(err: &dyn fmt::Display) -> ! {
    trace_error!(error = %err, log_n = LOG_N, r = R, p = P, key_len = KEY_LEN, "scrypt rejected the fixed derivation parameters");
    eprintln!("saltcsrf: scrypt rejected the fixed derivation parameters: {err}");
    std::process::abort()
}
