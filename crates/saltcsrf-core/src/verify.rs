//! Checking a presented (token, hash) pair against the salt list.

use crate::derive::derive_hash;
use crate::salt::SaltList;
use subtle::ConstantTimeEq;

/// Outcome of validating a (token, hash) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// The hash was reproduced under the salt at `salt_index` (0 is current).
    Matched {
        /// Position of the matching salt in the list.
        salt_index: usize,
    },
    /// No salt reproduced the hash, no salts were configured, or an internal
    /// derivation error occurred.
    Rejected,
}

impl Validation {
    /// Whether the pair was accepted.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }

    /// Index of the matching salt, if any.
    pub fn salt_index(&self) -> Option<usize> {
        match self {
            Self::Matched { salt_index } => Some(*salt_index),
            Self::Rejected => None,
        }
    }

    /// The pair matched under a retired salt.
    ///
    /// Callers typically issue a fresh token under the current salt when this
    /// returns `true`.
    pub fn needs_reissue(&self) -> bool {
        matches!(self, Self::Matched { salt_index } if *salt_index > 0)
    }

    /// `(matched, salt_index)` with `-1` standing for "no salt".
    pub fn as_pair(&self) -> (bool, isize) {
        match self {
            Self::Matched { salt_index } => {
                (true, isize::try_from(*salt_index).unwrap_or(isize::MAX))
            }
            Self::Rejected => (false, -1),
        }
    }
}

/// Re-derive `hash` for `token` under each salt, current first.
///
/// Stops at the first match. A derivation error on any salt rejects the whole
/// pair without trying the remaining salts.
pub fn verify(token: &str, hash: &str, salts: &SaltList) -> Validation {
    if salts.is_empty() {
        trace_debug!("no salts configured, rejecting");
        return Validation::Rejected;
    }

    for (salt_index, salt) in salts.iter().enumerate() {
        let computed = match derive_hash(token, salt) {
            Ok(computed) => computed,
            Err(_err) => {
                trace_warn!(salt_index, error = %_err, "derivation failed, rejecting");
                return Validation::Rejected;
            }
        };

        if hashes_equal(computed.as_str(), hash) {
            trace_debug!(salt_index, "token hash matched");
            return Validation::Matched { salt_index };
        }
    }

    trace_debug!(salts = salts.len(), "no salt matched");
    Validation::Rejected
}

/// Constant-time comparison of two encoded hashes.
///
/// Only the length leaks, and every valid hash has the same length.
fn hashes_equal(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
