//! Salt lists and the sources they are read from.
//!
//! A salt list is configured as a single comma-separated value, most current
//! salt first:
//!
//! ```text
//! CSRF_SALTS=current-salt,previous-salt,oldest-salt
//! ```
//!
//! Hashes are always issued under the first salt. Later salts are retired
//! but still accepted by validation, which gives a transition window when
//! rotating.
//!
//! Salts are byte strings. A value read from the environment is used exactly
//! as the operating system hands it over, whether or not it is valid UTF-8.

use crate::error::{CsrfError, Result};
use crate::token::random_alphanumeric;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Environment variable read by [`EnvSaltSource::default`].
pub const DEFAULT_SALTS_ENV_KEY: &str = "CSRF_SALTS";

/// Delimiter between salts in a configuration value.
pub const SALT_DELIMITER: char = ',';

const DELIMITER_BYTE: u8 = b',';

/// Server-held secret mixed into every derived hash.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Salt(Vec<u8>);

impl Salt {
    /// Wrap an exact salt value. No trimming is applied.
    pub fn new(salt: impl Into<Vec<u8>>) -> Self {
        Self(salt.into())
    }

    /// Generate a random alphanumeric salt of `len` characters.
    ///
    /// Intended for provisioning; the value must not contain the list
    /// delimiter, which the alphanumeric alphabet guarantees.
    pub fn generate(len: usize) -> Self {
        Self(random_alphanumeric(len).into_bytes())
    }

    /// Raw salt bytes as fed to the key derivation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The salt as text, if it is valid UTF-8.
    pub fn to_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    /// An empty salt is never a legitimate key.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for Salt {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for Salt {
    fn from(salt: &str) -> Self {
        Self(salt.as_bytes().to_vec())
    }
}

impl From<String> for Salt {
    fn from(salt: String) -> Self {
        Self(salt.into_bytes())
    }
}

impl From<&[u8]> for Salt {
    fn from(salt: &[u8]) -> Self {
        Self(salt.to_vec())
    }
}

impl From<Vec<u8>> for Salt {
    fn from(salt: Vec<u8>) -> Self {
        Self(salt)
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Salt").field(&"***").finish()
    }
}

/// Ordered salts, current first and oldest last.
///
/// A list whose first element would be empty collapses to the empty list,
/// so `""` and an unset variable both mean "no salts".
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SaltList(Vec<Salt>);

impl SaltList {
    /// Create an empty salt list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma-separated configuration value.
    ///
    /// Order is preserved, nothing is trimmed or deduplicated.
    pub fn parse(value: &str) -> Self {
        Self::parse_bytes(value.as_bytes())
    }

    /// Parse a comma-separated configuration value given as raw bytes.
    pub fn parse_bytes(value: &[u8]) -> Self {
        value
            .split(|byte| *byte == DELIMITER_BYTE)
            .map(Salt::from)
            .collect()
    }

    /// Number of salts in the list.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list holds no salts.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The salt new hashes are issued under.
    pub fn current(&self) -> Option<&Salt> {
        self.0.first()
    }

    /// Salt at `index`, where 0 is current.
    pub fn get(&self, index: usize) -> Option<&Salt> {
        self.0.get(index)
    }

    /// Iterate current first, oldest last.
    pub fn iter(&self) -> std::slice::Iter<'_, Salt> {
        self.0.iter()
    }

    /// Put `new` in front and keep at most `keep` salts in total.
    ///
    /// The oldest salts are dropped first. A `keep` of zero is treated as one
    /// so the result always holds the new salt.
    pub fn rotate(&self, new: Salt, keep: usize) -> Result<Self> {
        if new.is_empty() {
            return Err(CsrfError::invalid_input("cannot rotate in an empty salt"));
        }
        if new.as_bytes().contains(&DELIMITER_BYTE) {
            return Err(CsrfError::invalid_input(
                "salt must not contain the list delimiter",
            ));
        }

        let salts = std::iter::once(new)
            .chain(self.0.iter().cloned())
            .take(keep.max(1))
            .collect();
        Ok(Self(salts))
    }

    /// The configuration value as raw bytes, the exact inverse of
    /// [`SaltList::parse_bytes`].
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut value = Vec::new();
        for (idx, salt) in self.0.iter().enumerate() {
            if idx > 0 {
                value.push(DELIMITER_BYTE);
            }
            value.extend_from_slice(salt.as_bytes());
        }
        value
    }
}

impl FromIterator<Salt> for SaltList {
    fn from_iter<I: IntoIterator<Item = Salt>>(iter: I) -> Self {
        let salts: Vec<Salt> = iter.into_iter().collect();
        match salts.first() {
            Some(first) if !first.is_empty() => Self(salts),
            _ => Self::default(),
        }
    }
}

impl From<Vec<Salt>> for SaltList {
    fn from(salts: Vec<Salt>) -> Self {
        salts.into_iter().collect()
    }
}

impl FromStr for SaltList {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl<'a> IntoIterator for &'a SaltList {
    type Item = &'a Salt;
    type IntoIter = std::slice::Iter<'a, Salt>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Renders the configuration value, the inverse of [`SaltList::parse`] for
/// UTF-8 salts. Other bytes are shown as U+FFFD; use [`SaltList::to_bytes`]
/// to get the value back exactly.
///
/// The output contains the secrets themselves; only print it where the
/// operator asked for it.
impl fmt::Display for SaltList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.to_bytes()))
    }
}

impl fmt::Debug for SaltList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaltList").field("len", &self.0.len()).finish()
    }
}

/// Supplies the ordered list of candidate salts.
///
/// Implementations are consulted on every call, so a source backed by live
/// configuration picks up rotations without a restart.
pub trait SaltSource: Send + Sync {
    /// Current salts, most recent first.
    fn salt_list(&self) -> SaltList;
}

impl SaltSource for SaltList {
    fn salt_list(&self) -> SaltList {
        self.clone()
    }
}

impl<S: SaltSource + ?Sized> SaltSource for Arc<S> {
    fn salt_list(&self) -> SaltList {
        (**self).salt_list()
    }
}

impl<S: SaltSource + ?Sized> SaltSource for &S {
    fn salt_list(&self) -> SaltList {
        (**self).salt_list()
    }
}

/// Reads the salt list from a process environment variable on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvSaltSource {
    key: String,
}

impl EnvSaltSource {
    /// Read salts from the variable named `key`.
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Name of the environment variable.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Default for EnvSaltSource {
    fn default() -> Self {
        Self::new(DEFAULT_SALTS_ENV_KEY)
    }
}

impl SaltSource for EnvSaltSource {
    fn salt_list(&self) -> SaltList {
        match std::env::var_os(&self.key) {
            Some(value) => SaltList::parse_bytes(&os_bytes(&value)),
            None => SaltList::new(),
        }
    }
}

#[cfg(unix)]
fn os_bytes(value: &std::ffi::OsStr) -> std::borrow::Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    std::borrow::Cow::Borrowed(value.as_bytes())
}

// Other platforms have no byte view of the environment; unpaired surrogates
// become U+FFFD.
#[cfg(not(unix))]
fn os_bytes(value: &std::ffi::OsStr) -> std::borrow::Cow<'_, [u8]> {
    match value.to_string_lossy() {
        std::borrow::Cow::Borrowed(text) => std::borrow::Cow::Borrowed(text.as_bytes()),
        std::borrow::Cow::Owned(text) => std::borrow::Cow::Owned(text.into_bytes()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serial_test::serial;

    const TEST_KEY: &str = "SALTCSRF_TEST_SALT_SOURCE";

    fn strings(list: &SaltList) -> Vec<&str> {
        list.iter().map(|salt| salt.to_str().unwrap()).collect()
    }

    #[test]
    fn test_parse_two_salts() {
        let list = SaltList::parse("one,two");
        assert_eq!(strings(&list), vec!["one", "two"]);
        assert_eq!(list.current().and_then(Salt::to_str), Some("one"));
    }

    #[test]
    fn test_parse_single_salt() {
        assert_eq!(strings(&SaltList::parse("one")), vec!["one"]);
    }

    #[test]
    fn test_parse_empty_value() {
        let list = SaltList::parse("");
        assert!(list.is_empty());
        assert!(list.current().is_none());
    }

    #[test]
    fn test_parse_leading_empty_collapses() {
        assert!(SaltList::parse(",two").is_empty());
    }

    #[test]
    fn test_parse_keeps_whitespace_and_duplicates() {
        let list = SaltList::parse(" one,one,two ");
        assert_eq!(strings(&list), vec![" one", "one", "two "]);
    }

    #[test]
    fn test_parse_keeps_inner_empty_salt() {
        let list = SaltList::parse("one,,two");
        assert_eq!(strings(&list), vec!["one", "", "two"]);
    }

    #[test]
    fn test_from_vec_normalizes_empty_first() {
        let list = SaltList::from(vec![Salt::new(""), Salt::new("two")]);
        assert!(list.is_empty());
    }

    #[test]
    fn test_rotate_prepends_and_truncates() {
        let list = SaltList::parse("b,c,d");

        let rotated = list.rotate(Salt::new("a"), 3).unwrap();
        assert_eq!(strings(&rotated), vec!["a", "b", "c"]);

        let rotated = list.rotate(Salt::new("a"), 10).unwrap();
        assert_eq!(strings(&rotated), vec!["a", "b", "c", "d"]);

        let rotated = list.rotate(Salt::new("a"), 0).unwrap();
        assert_eq!(strings(&rotated), vec!["a"]);
    }

    #[test]
    fn test_rotate_into_empty_list() {
        let rotated = SaltList::new().rotate(Salt::new("first"), 2).unwrap();
        assert_eq!(strings(&rotated), vec!["first"]);
    }

    #[test]
    fn test_rotate_rejects_bad_salts() {
        let list = SaltList::parse("b");
        assert!(matches!(
            list.rotate(Salt::new(""), 2),
            Err(CsrfError::InvalidInput(_))
        ));
        assert!(matches!(
            list.rotate(Salt::new("x,y"), 2),
            Err(CsrfError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_generated_salt() {
        let salt = Salt::generate(48);
        assert_eq!(salt.as_bytes().len(), 48);
        assert!(!salt.to_str().unwrap().contains(SALT_DELIMITER));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let list = SaltList::parse("secret-one,secret-two");
        let debug = format!("{:?} {:?}", list, list.current());
        assert!(!debug.contains("secret"));
        assert!(debug.contains("len: 2"));
    }

    #[test]
    fn test_static_source() {
        let list = SaltList::parse("one,two");
        let shared = Arc::new(list.clone());
        assert_eq!(list.salt_list(), list);
        assert_eq!(shared.salt_list(), list);
        assert_eq!((&list).salt_list(), list);
    }

    #[test]
    #[serial]
    fn test_env_source_unset() {
        std::env::remove_var(TEST_KEY);
        assert!(EnvSaltSource::new(TEST_KEY).salt_list().is_empty());
    }

    #[test]
    #[serial]
    fn test_env_source_values() {
        let source = EnvSaltSource::new(TEST_KEY);

        std::env::set_var(TEST_KEY, "");
        assert!(source.salt_list().is_empty());

        std::env::set_var(TEST_KEY, "one");
        assert_eq!(strings(&source.salt_list()), vec!["one"]);

        std::env::set_var(TEST_KEY, "one,two");
        assert_eq!(strings(&source.salt_list()), vec!["one", "two"]);

        std::env::set_var(TEST_KEY, "two");
        assert_eq!(strings(&source.salt_list()), vec!["two"]);

        std::env::remove_var(TEST_KEY);
    }

    #[test]
    fn test_parse_bytes_keeps_non_utf8_salts() {
        let list = SaltList::parse_bytes(b"caf\xe9,old");
        assert_eq!(list.len(), 2);
        assert_eq!(list.current().map(Salt::as_bytes), Some(&b"caf\xe9"[..]));
        assert_eq!(list.current().and_then(Salt::to_str), None);
        assert_eq!(list.get(1).and_then(Salt::to_str), Some("old"));
        assert_eq!(list.to_bytes(), b"caf\xe9,old");
        assert_eq!(list.to_string(), "caf\u{fffd},old");
    }

    #[cfg(unix)]
    #[test]
    #[serial]
    fn test_env_source_non_utf8_value() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        std::env::set_var(TEST_KEY, OsStr::from_bytes(b"caf\xe9,old"));
        let list = EnvSaltSource::new(TEST_KEY).salt_list();
        std::env::remove_var(TEST_KEY);

        assert_eq!(list, SaltList::parse_bytes(b"caf\xe9,old"));
        assert_eq!(list.get(1).and_then(Salt::to_str), Some("old"));
    }

    #[test]
    fn test_env_source_default_key() {
        assert_eq!(EnvSaltSource::default().key(), DEFAULT_SALTS_ENV_KEY);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        // Rendering a parsed list yields the configuration value back.
        #[test]
        fn prop_parse_display_inverse(salts in prop::collection::vec("[a-zA-Z0-9 _.-]{1,16}", 1..6)) {
            let value = salts.join(",");
            let list = SaltList::parse(&value);
            prop_assert_eq!(list.len(), salts.len());
            prop_assert_eq!(list.to_string(), value);
        }
    }
}
