//! # saltcsrf-core
//!
//! Anti-forgery tokens backed by scrypt hashes and a rotating list of
//! server-held salts.
//!
//! A random 32 character token goes to the client. Its hash, derived with
//! scrypt under the current salt, is stored by the caller (cookie, session,
//! hidden field). When the pair comes back, the hash is re-derived under each
//! configured salt in order, so tokens issued before a rotation keep
//! validating while their salt stays in the list.
//!
//! Storage of the pair and HTTP wiring are left to the caller.
//!
//! ## Example
//!
//! ```rust
//! use saltcsrf_core::{CsrfGuard, SaltList};
//!
//! // Usually `CsrfGuard::from_env()`, reading `CSRF_SALTS=current,previous`.
//! let guard = CsrfGuard::new(SaltList::parse("current,previous"));
//!
//! let (token, hash) = guard.generate().expect("salts are configured").into_parts();
//!
//! let result = guard.validate(token.as_str(), hash.as_str());
//! assert!(result.is_valid());
//! assert!(!result.needs_reissue());
//! ```
//!
//! ## Features
//!
//! - `tracing` (default) - Structured log events through `tracing`
//! - `tokio` - `CsrfGuard::validate_with_timeout` on the blocking pool
//! - `dotenv` - `.env` file loading helpers
//! - `full` - All features enabled

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

#[macro_use]
mod tracing_macros;

pub mod config;
pub mod derive;
pub mod error;
pub mod guard;
pub mod salt;
pub mod token;
pub mod verify;

pub use config::{CsrfConfig, DEFAULT_VALIDATION_TIMEOUT};
pub use derive::{derive_hash, TokenHash};
pub use error::{CsrfError, GenerateError, Result};
pub use guard::{CsrfGuard, IssuedToken};
pub use salt::{EnvSaltSource, Salt, SaltList, SaltSource, DEFAULT_SALTS_ENV_KEY};
pub use token::{CsrfToken, TOKEN_LEN};
pub use verify::{verify, Validation};

#[cfg(feature = "dotenv")]
pub use config::{load_dotenv, load_dotenv_from};
