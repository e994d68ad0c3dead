//! CLI commands

mod doctor;
mod generate;
mod salt;
mod validate;

pub use doctor::doctor;
pub use generate::{generate, GenerateArgs};
pub use salt::{salt, SaltArgs};
pub use validate::{validate, ValidateArgs};
