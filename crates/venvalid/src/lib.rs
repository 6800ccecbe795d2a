//! Validate and type-convert environment variables.
//!
//! A [`Spec`] declares which variables a program needs and what shape each
//! one takes. Resolving it against the environment (or any [`EnvSource`])
//! yields a typed [`Config`], or the first [`ConfigError`] encountered.
//!
//! The library never prints and never exits: turning an error into a
//! message and an exit status is left to the program's entry point.
//!
//! # Example
//!
//! ```
//! use venvalid::{resolve, Spec, TypeTag, VarOptions, VarSpec};
//!
//! let spec = Spec::builder()
//!     .var("PORT", TypeTag::Integer)
//!     .var("DEBUG", VarSpec::with(TypeTag::Boolean, VarOptions::new().with_default(false)))
//!     .var("MODE", VarSpec::one_of(["dev", "prod", "test"]))
//!     .var("ALLOWED_HOSTS", TypeTag::List)
//!     .build()
//!     .unwrap();
//!
//! let source = [
//!     ("PORT", "8000"),
//!     ("MODE", "prod"),
//!     ("ALLOWED_HOSTS", "a.com,b.com , c.com"),
//! ];
//! let config = resolve(&spec, &source).unwrap();
//!
//! assert_eq!(config.get_integer("PORT"), Some(8000));
//! assert_eq!(config.get_bool("DEBUG"), Some(false));
//! assert_eq!(config.get_str("MODE"), Some("prod"));
//! assert_eq!(config.get_list("ALLOWED_HOSTS").unwrap(), ["a.com", "b.com", "c.com"]);
//! ```

pub mod coerce;
pub mod document;
pub mod error;
pub mod resolve;
pub mod source;
pub mod spec;
pub mod value;

pub use coerce::{coerce, CoerceError};
pub use error::{format_error_human, ConfigError, ErrorCategory, ErrorKind, Result, StructuredError};
pub use resolve::{resolve, resolve_env, Config, Origin, ResolvedVar, Resolver};
pub use source::{EnvSource, ProcessEnv};
pub use spec::{Spec, SpecBuilder, TypeTag, Validator, VarOptions, VarSpec};
pub use value::Value;

/// Resolve `spec` against the process environment.
///
/// Shorthand for [`resolve_env`].
pub fn env(spec: &Spec) -> Result<Config> {
    resolve_env(spec)
}
