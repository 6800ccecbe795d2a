//! Support library for the `venvalid` binary.
//!
//! The binary loads a JSON spec document, resolves it against the process
//! environment and reports the outcome through stdout payloads, stderr
//! diagnostics and a stable exit code.

pub mod exit_codes;
pub mod logging;
pub mod output;
pub mod report;
pub mod spec_file;

pub use exit_codes::ExitCode;
pub use output::{OutputFormat, SCHEMA_VERSION};
pub use spec_file::{load_spec, CliError};
