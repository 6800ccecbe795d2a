//! Loading specification documents from disk.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use venvalid::{ConfigError, Spec};

use crate::exit_codes::ExitCode;

/// Errors raised by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read spec file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl CliError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Io { .. } => ExitCode::IoError,
            CliError::Config(err) => ExitCode::from(err),
        }
    }

    /// Underlying resolver error, if any.
    pub fn config_error(&self) -> Option<&ConfigError> {
        match self {
            CliError::Io { .. } => None,
            CliError::Config(err) => Some(err),
        }
    }
}

/// Read and parse the JSON spec document at `path`.
pub fn load_spec(path: &Path) -> Result<Spec, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let spec = Spec::from_json_str(&text)?;
    debug!(path = %path.display(), variables = spec.len(), "loaded spec document");
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use venvalid::ErrorKind;

    fn write_spec(text: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_valid_document() {
        let file = write_spec(r#"{"PORT": "integer", "MODE": ["dev", "prod"]}"#);
        let spec = load_spec(file.path()).unwrap();
        assert_eq!(spec.len(), 2);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_spec(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, CliError::Io { .. }));
        assert_eq!(err.exit_code(), ExitCode::IoError);
        assert!(err.config_error().is_none());
    }

    #[test]
    fn test_malformed_json_is_spec_error() {
        let file = write_spec("{not json");
        let err = load_spec(file.path()).unwrap_err();
        assert_eq!(err.exit_code(), ExitCode::SpecError);
        assert_eq!(err.config_error().map(|e| e.kind()), Some(ErrorKind::Json));
    }

    #[test]
    fn test_bad_shape_is_spec_error() {
        let file = write_spec(r#"{"MODE": []}"#);
        let err = load_spec(file.path()).unwrap_err();
        assert_eq!(err.exit_code(), ExitCode::SpecError);
        assert_eq!(err.config_error().map(|e| e.kind()), Some(ErrorKind::SpecShape));
    }
}
