//! Error types for venvalid.
//!
//! Every failure carries:
//! - A stable error code for machine parsing
//! - A category separating bad environments from bad specifications
//! - A headline and remediation hint for humans
//!
//! # Human-Facing Output
//!
//! ```text
//! ✗ Missing Environment Variable
//!   Reason: Missing required environment variable: DATABASE_URL
//!   Fix: Export the variable before starting the program, or give it a default.
//! ```
//!
//! # Machine-Facing Output
//!
//! ```json
//! {
//!   "code": 10,
//!   "category": "validation",
//!   "message": "Missing required environment variable: DATABASE_URL",
//!   "variable": "DATABASE_URL",
//!   "programmer_error": false
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::spec::TypeTag;
use crate::value::Value;

/// Result type alias for venvalid operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The environment does not satisfy the specification.
    Validation,
    /// The specification itself is malformed (programmer error).
    Specification,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Validation => write!(f, "validation"),
            ErrorCategory::Specification => write!(f, "specification"),
        }
    }
}

/// Field-free discriminant of [`ConfigError`], convenient for matching in tests
/// and for callers that only branch on the kind of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingVariable,
    InvalidType,
    NotAllowed,
    InvalidEnumValue,
    CustomValidationFailed,
    SpecShape,
    Json,
}

/// Unified error type for venvalid.
#[derive(Error, Debug)]
pub enum ConfigError {
    // Validation errors (10-19)
    /// The variable is absent and has no default. `choices` is set when the
    /// entry was an enumerated set.
    #[error("{}", missing_message(.name, .choices.as_deref()))]
    MissingVariable {
        name: String,
        choices: Option<Vec<String>>,
    },

    #[error("Invalid value for {name}: expected {expected}, got '{value}'")]
    InvalidType {
        name: String,
        expected: TypeTag,
        value: String,
    },

    #[error("{name} must be one of {}, but got '{value}'", list_values(.allowed))]
    NotAllowed {
        name: String,
        allowed: Vec<Value>,
        value: Value,
    },

    #[error("{name} must be one of {}, but got '{value}'", list_strings(.choices))]
    InvalidEnumValue {
        name: String,
        choices: Vec<String>,
        value: String,
    },

    #[error("{name} failed custom validation")]
    CustomValidationFailed { name: String },

    // Specification errors (20-29)
    #[error("invalid specification for {name}: {reason}")]
    SpecShape { name: String, reason: String },

    #[error("invalid specification document: {0}")]
    Json(#[from] serde_json::Error),
}

fn missing_message(name: &str, choices: Option<&[String]>) -> String {
    match choices {
        Some(choices) => format!("{} is required and must be one of {}", name, list_strings(choices)),
        None => format!("Missing required environment variable: {}", name),
    }
}

fn list_strings(items: &[String]) -> String {
    format!("[{}]", items.join(", "))
}

fn list_values(items: &[Value]) -> String {
    let rendered: Vec<String> = items.iter().map(|v| v.to_string()).collect();
    list_strings(&rendered)
}

impl ConfigError {
    pub(crate) fn shape(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::SpecShape {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::MissingVariable { .. } => ErrorKind::MissingVariable,
            ConfigError::InvalidType { .. } => ErrorKind::InvalidType,
            ConfigError::NotAllowed { .. } => ErrorKind::NotAllowed,
            ConfigError::InvalidEnumValue { .. } => ErrorKind::InvalidEnumValue,
            ConfigError::CustomValidationFailed { .. } => ErrorKind::CustomValidationFailed,
            ConfigError::SpecShape { .. } => ErrorKind::SpecShape,
            ConfigError::Json(_) => ErrorKind::Json,
        }
    }

    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Validation errors
    /// - 20-29: Specification errors
    pub fn code(&self) -> u32 {
        match self.kind() {
            ErrorKind::MissingVariable => 10,
            ErrorKind::InvalidType => 11,
            ErrorKind::NotAllowed => 12,
            ErrorKind::InvalidEnumValue => 13,
            ErrorKind::CustomValidationFailed => 14,
            ErrorKind::SpecShape => 20,
            ErrorKind::Json => 21,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self.kind() {
            ErrorKind::SpecShape | ErrorKind::Json => ErrorCategory::Specification,
            _ => ErrorCategory::Validation,
        }
    }

    /// True when the specification, not the environment, is at fault.
    pub fn is_programmer_error(&self) -> bool {
        self.category() == ErrorCategory::Specification
    }

    /// The variable the error is about, if any.
    pub fn variable(&self) -> Option<&str> {
        match self {
            ConfigError::MissingVariable { name, .. }
            | ConfigError::InvalidType { name, .. }
            | ConfigError::NotAllowed { name, .. }
            | ConfigError::InvalidEnumValue { name, .. }
            | ConfigError::CustomValidationFailed { name }
            | ConfigError::SpecShape { name, .. } => Some(name),
            ConfigError::Json(_) => None,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self.kind() {
            ErrorKind::MissingVariable => {
                "Export the variable before starting the program, or give it a default."
            }
            ErrorKind::InvalidType => "Set the variable to a value of the expected type.",
            ErrorKind::NotAllowed | ErrorKind::InvalidEnumValue => {
                "Set the variable to one of the listed values."
            }
            ErrorKind::CustomValidationFailed => {
                "The value parsed but was rejected by the application's own check."
            }
            ErrorKind::SpecShape => {
                "The specification is malformed. This is a bug in the program declaring it."
            }
            ErrorKind::Json => "Check the specification document with 'jq . <file>'.",
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self.kind() {
            ErrorKind::MissingVariable => "Missing Environment Variable",
            ErrorKind::InvalidType => "Invalid Environment Variable",
            ErrorKind::NotAllowed => "Value Not Allowed",
            ErrorKind::InvalidEnumValue => "Invalid Choice",
            ErrorKind::CustomValidationFailed => "Custom Validation Failed",
            ErrorKind::SpecShape => "Invalid Specification",
            ErrorKind::Json => "Specification Parse Error",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Offending variable, when the error concerns one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,

    /// Whether the specification itself is at fault.
    pub programmer_error: bool,
}

impl From<&ConfigError> for StructuredError {
    fn from(err: &ConfigError) -> Self {
        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            variable: err.variable().map(str::to_string),
            programmer_error: err.is_programmer_error(),
        }
    }
}

impl StructuredError {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }

    /// Serialize to pretty JSON string.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.to_json())
    }
}

/// Format an error for human-readable stderr output.
///
/// Output format:
/// ```text
/// ✗ [Headline]
///   Reason: [Error message]
///   Fix: [Remediation hint]
/// ```
pub fn format_error_human(err: &ConfigError, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}✗{reset} {headline}\n  Reason: {message}\n  {cyan}Fix:{reset} {remediation}",
        red = red,
        cyan = cyan,
        reset = reset,
        headline = err.headline(),
        message = err,
        remediation = err.remediation()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing(name: &str) -> ConfigError {
        ConfigError::MissingVariable {
            name: name.into(),
            choices: None,
        }
    }

    #[test]
    fn test_error_code() {
        assert_eq!(missing("X").code(), 10);
        assert_eq!(ConfigError::CustomValidationFailed { name: "X".into() }.code(), 14);
        assert_eq!(ConfigError::shape("X", "bad").code(), 20);
    }

    #[test]
    fn test_error_category() {
        assert_eq!(missing("X").category(), ErrorCategory::Validation);
        assert_eq!(ConfigError::shape("X", "bad").category(), ErrorCategory::Specification);
        assert!(ConfigError::shape("X", "bad").is_programmer_error());
        assert!(!missing("X").is_programmer_error());
    }

    #[test]
    fn test_missing_message_distinguishes_enum() {
        assert_eq!(
            missing("SECRET_KEY").to_string(),
            "Missing required environment variable: SECRET_KEY"
        );
        let err = ConfigError::MissingVariable {
            name: "MODE".into(),
            choices: Some(vec!["dev".into(), "prod".into()]),
        };
        assert_eq!(err.to_string(), "MODE is required and must be one of [dev, prod]");
        assert_eq!(err.kind(), ErrorKind::MissingVariable);
    }

    #[test]
    fn test_invalid_type_message() {
        let err = ConfigError::InvalidType {
            name: "PORT".into(),
            expected: TypeTag::Integer,
            value: "eighty".into(),
        };
        assert_eq!(err.to_string(), "Invalid value for PORT: expected integer, got 'eighty'");
    }

    #[test]
    fn test_not_allowed_message() {
        let err = ConfigError::NotAllowed {
            name: "REGION".into(),
            allowed: vec![Value::from("us"), Value::from("eu")],
            value: Value::from("asia"),
        };
        assert_eq!(err.to_string(), "REGION must be one of [us, eu], but got 'asia'");
        assert_eq!(err.variable(), Some("REGION"));
    }

    #[test]
    fn test_structured_error_json() {
        let err = ConfigError::InvalidEnumValue {
            name: "MODE".into(),
            choices: vec!["dev".into()],
            value: "qa".into(),
        };
        let json = StructuredError::from(&err).to_json();

        assert!(json.contains(r#""code":13"#));
        assert!(json.contains(r#""category":"validation""#));
        assert!(json.contains(r#""variable":"MODE""#));
        assert!(json.contains(r#""programmer_error":false"#));
    }

    #[test]
    fn test_format_error_human() {
        let formatted = format_error_human(&missing("DATABASE_URL"), false);

        assert!(formatted.contains("Missing Environment Variable"));
        assert!(formatted.contains("Missing required environment variable: DATABASE_URL"));
        assert!(formatted.contains("Fix:"));
        assert!(!formatted.contains("\x1b["));
    }

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::Validation.to_string(), "validation");
        assert_eq!(ErrorCategory::Specification.to_string(), "specification");
    }
}
