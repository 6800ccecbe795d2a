//! Payloads printed by `check` and `explain`.
//!
//! Every payload has a JSON form (stdout), a human form and a one-line
//! summary. Resolved values appear only when the caller opts in, since
//! environments routinely carry secrets. Error messages are the exception:
//! type, allowed-set and enum failures quote the rejected raw value so the
//! user can see what to fix. Missing-variable and custom-validation errors
//! carry no value.

use serde::Serialize;
use venvalid::{
    format_error_human, Config, Origin, Spec, StructuredError, TypeTag, Value, VarSpec,
};

use crate::exit_codes::ExitCode;
use crate::output::SCHEMA_VERSION;
use crate::spec_file::CliError;

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn name_width<'a>(names: impl Iterator<Item = &'a str>) -> usize {
    names.map(str::len).max().unwrap_or(0)
}

// ============================================================================
// check
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ResolvedEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeTag,
    pub origin: Origin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// Successful `check` result.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub schema_version: &'static str,
    pub generated_at: String,
    pub command: &'static str,
    pub spec: String,
    pub status: &'static str,
    pub variables: Vec<ResolvedEntry>,
}

impl CheckReport {
    pub fn new(spec_path: &str, config: &Config, show_values: bool) -> Self {
        let variables = config
            .entries()
            .iter()
            .map(|var| ResolvedEntry {
                name: var.name.clone(),
                ty: var.value.type_tag(),
                origin: var.origin,
                value: show_values.then(|| var.value.clone()),
            })
            .collect();

        CheckReport {
            schema_version: SCHEMA_VERSION,
            generated_at: now(),
            command: "check",
            spec: spec_path.to_string(),
            status: "ok",
            variables,
        }
    }

    fn count(&self, origin: Origin) -> usize {
        self.variables.iter().filter(|v| v.origin == origin).count()
    }

    pub fn render_human(&self) -> String {
        let width = name_width(self.variables.iter().map(|v| v.name.as_str()));
        let mut out = format!(
            "✓ {} variable(s) satisfy {}\n",
            self.variables.len(),
            self.spec
        );
        for var in &self.variables {
            let line = format!("  {:<width$}  {:<8}  {}", var.name, var.ty.name(), var.origin);
            match &var.value {
                Some(value) => out.push_str(&format!("{:<w$}  = {}\n", line, value, w = width + 23)),
                None => out.push_str(&format!("{}\n", line.trim_end())),
            }
        }
        out
    }

    pub fn render_summary(&self) -> String {
        format!(
            "[{}] check: {} variable(s) resolved ({} env, {} default)",
            ExitCode::Clean.code_name(),
            self.variables.len(),
            self.count(Origin::Env),
            self.count(Origin::Default)
        )
    }
}

// ============================================================================
// explain
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct DeclaredEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeTag,
    /// `typed` or `one_of`.
    pub kind: &'static str,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
    pub custom_validator: bool,
}

impl DeclaredEntry {
    fn new(name: &str, spec: &VarSpec) -> Self {
        match spec {
            VarSpec::Typed { ty, options } => DeclaredEntry {
                name: name.to_string(),
                ty: *ty,
                kind: "typed",
                required: options.default.is_none(),
                default: options.default.clone(),
                allowed: options.allowed.clone(),
                choices: None,
                custom_validator: options.validate.is_some(),
            },
            VarSpec::OneOf(choices) => DeclaredEntry {
                name: name.to_string(),
                ty: TypeTag::String,
                kind: "one_of",
                required: true,
                default: None,
                allowed: None,
                choices: Some(choices.clone()),
                custom_validator: false,
            },
        }
    }

    fn describe(&self) -> String {
        let mut parts = vec![if self.required { "required" } else { "optional" }.to_string()];
        if let Some(default) = &self.default {
            parts.push(format!("default {}", default));
        }
        if let Some(allowed) = &self.allowed {
            let items: Vec<String> = allowed.iter().map(Value::to_string).collect();
            parts.push(format!("allowed [{}]", items.join(", ")));
        }
        if let Some(choices) = &self.choices {
            parts.push(format!("one of [{}]", choices.join(", ")));
        }
        if self.custom_validator {
            parts.push("custom validator".to_string());
        }
        parts.join(", ")
    }
}

/// Description of what a spec document declares.
#[derive(Debug, Clone, Serialize)]
pub struct ExplainReport {
    pub schema_version: &'static str,
    pub generated_at: String,
    pub command: &'static str,
    pub spec: String,
    pub variables: Vec<DeclaredEntry>,
}

impl ExplainReport {
    pub fn new(spec_path: &str, spec: &Spec) -> Self {
        ExplainReport {
            schema_version: SCHEMA_VERSION,
            generated_at: now(),
            command: "explain",
            spec: spec_path.to_string(),
            variables: spec
                .iter()
                .map(|(name, var)| DeclaredEntry::new(name, var))
                .collect(),
        }
    }

    pub fn render_human(&self) -> String {
        let width = name_width(self.variables.iter().map(|v| v.name.as_str()));
        let mut out = format!("{} declares {} variable(s)\n", self.spec, self.variables.len());
        for var in &self.variables {
            out.push_str(&format!(
                "  {:<width$}  {:<8}  {}\n",
                var.name,
                var.ty.name(),
                var.describe()
            ));
        }
        out
    }

    pub fn render_summary(&self) -> String {
        let required = self.variables.iter().filter(|v| v.required).count();
        format!(
            "[{}] explain: {} variable(s), {} required",
            ExitCode::Clean.code_name(),
            self.variables.len(),
            required
        )
    }
}

// ============================================================================
// errors
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ErrorBody {
    Config(StructuredError),
    Io { message: String, path: String },
}

/// Failed command result, printed on stderr.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub schema_version: &'static str,
    pub generated_at: String,
    pub command: &'static str,
    pub status: &'static str,
    pub exit_code: &'static str,
    pub error: ErrorBody,
}

impl ErrorReport {
    pub fn new(command: &'static str, err: &CliError) -> Self {
        let error = match err {
            CliError::Io { path, .. } => ErrorBody::Io {
                message: err.to_string(),
                path: path.display().to_string(),
            },
            CliError::Config(inner) => ErrorBody::Config(StructuredError::from(inner)),
        };
        ErrorReport {
            schema_version: SCHEMA_VERSION,
            generated_at: now(),
            command,
            status: "error",
            exit_code: err.exit_code().code_name(),
            error,
        }
    }
}

/// Headline / reason / fix layout for stderr.
pub fn render_error_human(err: &CliError, use_color: bool) -> String {
    match err {
        CliError::Config(inner) => format_error_human(inner, use_color),
        CliError::Io { .. } => {
            let (red, cyan, reset) = if use_color {
                ("\x1b[31m", "\x1b[36m", "\x1b[0m")
            } else {
                ("", "", "")
            };
            format!(
                "{red}✗{reset} Spec file unreadable\n  Reason: {err}\n  {cyan}Fix:{reset} Check the --spec path (or VENVALID_SPEC) and its permissions"
            )
        }
    }
}

pub fn render_error_summary(command: &str, err: &CliError) -> String {
    format!("[{}] {}: {}", err.exit_code().code_name(), command, err)
}
