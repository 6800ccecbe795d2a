//! Specification types.
//!
//! A [`Spec`] is an ordered list of variable names, each paired with a
//! [`VarSpec`] describing the expected shape. Specs are checked once by
//! [`SpecBuilder::build`]; a built spec is always well-formed.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::value::Value;

/// The type a raw string is coerced into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    String,
    Integer,
    Boolean,
    List,
    Decimal,
    DateTime,
    Path,
    Json,
}

impl TypeTag {
    pub const ALL: [TypeTag; 8] = [
        TypeTag::String,
        TypeTag::Integer,
        TypeTag::Boolean,
        TypeTag::List,
        TypeTag::Decimal,
        TypeTag::DateTime,
        TypeTag::Path,
        TypeTag::Json,
    ];

    /// Canonical lowercase name, as used in spec documents and messages.
    pub fn name(&self) -> &'static str {
        match self {
            TypeTag::String => "string",
            TypeTag::Integer => "integer",
            TypeTag::Boolean => "boolean",
            TypeTag::List => "list",
            TypeTag::Decimal => "decimal",
            TypeTag::DateTime => "datetime",
            TypeTag::Path => "path",
            TypeTag::Json => "json",
        }
    }
}

impl FromStr for TypeTag {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "string" | "str" => Ok(TypeTag::String),
            "integer" | "int" => Ok(TypeTag::Integer),
            "boolean" | "bool" => Ok(TypeTag::Boolean),
            "list" => Ok(TypeTag::List),
            "decimal" => Ok(TypeTag::Decimal),
            "datetime" => Ok(TypeTag::DateTime),
            "path" => Ok(TypeTag::Path),
            "json" => Ok(TypeTag::Json),
            _ => Err(format!("unknown type: {}", s)),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Application-supplied predicate run on a coerced value.
#[derive(Clone)]
pub struct Validator(Arc<dyn Fn(&Value) -> bool + Send + Sync>);

impl Validator {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Validator(Arc::new(f))
    }

    pub fn check(&self, value: &Value) -> bool {
        (self.0)(value)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Validator(..)")
    }
}

/// Options attached to a typed entry.
#[derive(Debug, Clone, Default)]
pub struct VarOptions {
    /// Returned verbatim when the variable is absent.
    pub default: Option<Value>,
    /// Closed set of valid post-coercion values.
    pub allowed: Option<Vec<Value>>,
    pub validate: Option<Validator>,
}

impl VarOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_allowed<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.allowed = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_validator<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.validate = Some(Validator::new(f));
        self
    }
}

/// Expected shape of one variable.
#[derive(Debug, Clone)]
pub enum VarSpec {
    /// Coerce to `ty`, then apply the options.
    Typed { ty: TypeTag, options: VarOptions },
    /// Raw string must equal one of these literals.
    OneOf(Vec<String>),
}

impl VarSpec {
    /// Bare type tag without options.
    pub fn of(ty: TypeTag) -> Self {
        VarSpec::Typed {
            ty,
            options: VarOptions::default(),
        }
    }

    pub fn with(ty: TypeTag, options: VarOptions) -> Self {
        VarSpec::Typed { ty, options }
    }

    pub fn one_of<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        VarSpec::OneOf(choices.into_iter().map(Into::into).collect())
    }

    /// The type a successful resolution produces.
    pub fn type_tag(&self) -> TypeTag {
        match self {
            VarSpec::Typed { ty, .. } => *ty,
            VarSpec::OneOf(_) => TypeTag::String,
        }
    }

    fn check_shape(&self, name: &str) -> Result<()> {
        match self {
            VarSpec::OneOf(choices) => {
                if choices.is_empty() {
                    return Err(ConfigError::shape(name, "enumerated set is empty"));
                }
            }
            VarSpec::Typed { ty, options } => {
                if let Some(default) = &options.default {
                    if default.type_tag() != *ty {
                        return Err(ConfigError::shape(
                            name,
                            format!("default is a {}, expected {}", default.type_tag(), ty),
                        ));
                    }
                }
                if let Some(allowed) = &options.allowed {
                    if allowed.is_empty() {
                        return Err(ConfigError::shape(name, "allowed set is empty"));
                    }
                    if let Some(bad) = allowed.iter().find(|v| v.type_tag() != *ty) {
                        return Err(ConfigError::shape(
                            name,
                            format!("allowed value '{}' is a {}, expected {}", bad, bad.type_tag(), ty),
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

impl From<TypeTag> for VarSpec {
    fn from(ty: TypeTag) -> Self {
        VarSpec::of(ty)
    }
}

/// A checked, ordered specification.
#[derive(Debug, Clone, Default)]
pub struct Spec {
    entries: Vec<(String, VarSpec)>,
}

impl Spec {
    pub fn builder() -> SpecBuilder {
        SpecBuilder::default()
    }

    /// Build from (name, entry) pairs in order.
    pub fn from_entries<I, N, V>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<VarSpec>,
    {
        entries
            .into_iter()
            .fold(Spec::builder(), |b, (name, spec)| b.var(name, spec))
            .build()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &VarSpec)> {
        self.entries.iter().map(|(n, s)| (n.as_str(), s))
    }

    pub fn get(&self, name: &str) -> Option<&VarSpec> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Accumulates entries; shape checks run in [`SpecBuilder::build`].
#[derive(Debug, Default)]
pub struct SpecBuilder {
    entries: Vec<(String, VarSpec)>,
}

impl SpecBuilder {
    pub fn var(mut self, name: impl Into<String>, spec: impl Into<VarSpec>) -> Self {
        self.entries.push((name.into(), spec.into()));
        self
    }

    pub fn build(self) -> Result<Spec> {
        let mut seen = HashSet::with_capacity(self.entries.len());
        for (name, spec) in &self.entries {
            check_name(name)?;
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::shape(name.as_str(), "declared more than once"));
            }
            spec.check_shape(name)?;
        }
        Ok(Spec {
            entries: self.entries,
        })
    }
}

fn check_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ConfigError::shape(name, "variable name is empty"));
    }
    if name.contains('=') || name.contains('\0') {
        return Err(ConfigError::shape(
            name,
            "variable name may not contain '=' or NUL",
        ));
    }
    Ok(())
}
