//! Specification resolution.
//!
//! Walks a [`Spec`] in declaration order and turns each raw value from an
//! [`EnvSource`] into a typed [`Value`]. The first failure aborts the whole
//! call; a [`Config`] is only returned when every variable resolved.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::coerce::coerce;
use crate::error::{ConfigError, Result};
use crate::source::{EnvSource, ProcessEnv};
use crate::spec::{Spec, VarSpec};
use crate::value::Value;

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Coerced from the source.
    Env,
    /// Taken verbatim from the spec's default.
    Default,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Env => write!(f, "env"),
            Origin::Default => write!(f, "default"),
        }
    }
}

/// One resolved variable.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedVar {
    pub name: String,
    pub value: Value,
    pub origin: Origin,
}

/// The resolved configuration, in specification order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    vars: Vec<ResolvedVar>,
}

impl Config {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entry(name).map(|v| &v.value)
    }

    pub fn origin(&self, name: &str) -> Option<Origin> {
        self.entry(name).map(|v| v.origin)
    }

    pub fn entry(&self, name: &str) -> Option<&ResolvedVar> {
        self.vars.iter().find(|v| v.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.vars.iter().map(|v| (v.name.as_str(), &v.value))
    }

    pub fn entries(&self) -> &[ResolvedVar] {
        &self.vars
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.vars.iter().map(|v| v.name.as_str())
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_integer(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_integer)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    pub fn get_list(&self, name: &str) -> Option<&[String]> {
        self.get(name).and_then(Value::as_list)
    }

    pub fn get_decimal(&self, name: &str) -> Option<Decimal> {
        self.get(name).and_then(Value::as_decimal)
    }

    pub fn get_datetime(&self, name: &str) -> Option<&DateTime<FixedOffset>> {
        self.get(name).and_then(Value::as_datetime)
    }

    pub fn get_path(&self, name: &str) -> Option<&Path> {
        self.get(name).and_then(Value::as_path)
    }

    pub fn get_json(&self, name: &str) -> Option<&serde_json::Value> {
        self.get(name).and_then(Value::as_json)
    }
}

impl Serialize for Config {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.vars.len()))?;
        for var in &self.vars {
            map.serialize_entry(&var.name, &var.value)?;
        }
        map.end()
    }
}

impl IntoIterator for Config {
    type Item = ResolvedVar;
    type IntoIter = std::vec::IntoIter<ResolvedVar>;

    fn into_iter(self) -> Self::IntoIter {
        self.vars.into_iter()
    }
}

/// Resolve `spec` against `source`.
///
/// Returns every declared variable, or the first error encountered.
pub fn resolve<S: EnvSource + ?Sized>(spec: &Spec, source: &S) -> Result<Config> {
    let mut vars = Vec::with_capacity(spec.len());
    for (name, var_spec) in spec.iter() {
        let raw = source.lookup(name);
        let (value, origin) = resolve_variable(name, raw, var_spec).map_err(|err| {
            tracing::debug!(var = %name, code = err.code(), "variable failed validation");
            err
        })?;
        tracing::debug!(var = %name, %origin, ty = %var_spec.type_tag(), "resolved variable");
        vars.push(ResolvedVar {
            name: name.to_string(),
            value,
            origin,
        });
    }
    Ok(Config { vars })
}

/// Resolve `spec` against a snapshot of the process environment.
pub fn resolve_env(spec: &Spec) -> Result<Config> {
    resolve(spec, &ProcessEnv::capture())
}

fn resolve_variable(name: &str, raw: Option<&str>, spec: &VarSpec) -> Result<(Value, Origin)> {
    let (ty, options) = match spec {
        VarSpec::OneOf(choices) => {
            return match raw {
                None => Err(ConfigError::MissingVariable {
                    name: name.to_string(),
                    choices: Some(choices.clone()),
                }),
                Some(raw) if choices.iter().any(|c| c == raw) => {
                    Ok((Value::String(raw.to_string()), Origin::Env))
                }
                Some(raw) => Err(ConfigError::InvalidEnumValue {
                    name: name.to_string(),
                    choices: choices.clone(),
                    value: raw.to_string(),
                }),
            };
        }
        VarSpec::Typed { ty, options } => (*ty, options),
    };

    let Some(raw) = raw else {
        return match &options.default {
            Some(default) => Ok((default.clone(), Origin::Default)),
            None => Err(ConfigError::MissingVariable {
                name: name.to_string(),
                choices: None,
            }),
        };
    };

    let value = coerce(raw, ty).map_err(|err| ConfigError::InvalidType {
        name: name.to_string(),
        expected: err.expected,
        value: raw.to_string(),
    })?;

    if let Some(allowed) = &options.allowed {
        if !allowed.contains(&value) {
            return Err(ConfigError::NotAllowed {
                name: name.to_string(),
                allowed: allowed.clone(),
                value,
            });
        }
    }

    if let Some(validator) = &options.validate {
        if !validator.check(&value) {
            return Err(ConfigError::CustomValidationFailed {
                name: name.to_string(),
            });
        }
    }

    Ok((value, Origin::Env))
}

/// Owns a spec and resolves it on demand.
#[derive(Debug, Clone)]
pub struct Resolver {
    spec: Spec,
}

impl Resolver {
    pub fn new(spec: Spec) -> Self {
        Resolver { spec }
    }

    pub fn spec(&self) -> &Spec {
        &self.spec
    }

    pub fn resolve<S: EnvSource + ?Sized>(&self, source: &S) -> Result<Config> {
        resolve(&self.spec, source)
    }

    pub fn resolve_env(&self) -> Result<Config> {
        resolve_env(&self.spec)
    }
}
