//! JSON specification documents.
//!
//! A document is a JSON object mapping variable names to entries:
//!
//! ```json
//! {
//!   "PORT": "integer",
//!   "MODE": ["dev", "prod", "test"],
//!   "REGION": { "type": "string", "default": "us", "allowed": ["us", "eu"] }
//! }
//! ```
//!
//! Key order is preserved. Validators cannot be expressed in a document.

use std::path::PathBuf;

use serde_json::Value as Json;

use crate::coerce::{parse_datetime, parse_decimal};
use crate::error::{ConfigError, Result};
use crate::spec::{Spec, SpecBuilder, TypeTag, VarOptions, VarSpec};
use crate::value::Value;

const ENTRY_KEYS: [&str; 3] = ["type", "default", "allowed"];

impl Spec {
    /// Parse and check a JSON specification document.
    pub fn from_json_str(text: &str) -> Result<Spec> {
        let doc: Json = serde_json::from_str(text)?;
        Spec::from_json_value(&doc)
    }

    /// Build from an already-parsed JSON document.
    pub fn from_json_value(doc: &Json) -> Result<Spec> {
        let Json::Object(members) = doc else {
            return Err(ConfigError::shape(
                "<document>",
                format!("expected a JSON object, found {}", json_kind(doc)),
            ));
        };

        members
            .iter()
            .try_fold(Spec::builder(), |builder, (name, entry)| -> Result<SpecBuilder> {
                Ok(builder.var(name.as_str(), parse_entry(name, entry)?))
            })?
            .build()
    }
}

fn parse_entry(name: &str, entry: &Json) -> Result<VarSpec> {
    match entry {
        Json::String(tag) => Ok(VarSpec::of(parse_tag(name, tag)?)),
        Json::Array(items) => {
            let choices = items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        ConfigError::shape(
                            name,
                            format!("enumerated values must be strings, found {}", json_kind(item)),
                        )
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(VarSpec::OneOf(choices))
        }
        Json::Object(fields) => {
            if let Some(unknown) = fields.keys().find(|k| !ENTRY_KEYS.contains(&k.as_str())) {
                return Err(ConfigError::shape(name, format!("unknown option '{}'", unknown)));
            }
            let ty = match fields.get("type") {
                Some(Json::String(tag)) => parse_tag(name, tag)?,
                Some(other) => {
                    return Err(ConfigError::shape(
                        name,
                        format!("'type' must be a string, found {}", json_kind(other)),
                    ))
                }
                None => return Err(ConfigError::shape(name, "missing 'type'")),
            };

            let mut options = VarOptions::new();
            if let Some(default) = fields.get("default") {
                options.default = Some(value_for(name, ty, default)?);
            }
            match fields.get("allowed") {
                None => {}
                Some(Json::Array(items)) => {
                    let allowed = items
                        .iter()
                        .map(|item| value_for(name, ty, item))
                        .collect::<Result<Vec<_>>>()?;
                    options.allowed = Some(allowed);
                }
                Some(other) => {
                    return Err(ConfigError::shape(
                        name,
                        format!("'allowed' must be an array, found {}", json_kind(other)),
                    ))
                }
            }
            Ok(VarSpec::with(ty, options))
        }
        other => Err(ConfigError::shape(
            name,
            format!("entry must be a type name, array or object, found {}", json_kind(other)),
        )),
    }
}

fn parse_tag(name: &str, tag: &str) -> Result<TypeTag> {
    tag.parse::<TypeTag>().map_err(|reason| ConfigError::shape(name, reason))
}

/// Convert a document literal into a value of type `ty`.
fn value_for(name: &str, ty: TypeTag, json: &Json) -> Result<Value> {
    let converted = match (ty, json) {
        (TypeTag::String, Json::String(s)) => Some(Value::String(s.clone())),
        (TypeTag::Integer, Json::Number(n)) => n.as_i64().map(Value::Integer),
        (TypeTag::Boolean, Json::Bool(b)) => Some(Value::Boolean(*b)),
        (TypeTag::List, Json::Array(items)) => items
            .iter()
            .map(|i| i.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .map(Value::List),
        (TypeTag::Decimal, Json::String(s)) => parse_decimal(s).map(Value::Decimal),
        (TypeTag::Decimal, Json::Number(n)) => parse_decimal(&n.to_string()).map(Value::Decimal),
        (TypeTag::DateTime, Json::String(s)) => parse_datetime(s).map(Value::DateTime),
        (TypeTag::Path, Json::String(s)) => Some(Value::Path(PathBuf::from(s))),
        (TypeTag::Json, any) => Some(Value::Json(any.clone())),
        _ => None,
    };
    converted.ok_or_else(|| {
        ConfigError::shape(name, format!("literal {} is not a valid {}", json, ty))
    })
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
