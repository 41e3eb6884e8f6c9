//! Validation of user-supplied theme configuration.
//!
//! [`ConfigSchema`] is the seam for any validator. Two are built in: a
//! permissive [`AnySchema`] and a small declarative [`ObjectSchema`] that a
//! theme manifest can spell out in TOML.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Validates user configuration, returning the parsed value (defaults
/// applied) or every issue found.
pub trait ConfigSchema: Send + Sync
{
    fn validate(
        &self,
        input: &Value,
    ) -> Result<Value, Vec<String>>;
}

/// Accepts anything unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct AnySchema;

impl ConfigSchema for AnySchema
{
    fn validate(
        &self,
        input: &Value,
    ) -> Result<Value, Vec<String>>
    {
        Ok(input.clone())
    }
}

/// JSON value kinds a field may require
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind
{
    String,
    Number,
    Boolean,
    Array,
    Object,
    #[default]
    Any,
}

impl FieldKind
{
    fn matches(
        self,
        value: &Value,
    ) -> bool
    {
        match self
        {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
            Self::Any => true,
        }
    }

    fn of(value: &Value) -> &'static str
    {
        match value
        {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

impl fmt::Display for FieldKind
{
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result
    {
        let name = match self
        {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Any => "any",
        };
        f.write_str(name)
    }
}

/// One top-level configuration key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec
{
    #[serde(rename = "type", default)]
    pub kind: FieldKind,

    #[serde(default)]
    pub required: bool,

    pub default: Option<Value>,
}

/// Object schema with typed top-level keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectSchema
{
    #[serde(default)]
    pub fields: IndexMap<String, FieldSpec>,

    /// Reject keys not listed in `fields`
    #[serde(default)]
    pub strict: bool,
}

impl ConfigSchema for ObjectSchema
{
    fn validate(
        &self,
        input: &Value,
    ) -> Result<Value, Vec<String>>
    {
        let empty = Map::new();
        let object = match input
        {
            Value::Object(map) => map,
            Value::Null => &empty,
            other => return Err(vec![format!("config: expected object, received {}", FieldKind::of(other))]),
        };

        let mut issues = Vec::new();
        let mut out = Map::new();

        for (key, field) in &self.fields
        {
            match object.get(key)
            {
                Some(value) if field
                    .kind
                    .matches(value) =>
                {
                    out.insert(key.clone(), value.clone());
                }
                Some(value) =>
                {
                    issues.push(format!(
                        "config.{key}: expected {}, received {}",
                        field.kind,
                        FieldKind::of(value)
                    ));
                }
                None => match &field.default
                {
                    Some(default) =>
                    {
                        out.insert(key.clone(), default.clone());
                    }
                    None if field.required => issues.push(format!("config.{key}: required")),
                    None =>
                    {}
                },
            }
        }

        let unknown: Vec<&str> = object
            .keys()
            .filter(|key| {
                !self
                    .fields
                    .contains_key(*key)
            })
            .map(String::as_str)
            .collect();

        if self.strict && !unknown.is_empty()
        {
            issues.push(format!("config: unrecognized key(s) {}", unknown.join(", ")));
        }
        else
        {
            for key in unknown
            {
                out.insert(key.to_string(), object[key].clone());
            }
        }

        if issues.is_empty() { Ok(Value::Object(out)) } else { Err(issues) }
    }
}
