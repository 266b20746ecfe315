//! Value model for what a loaded plugin module exports.
//!
//! A module's root export is an [`Export`]: plain data, a named zero-argument
//! function, or an object of further exports keyed by name.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

type CallFn = dyn Fn() -> Result<Export> + Send + Sync;

/// Named zero-argument callable exported by a plugin.
#[derive(Clone)]
pub struct ExportFn {
    name: String,
    call: Arc<CallFn>,
}

impl ExportFn {
    pub fn new<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn() -> Result<Export> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            call: Arc::new(f),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self) -> Result<Export> {
        (self.call)()
    }
}

impl fmt::Debug for ExportFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Function {}]", self.name)
    }
}

/// Two handles are equal only when they share the same callable.
impl PartialEq for ExportFn {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && Arc::ptr_eq(&self.call, &other.call)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Export {
    Value(Value),
    Function(ExportFn),
    Object(BTreeMap<String, Export>),
}

impl Export {
    pub fn function<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn() -> Result<Export> + Send + Sync + 'static,
    {
        Export::Function(ExportFn::new(name, f))
    }

    /// Build an object export from `(name, export)` pairs.
    pub fn object<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Export)>,
        K: Into<String>,
    {
        Export::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Export::Object(_))
    }

    /// Read a named property. Only objects have properties.
    pub fn get(&self, name: &str) -> Option<&Export> {
        match self {
            Export::Object(map) => map.get(name),
            _ => None,
        }
    }

    /// Read a named property, treating falsy values like a missing one.
    pub fn get_present(&self, name: &str) -> Option<&Export> {
        self.get(name).filter(|export| export.is_present())
    }

    /// False for `null`, `false`, `""` and zero.
    pub fn is_present(&self) -> bool {
        match self {
            Export::Value(Value::Null) | Export::Value(Value::Bool(false)) => false,
            Export::Value(Value::String(s)) => !s.is_empty(),
            Export::Value(Value::Number(n)) => n.as_f64() != Some(0.0),
            _ => true,
        }
    }

    pub fn as_function(&self) -> Option<&ExportFn> {
        match self {
            Export::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Scalar rendering used for dictionary keys.
    pub fn as_key(&self) -> Option<String> {
        match self {
            Export::Value(Value::String(s)) => Some(s.clone()),
            Export::Value(Value::Number(n)) => Some(n.to_string()),
            Export::Value(Value::Bool(b)) => Some(b.to_string()),
            _ => None,
        }
    }
}

impl From<Value> for Export {
    fn from(value: Value) -> Self {
        Export::Value(value)
    }
}

impl From<&str> for Export {
    fn from(value: &str) -> Self {
        Export::Value(Value::String(value.to_string()))
    }
}

impl From<String> for Export {
    fn from(value: String) -> Self {
        Export::Value(Value::String(value))
    }
}

impl From<toml::Value> for Export {
    fn from(value: toml::Value) -> Self {
        match value {
            toml::Value::Table(table) => Export::Object(
                table
                    .into_iter()
                    .map(|(k, v)| (k, Export::from(v)))
                    .collect(),
            ),
            toml::Value::String(s) => Export::Value(Value::String(s)),
            toml::Value::Integer(i) => Export::Value(Value::from(i)),
            toml::Value::Float(f) => Export::Value(Value::from(f)),
            toml::Value::Boolean(b) => Export::Value(Value::Bool(b)),
            toml::Value::Datetime(d) => Export::Value(Value::String(d.to_string())),
            toml::Value::Array(items) => Export::Value(Value::Array(
                items.into_iter().map(toml_to_json).collect(),
            )),
        }
    }
}

fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => Value::from(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(d) => Value::String(d.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

/// Functions serialize as `"[Function <name>]"`.
impl Serialize for Export {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Export::Value(value) => value.serialize(serializer),
            Export::Function(f) => serializer.serialize_str(&format!("[Function {}]", f.name)),
            Export::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}
