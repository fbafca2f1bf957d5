//! Raw input normalisation
//!
//! Callers hand the schemas a [`RawRecord`]: an untyped mapping as it came
//! from a JSON body or a database row. Unlike JSON, a raw record can tell a
//! set from a list, which the keyword fields rely on.
//!
//! [`Normalizer`] is the first phase of every construction: it reads fields
//! into a typed draft, recording presence and type failures instead of
//! stopping at the first one. Constraint checks run afterwards on the draft.

use axum::body::Bytes;
use serde_json::{Map, Number, Value};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::errors::{FieldError, ModelError};

/// An untyped field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Bytes),
    List(Vec<FieldValue>),
    Set(BTreeSet<String>),
    Map(RawRecord),
}

impl FieldValue {
    /// Build a set value from any string iterator
    pub fn set<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldValue::Set(items.into_iter().map(Into::into).collect())
    }

    /// Name of the value's type, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Bool(_) => "bool",
            FieldValue::Int(_) => "int",
            FieldValue::Float(_) => "float",
            FieldValue::Text(_) => "string",
            FieldValue::Bytes(_) => "bytes",
            FieldValue::List(_) => "list",
            FieldValue::Set(_) => "set",
            FieldValue::Map(_) => "mapping",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Convert to JSON. Sets become sorted arrays, bytes become byte arrays.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Int(i) => Value::from(*i),
            FieldValue::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Bytes(b) => Value::Array(b.iter().map(|byte| Value::from(*byte)).collect()),
            FieldValue::List(items) => Value::Array(items.iter().map(FieldValue::to_json).collect()),
            FieldValue::Set(items) => Value::Array(items.iter().cloned().map(Value::String).collect()),
            FieldValue::Map(record) => record.to_json(),
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Int(i),
                None => FieldValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => FieldValue::Text(s),
            Value::Array(items) => FieldValue::List(items.into_iter().map(FieldValue::from).collect()),
            Value::Object(map) => FieldValue::Map(RawRecord::from(map)),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Int(value.into())
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Int(value.into())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<Bytes> for FieldValue {
    fn from(value: Bytes) -> Self {
        FieldValue::Bytes(value)
    }
}

impl From<BTreeSet<String>> for FieldValue {
    fn from(value: BTreeSet<String>) -> Self {
        FieldValue::Set(value)
    }
}

impl From<HashSet<String>> for FieldValue {
    fn from(value: HashSet<String>) -> Self {
        FieldValue::Set(value.into_iter().collect())
    }
}

impl From<RawRecord> for FieldValue {
    fn from(value: RawRecord) -> Self {
        FieldValue::Map(value)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(value: Vec<T>) -> Self {
        FieldValue::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// Untyped mapping of field name to value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.fields.insert(key.into(), value.into())
    }

    /// Look a field up by its snake_case name, falling back to camelCase
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields
            .get(key)
            .or_else(|| self.fields.get(&camel_case(key)))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Build from a JSON object. JSON arrays always become lists.
    pub fn from_json(value: &Value) -> Result<Self, ModelError> {
        match value {
            Value::Object(map) => Ok(Self::from(map.clone())),
            other => Err(ModelError::from_field_errors(vec![FieldError::invalid(
                "$",
                format!("expected a JSON object, got {}", json_type_name(other)),
            )])),
        }
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl From<Map<String, Value>> for RawRecord {
    fn from(map: Map<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for ch in key.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Phase-one reader: typed field access that records failures
pub(crate) struct Normalizer<'a> {
    record: &'a RawRecord,
    path: String,
    errors: Vec<FieldError>,
}

impl<'a> Normalizer<'a> {
    pub(crate) fn new(record: &'a RawRecord) -> Self {
        Self::at(record, String::new())
    }

    pub(crate) fn at(record: &'a RawRecord, path: String) -> Self {
        Self {
            record,
            path,
            errors: Vec::new(),
        }
    }

    fn path(&self, field: &str) -> String {
        if self.path.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", self.path, field)
        }
    }

    /// Non-null value of `field`
    fn value(&self, field: &str) -> Option<&'a FieldValue> {
        self.record.get(field).filter(|v| !v.is_null())
    }

    /// Untyped access for free-form payload fields
    pub(crate) fn optional_value(&self, field: &str) -> Option<&'a FieldValue> {
        self.value(field)
    }

    pub(crate) fn has(&self, field: &str) -> bool {
        self.record.contains_key(field)
    }

    pub(crate) fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    fn wrong_type(&mut self, field: &str, expected: &str, got: &FieldValue) {
        let path = self.path(field);
        self.push(FieldError::invalid(
            path,
            format!("expected {}, got {}", expected, got.type_name()),
        ));
    }

    fn missing(&mut self, field: &str) {
        let path = self.path(field);
        self.push(FieldError::missing(path));
    }

    pub(crate) fn required_str(&mut self, field: &str) -> Option<String> {
        match self.value(field) {
            None => {
                self.missing(field);
                None
            }
            Some(value) => self.as_str(field, value),
        }
    }

    pub(crate) fn optional_str(&mut self, field: &str) -> Option<String> {
        let value = self.value(field)?;
        self.as_str(field, value)
    }

    fn as_str(&mut self, field: &str, value: &FieldValue) -> Option<String> {
        match value {
            FieldValue::Text(s) => Some(s.clone()),
            other => {
                self.wrong_type(field, "string", other);
                None
            }
        }
    }

    pub(crate) fn required_int(&mut self, field: &str) -> Option<i64> {
        match self.value(field) {
            None => {
                self.missing(field);
                None
            }
            Some(value) => self.as_int(field, value),
        }
    }

    pub(crate) fn optional_int(&mut self, field: &str) -> Option<i64> {
        let value = self.value(field)?;
        self.as_int(field, value)
    }

    fn as_int(&mut self, field: &str, value: &FieldValue) -> Option<i64> {
        match value {
            FieldValue::Int(i) => Some(*i),
            other => {
                self.wrong_type(field, "int", other);
                None
            }
        }
    }

    pub(crate) fn optional_bool(&mut self, field: &str) -> Option<bool> {
        match self.value(field)? {
            FieldValue::Bool(b) => Some(*b),
            other => {
                self.wrong_type(field, "bool", other);
                None
            }
        }
    }

    pub(crate) fn optional_bytes(&mut self, field: &str) -> Option<Bytes> {
        match self.value(field)? {
            FieldValue::Bytes(b) => Some(b.clone()),
            other => {
                self.wrong_type(field, "binary payload", other);
                None
            }
        }
    }

    /// A genuine set of strings. A list is rejected even when its items are unique.
    pub(crate) fn string_set(&mut self, field: &str) -> Option<BTreeSet<String>> {
        match self.value(field) {
            None => {
                self.missing(field);
                None
            }
            Some(FieldValue::Set(items)) => Some(items.clone()),
            Some(FieldValue::List(_)) => {
                let path = self.path(field);
                self.push(FieldError::invalid(path, "keywords must be a set, not a list"));
                None
            }
            Some(other) => {
                self.wrong_type(field, "set", other);
                None
            }
        }
    }

    /// A list of nested mappings, each read by `read` at path `field[i]`.
    ///
    /// Absent or null lists are missing when `required`, empty otherwise.
    pub(crate) fn records<T, F>(&mut self, field: &str, required: bool, read: F) -> Option<Vec<T>>
    where
        T: Default,
        F: Fn(&mut Normalizer<'_>) -> T,
    {
        let items = match self.value(field) {
            None if required => {
                self.missing(field);
                return None;
            }
            None => return Some(Vec::new()),
            Some(FieldValue::List(items)) => items,
            Some(other) => {
                self.wrong_type(field, "list", other);
                return None;
            }
        };

        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let path = format!("{}[{}]", self.path(field), i);
            match item {
                FieldValue::Map(record) => {
                    let mut child = Normalizer::at(record, path);
                    out.push(read(&mut child));
                    self.errors.extend(child.finish());
                }
                other => {
                    self.push(FieldError::invalid(
                        path,
                        format!("expected mapping, got {}", other.type_name()),
                    ));
                    out.push(T::default());
                }
            }
        }
        Some(out)
    }

    pub(crate) fn finish(self) -> Vec<FieldError> {
        self.errors
    }
}

/// Translate `validator` failures into field errors.
///
/// The failure code picks the kind: `missing` and `invariant` map to their
/// kinds, anything else (`doi`, `pages`, `path`, `range`) is a format error.
pub(crate) fn field_errors_from(errors: &ValidationErrors, prefix: &str) -> Vec<FieldError> {
    let mut out = Vec::new();
    collect(errors, prefix, &mut out);
    out
}

fn collect(errors: &ValidationErrors, prefix: &str, out: &mut Vec<FieldError>) {
    let mut entries: Vec<_> = errors.errors().iter().collect();
    entries.sort_by_key(|(field, _)| field.to_string());

    for (field, kind) in entries {
        // Raw identifiers (`r#abstract`) report under their wire name
        let field = field.trim_start_matches("r#");
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(failures) => {
                for failure in failures {
                    let message = failure
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| failure.code.to_string());
                    let error = match &*failure.code {
                        "missing" => FieldError::missing(path.clone()),
                        "invariant" => FieldError::invariant(path.clone(), message),
                        _ => FieldError::invalid(path.clone(), message),
                    };
                    out.push(error);
                }
            }
            ValidationErrorsKind::Struct(nested) => collect(nested, &path, out),
            ValidationErrorsKind::List(items) => {
                for (i, nested) in items {
                    collect(nested, &format!("{}[{}]", path, i), out);
                }
            }
        }
    }
}
