//! Data-driven document validation.
//!
//! Every collection is described by a [`Schema`]: an ordered table of
//! [`FieldRule`]s. The same table drives casting, normalization, defaults and
//! constraint checks for creates and for the merged document on updates.

pub mod client;
pub mod perfume;
pub mod user;

use regex::Regex;
use serde_json::{Map, Number, Value};
use thiserror::Error;

use crate::types::Operation;

pub use client::CLIENT_SCHEMA;
pub use perfume::{FRAGRANCE_FAMILIES, GENDERS, PERFUME_SCHEMA};
pub use user::USER_SCHEMA;

/// Field map of a stored document, without `_id` and timestamps.
pub type Document = Map<String, Value>;

/// A single failing field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every field that failed validation, in schema order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Validation error ({} fields)", .errors.len())]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.message.clone()).collect()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Boolean,
    StringArray,
}

impl FieldType {
    fn cast_name(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "Number",
            FieldType::Boolean => "Boolean",
            FieldType::StringArray => "[string]",
        }
    }
}

#[derive(Debug)]
struct Pattern {
    regex: Regex,
    message: &'static str,
}

/// Constraints for one field. Built with the chained constructors below.
#[derive(Debug)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldType,
    required: Option<&'static str>,
    trim: bool,
    lowercase: bool,
    min_length: Option<(usize, &'static str)>,
    max_length: Option<(usize, &'static str)>,
    min: Option<(f64, &'static str)>,
    one_of: Option<(&'static [&'static str], &'static str)>,
    pattern: Option<Pattern>,
    default: Option<Value>,
    pub unique: bool,
}

impl FieldRule {
    fn new(name: &'static str, kind: FieldType) -> Self {
        Self {
            name,
            kind,
            required: None,
            trim: false,
            lowercase: false,
            min_length: None,
            max_length: None,
            min: None,
            one_of: None,
            pattern: None,
            default: None,
            unique: false,
        }
    }

    pub fn string(name: &'static str) -> Self {
        Self::new(name, FieldType::String)
    }

    pub fn number(name: &'static str) -> Self {
        Self::new(name, FieldType::Number)
    }

    pub fn boolean(name: &'static str) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    /// Array fields always default to `[]`.
    pub fn string_array(name: &'static str) -> Self {
        Self::new(name, FieldType::StringArray).default(Value::Array(Vec::new()))
    }

    pub fn required(mut self, message: &'static str) -> Self {
        self.required = Some(message);
        self
    }

    pub fn trim(mut self) -> Self {
        self.trim = true;
        self
    }

    pub fn lowercase(mut self) -> Self {
        self.lowercase = true;
        self
    }

    pub fn min_length(mut self, len: usize, message: &'static str) -> Self {
        self.min_length = Some((len, message));
        self
    }

    pub fn max_length(mut self, len: usize, message: &'static str) -> Self {
        self.max_length = Some((len, message));
        self
    }

    pub fn min(mut self, value: f64, message: &'static str) -> Self {
        self.min = Some((value, message));
        self
    }

    /// `message` may contain `{VALUE}`, replaced with the rejected value.
    pub fn one_of(mut self, values: &'static [&'static str], message: &'static str) -> Self {
        self.one_of = Some((values, message));
        self
    }

    /// Panics on an invalid expression; patterns are compile-time literals.
    pub fn matches(mut self, pattern: &str, message: &'static str) -> Self {
        let regex = Regex::new(pattern).unwrap_or_else(|e| panic!("invalid pattern for {}: {}", self.name, e));
        self.pattern = Some(Pattern { regex, message });
        self
    }

    pub fn default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Coerce raw input into this field's type. `Null` survives casting so
    /// updates can clear optional fields.
    fn cast(&self, raw: &Value) -> Result<Value, String> {
        if raw.is_null() {
            return Ok(Value::Null);
        }
        match self.kind {
            FieldType::String => self.cast_string(raw),
            FieldType::Number => self.cast_number(raw),
            FieldType::Boolean => self.cast_boolean(raw),
            FieldType::StringArray => {
                let items = match raw {
                    Value::Array(items) => items.clone(),
                    other => vec![other.clone()],
                };
                items
                    .iter()
                    .map(|item| self.cast_string(item))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array)
                    .map_err(|_| self.cast_failure(raw))
            }
        }
    }

    fn cast_string(&self, raw: &Value) -> Result<Value, String> {
        let mut s = match raw {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return Err(self.cast_failure(raw)),
        };
        if self.trim {
            s = s.trim().to_string();
        }
        if self.lowercase {
            s = s.to_lowercase();
        }
        Ok(Value::String(s))
    }

    fn cast_number(&self, raw: &Value) -> Result<Value, String> {
        match raw {
            Value::Number(_) => Ok(raw.clone()),
            Value::String(s) if s.trim().is_empty() => Ok(Value::Null),
            Value::String(s) => {
                let parsed: f64 = s.trim().parse().map_err(|_| self.cast_failure(raw))?;
                number_value(parsed).ok_or_else(|| self.cast_failure(raw))
            }
            _ => Err(self.cast_failure(raw)),
        }
    }

    fn cast_boolean(&self, raw: &Value) -> Result<Value, String> {
        match raw {
            Value::Bool(_) => Ok(raw.clone()),
            Value::String(s) => match s.as_str() {
                "true" | "1" | "yes" => Ok(Value::Bool(true)),
                "false" | "0" | "no" => Ok(Value::Bool(false)),
                _ => Err(self.cast_failure(raw)),
            },
            Value::Number(n) => match n.as_f64() {
                Some(v) if v == 1.0 => Ok(Value::Bool(true)),
                Some(v) if v == 0.0 => Ok(Value::Bool(false)),
                _ => Err(self.cast_failure(raw)),
            },
            _ => Err(self.cast_failure(raw)),
        }
    }

    fn cast_failure(&self, raw: &Value) -> String {
        let shown = match raw {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        format!(
            "Cast to {} failed for value \"{}\" (type {}) at path \"{}\"",
            self.kind.cast_name(),
            shown,
            value_type(raw),
            self.name
        )
    }

    /// First failing constraint for a present, already-cast value.
    fn check(&self, value: &Value) -> Option<String> {
        match value {
            Value::String(s) => {
                if self.required.is_some() && s.is_empty() {
                    return self.required.map(str::to_string);
                }
                self.check_str(s)
            }
            Value::Number(n) => {
                let v = n.as_f64()?;
                match self.min {
                    Some((min, message)) if v < min => Some(message.to_string()),
                    _ => None,
                }
            }
            Value::Array(items) => items.iter().enumerate().find_map(|(index, item)| {
                let s = item.as_str()?;
                let (values, _) = self.one_of?;
                (!values.contains(&s)).then(|| {
                    format!("`{}` is not a valid enum value for path `{}.{}`.", s, self.name, index)
                })
            }),
            _ => None,
        }
    }

    fn check_str(&self, s: &str) -> Option<String> {
        if let Some((values, message)) = self.one_of {
            if !values.contains(&s) {
                return Some(message.replace("{VALUE}", s));
            }
        }
        let len = s.chars().count();
        if let Some((min, message)) = self.min_length {
            if len < min {
                return Some(message.to_string());
            }
        }
        if let Some((max, message)) = self.max_length {
            if len > max {
                return Some(message.to_string());
            }
        }
        if let Some(pattern) = &self.pattern {
            if !pattern.regex.is_match(s) {
                return Some(pattern.message.to_string());
            }
        }
        None
    }
}

fn value_type(raw: &Value) -> &'static str {
    match raw {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "Array",
        Value::Object(_) => "Object",
    }
}

fn number_value(v: f64) -> Option<Value> {
    if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        Some(Value::Number(Number::from(v as i64)))
    } else {
        Number::from_f64(v).map(Value::Number)
    }
}

/// Field table for one collection.
#[derive(Debug)]
pub struct Schema {
    /// Store collection name.
    pub collection: &'static str,
    /// Singular entity name used in response messages, e.g. `"Perfume"`.
    pub entity: &'static str,
    /// Plural form used in list error messages.
    pub plural: &'static str,
    pub fields: Vec<FieldRule>,
}

impl Schema {
    pub fn new(collection: &'static str, entity: &'static str, plural: &'static str) -> Self {
        Self {
            collection,
            entity,
            plural,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, rule: FieldRule) -> Self {
        self.fields.push(rule);
        self
    }

    pub fn unique_fields(&self) -> Vec<&'static str> {
        self.fields.iter().filter(|f| f.unique).map(|f| f.name).collect()
    }

    /// Build the document to persist.
    ///
    /// On `Create` the input is cast and defaults fill absent fields; an
    /// explicit `null` is kept and never defaulted. On `Update` the cast
    /// input is merged onto `base` (`null` removes the field). Unknown input fields are dropped. The resulting document is
    /// validated as a whole.
    pub fn prepare(
        &self,
        op: Operation,
        base: &Document,
        input: &Document,
    ) -> Result<Document, ValidationErrors> {
        let mut doc = match op {
            Operation::Create => Document::new(),
            Operation::Update => base.clone(),
        };
        let mut cast_errors: Vec<FieldError> = Vec::new();

        for rule in &self.fields {
            let Some(raw) = input.get(rule.name) else {
                continue;
            };
            match rule.cast(raw) {
                Ok(Value::Null) => match op {
                    Operation::Create => {
                        doc.insert(rule.name.to_string(), Value::Null);
                    }
                    Operation::Update => {
                        doc.remove(rule.name);
                    }
                },
                Ok(value) => {
                    doc.insert(rule.name.to_string(), value);
                }
                Err(message) => cast_errors.push(FieldError {
                    field: rule.name.to_string(),
                    message,
                }),
            }
        }

        if op == Operation::Create {
            for rule in &self.fields {
                if let Some(default) = &rule.default {
                    if !doc.contains_key(rule.name) {
                        doc.insert(rule.name.to_string(), default.clone());
                    }
                }
            }
        }

        let mut errors = Vec::new();
        for rule in &self.fields {
            if let Some(cast) = cast_errors.iter().find(|e| e.field == rule.name) {
                errors.push(cast.clone());
                continue;
            }
            let message = match doc.get(rule.name) {
                None | Some(Value::Null) => rule.required.map(str::to_string),
                Some(value) => rule.check(value),
            };
            if let Some(message) = message {
                errors.push(FieldError {
                    field: rule.name.to_string(),
                    message,
                });
            }
        }

        if errors.is_empty() {
            Ok(doc)
        } else {
            Err(ValidationErrors { errors })
        }
    }
}
