//! Purpose: Provide the schema-constrained typed record backing API objects.
//! Exports: `Record`, `FieldValue`, `Coercion`, and the standard coercions.
//! Role: Generic mapping layer between untyped JSON payloads and typed fields.
//! Invariants: The declared field set is fixed; assigning an undeclared field fails.
//! Invariants: Every stored non-null value has passed its declared coercion.
//! Invariants: Iteration follows field declaration order.

use crate::core::error::{ApiResult, Error, ErrorKind};
use serde_json::{Map, Value};
use std::fmt;
use time::OffsetDateTime;
use time::format_description::FormatItem;
use time::macros::format_description;

/// Converter applied to a raw JSON value before storage.
pub type Coercion = fn(&Value) -> ApiResult<FieldValue>;

#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Str(String),
    Bool(bool),
    Time(OffsetDateTime),
}

impl FieldValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<OffsetDateTime> {
        match self {
            FieldValue::Time(value) => Some(*value),
            _ => None,
        }
    }
}

#[derive(Clone)]
struct Field {
    name: String,
    coerce: Coercion,
    value: Option<FieldValue>,
}

/// Key/value container whose field set and per-field coercions are fixed at
/// declaration time. Mirrors the remote API's documented response shapes so
/// field drift surfaces as an error instead of silent acceptance.
#[derive(Clone)]
pub struct Record {
    fields: Vec<Field>,
}

impl Record {
    pub fn new(schema: &[(&str, Coercion)]) -> Self {
        let mut record = Self { fields: Vec::new() };
        record.declare(schema);
        record
    }

    /// Replace the full declared field set; every value resets to null.
    pub fn declare(&mut self, schema: &[(&str, Coercion)]) {
        self.fields = schema
            .iter()
            .map(|(name, coerce)| Field {
                name: (*name).to_string(),
                coerce: *coerce,
                value: None,
            })
            .collect();
    }

    /// Declare one field, resetting its value to null. Re-declaring an
    /// existing field replaces its coercion in place.
    pub fn declare_field(&mut self, field: &str, coerce: Coercion) {
        match self.position(field) {
            Some(pos) => {
                self.fields[pos].coerce = coerce;
                self.fields[pos].value = None;
            }
            None => self.fields.push(Field {
                name: field.to_string(),
                coerce,
                value: None,
            }),
        }
    }

    pub fn set(&mut self, field: &str, value: &Value) -> ApiResult<()> {
        let pos = self
            .position(field)
            .ok_or_else(|| undeclared_field(field))?;
        let stored = if value.is_null() {
            None
        } else {
            Some((self.fields[pos].coerce)(value).map_err(|err| err.with_field(field))?)
        };
        self.fields[pos].value = stored;
        Ok(())
    }

    pub fn get(&self, field: &str) -> ApiResult<Option<&FieldValue>> {
        let pos = self
            .position(field)
            .ok_or_else(|| undeclared_field(field))?;
        Ok(self.fields[pos].value.as_ref())
    }

    /// Copy every declared field present as a key in `source`. Extra source
    /// keys are ignored; absent keys leave the prior value untouched.
    pub fn import(&mut self, source: &Map<String, Value>) -> ApiResult<()> {
        for pos in 0..self.fields.len() {
            let name = self.fields[pos].name.clone();
            if let Some(value) = source.get(&name) {
                self.set(&name, value)?;
            }
        }
        Ok(())
    }

    /// Delete both the value and the declaration of `field`.
    pub fn remove(&mut self, field: &str) -> ApiResult<()> {
        let pos = self
            .position(field)
            .ok_or_else(|| undeclared_field(field))?;
        self.fields.remove(pos);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Declared field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }

    fn position(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|entry| entry.name == field)
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.fields.iter().map(|field| (&field.name, &field.value)))
            .finish()
    }
}

fn undeclared_field(field: &str) -> Error {
    Error::new(ErrorKind::Schema)
        .with_message("undeclared field")
        .with_field(field)
}

fn coercion_error(expected: &str, value: &Value) -> Error {
    Error::new(ErrorKind::Coercion).with_message(format!("cannot coerce {value} to {expected}"))
}

pub fn coerce_int(value: &Value) -> ApiResult<FieldValue> {
    match value {
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                Ok(FieldValue::Int(int))
            } else if let Some(float) = number.as_f64() {
                Ok(FieldValue::Int(float as i64))
            } else {
                Err(coercion_error("int", value))
            }
        }
        Value::Bool(flag) => Ok(FieldValue::Int(i64::from(*flag))),
        Value::String(raw) => raw
            .trim()
            .parse::<i64>()
            .map(FieldValue::Int)
            .map_err(|err| coercion_error("int", value).with_source(err)),
        _ => Err(coercion_error("int", value)),
    }
}

pub fn coerce_str(value: &Value) -> ApiResult<FieldValue> {
    match value {
        Value::String(raw) => Ok(FieldValue::Str(raw.clone())),
        Value::Number(number) => Ok(FieldValue::Str(number.to_string())),
        Value::Bool(flag) => Ok(FieldValue::Str(flag.to_string())),
        _ => Err(coercion_error("str", value)),
    }
}

pub fn coerce_bool(value: &Value) -> ApiResult<FieldValue> {
    match value {
        Value::Bool(flag) => Ok(FieldValue::Bool(*flag)),
        Value::Number(number) => Ok(FieldValue::Bool(number.as_f64() != Some(0.0))),
        Value::String(raw) => match raw.as_str() {
            "true" => Ok(FieldValue::Bool(true)),
            "false" => Ok(FieldValue::Bool(false)),
            _ => Err(coercion_error("bool", value)),
        },
        _ => Err(coercion_error("bool", value)),
    }
}

pub fn coerce_datetime(value: &Value) -> ApiResult<FieldValue> {
    match value {
        Value::String(raw) => parse_offset_timestamp(raw).map(FieldValue::Time),
        _ => Err(coercion_error("datetime", value)),
    }
}

const TIMESTAMP_FORMAT: &[FormatItem<'static>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour sign:mandatory][offset_minute]"
);

/// Parse an ISO-8601 timestamp whose UTC offset has no colon separator
/// (`+0300`), the form the Audience API emits. A `±HH:MM` offset is first
/// normalized by dropping the last three characters and appending the final
/// two, which strips the colon.
pub fn parse_offset_timestamp(raw: &str) -> ApiResult<OffsetDateTime> {
    let normalized = normalize_offset(raw);
    OffsetDateTime::parse(&normalized, TIMESTAMP_FORMAT).map_err(|err| {
        Error::new(ErrorKind::Coercion)
            .with_message(format!("invalid timestamp {raw:?}"))
            .with_source(err)
    })
}

fn normalize_offset(raw: &str) -> String {
    let bytes = raw.as_bytes();
    if bytes.len() >= 3 && bytes[bytes.len() - 3] == b':' {
        let mut normalized = String::with_capacity(raw.len() - 1);
        normalized.push_str(&raw[..raw.len() - 3]);
        normalized.push_str(&raw[raw.len() - 2..]);
        normalized
    } else {
        raw.to_string()
    }
}
