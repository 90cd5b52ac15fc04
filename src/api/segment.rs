//! Purpose: Concrete typed records for segment API responses.
//! Exports: `Segment`, `SegmentFile`.
//! Role: Schema tables mirroring the documented response shapes, field-for-field.
//! Invariants: Schemas are fixed; unknown response keys never become fields.

use crate::core::error::{ApiResult, Error, ErrorKind};
use crate::core::record::{
    Coercion, FieldValue, Record, coerce_bool, coerce_datetime, coerce_int, coerce_str,
};
use serde_json::Value;
use time::OffsetDateTime;

const SEGMENT_SCHEMA: &[(&str, Coercion)] = &[
    ("id", coerce_int),
    ("name", coerce_str),
    ("type", coerce_str),
    ("status", coerce_str),
    ("create_time", coerce_datetime),
    ("owner", coerce_str),
    ("has_guests", coerce_bool),
    ("guest_quantity", coerce_int),
    ("can_create_dependent", coerce_bool),
    ("has_derivatives", coerce_bool),
    ("cookies_matched_quantity", coerce_int),
    ("hashed", coerce_bool),
    ("content_type", coerce_str),
    ("item_quantity", coerce_int),
    ("valid_unique_quantity", coerce_int),
    ("valid_unique_percentage", coerce_str),
    ("matched_quantity", coerce_int),
    ("matched_percentage", coerce_str),
    ("counter_id", coerce_int),
    ("guest", coerce_bool),
];

const SEGMENT_FILE_SCHEMA: &[(&str, Coercion)] = &[
    ("id", coerce_int),
    ("type", coerce_str),
    ("status", coerce_str),
    ("has_guests", coerce_bool),
    ("guest_quantity", coerce_int),
    ("can_create_dependent", coerce_bool),
    ("has_derivatives", coerce_bool),
    ("cookies_matched_quantity", coerce_int),
    ("hashed", coerce_bool),
    ("item_quantity", coerce_int),
    ("guest", coerce_bool),
];

fn require_object<'a>(value: &'a Value, what: &str) -> ApiResult<&'a serde_json::Map<String, Value>> {
    value.as_object().ok_or_else(|| {
        Error::new(ErrorKind::Internal).with_message(format!("{what} payload is not an object"))
    })
}

/// A named audience group managed via the remote API.
#[derive(Clone, Debug)]
pub struct Segment {
    record: Record,
}

impl Segment {
    pub fn new() -> Self {
        Self {
            record: Record::new(SEGMENT_SCHEMA),
        }
    }

    pub fn from_value(value: &Value) -> ApiResult<Self> {
        let object = require_object(value, "segment")?;
        let mut segment = Self::new();
        segment.record.import(object)?;
        Ok(segment)
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }

    pub fn id(&self) -> Option<i64> {
        int_field(&self.record, "id")
    }

    pub fn name(&self) -> Option<&str> {
        str_field(&self.record, "name")
    }

    /// The `type` response field.
    pub fn kind(&self) -> Option<&str> {
        str_field(&self.record, "type")
    }

    pub fn status(&self) -> Option<&str> {
        str_field(&self.record, "status")
    }

    pub fn create_time(&self) -> Option<OffsetDateTime> {
        time_field(&self.record, "create_time")
    }

    pub fn owner(&self) -> Option<&str> {
        str_field(&self.record, "owner")
    }

    pub fn has_guests(&self) -> Option<bool> {
        bool_field(&self.record, "has_guests")
    }

    pub fn guest_quantity(&self) -> Option<i64> {
        int_field(&self.record, "guest_quantity")
    }

    pub fn can_create_dependent(&self) -> Option<bool> {
        bool_field(&self.record, "can_create_dependent")
    }

    pub fn has_derivatives(&self) -> Option<bool> {
        bool_field(&self.record, "has_derivatives")
    }

    pub fn cookies_matched_quantity(&self) -> Option<i64> {
        int_field(&self.record, "cookies_matched_quantity")
    }

    pub fn hashed(&self) -> Option<bool> {
        bool_field(&self.record, "hashed")
    }

    pub fn content_type(&self) -> Option<&str> {
        str_field(&self.record, "content_type")
    }

    pub fn item_quantity(&self) -> Option<i64> {
        int_field(&self.record, "item_quantity")
    }

    pub fn valid_unique_quantity(&self) -> Option<i64> {
        int_field(&self.record, "valid_unique_quantity")
    }

    pub fn valid_unique_percentage(&self) -> Option<&str> {
        str_field(&self.record, "valid_unique_percentage")
    }

    pub fn matched_quantity(&self) -> Option<i64> {
        int_field(&self.record, "matched_quantity")
    }

    pub fn matched_percentage(&self) -> Option<&str> {
        str_field(&self.record, "matched_percentage")
    }

    pub fn counter_id(&self) -> Option<i64> {
        int_field(&self.record, "counter_id")
    }

    pub fn guest(&self) -> Option<bool> {
        bool_field(&self.record, "guest")
    }
}

impl Default for Segment {
    fn default() -> Self {
        Self::new()
    }
}

/// Upload state of a segment file before confirmation.
#[derive(Clone, Debug)]
pub struct SegmentFile {
    record: Record,
}

impl SegmentFile {
    pub fn new() -> Self {
        Self {
            record: Record::new(SEGMENT_FILE_SCHEMA),
        }
    }

    pub fn from_value(value: &Value) -> ApiResult<Self> {
        let object = require_object(value, "segment file")?;
        let mut file = Self::new();
        file.record.import(object)?;
        Ok(file)
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }

    pub fn id(&self) -> Option<i64> {
        int_field(&self.record, "id")
    }

    /// The `type` response field.
    pub fn kind(&self) -> Option<&str> {
        str_field(&self.record, "type")
    }

    pub fn status(&self) -> Option<&str> {
        str_field(&self.record, "status")
    }

    pub fn has_guests(&self) -> Option<bool> {
        bool_field(&self.record, "has_guests")
    }

    pub fn guest_quantity(&self) -> Option<i64> {
        int_field(&self.record, "guest_quantity")
    }

    pub fn can_create_dependent(&self) -> Option<bool> {
        bool_field(&self.record, "can_create_dependent")
    }

    pub fn has_derivatives(&self) -> Option<bool> {
        bool_field(&self.record, "has_derivatives")
    }

    pub fn cookies_matched_quantity(&self) -> Option<i64> {
        int_field(&self.record, "cookies_matched_quantity")
    }

    pub fn hashed(&self) -> Option<bool> {
        bool_field(&self.record, "hashed")
    }

    pub fn item_quantity(&self) -> Option<i64> {
        int_field(&self.record, "item_quantity")
    }

    pub fn guest(&self) -> Option<bool> {
        bool_field(&self.record, "guest")
    }
}

impl Default for SegmentFile {
    fn default() -> Self {
        Self::new()
    }
}

fn int_field(record: &Record, field: &str) -> Option<i64> {
    record.get(field).ok().flatten().and_then(FieldValue::as_int)
}

fn bool_field(record: &Record, field: &str) -> Option<bool> {
    record
        .get(field)
        .ok()
        .flatten()
        .and_then(FieldValue::as_bool)
}

fn time_field(record: &Record, field: &str) -> Option<OffsetDateTime> {
    record
        .get(field)
        .ok()
        .flatten()
        .and_then(FieldValue::as_time)
}

fn str_field<'a>(record: &'a Record, field: &str) -> Option<&'a str> {
    record.get(field).ok().flatten().and_then(FieldValue::as_str)
}
