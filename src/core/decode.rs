//! Purpose: Decode raw response payloads and classify API-level errors.
//! Exports: `Decoded`.
//! Role: Parser boundary between transport bytes and typed record mapping.
//! Invariants: Classification runs on every payload, the authorization call included.
//! Invariants: `errors`/`message` keys always surface as `ErrorKind::Api`.

use crate::core::error::{ApiResult, Error, ErrorKind};
use serde_json::{Map, Value};

/// One decoded response object. Transient: owned by the caller for the
/// duration of a single request.
#[derive(Clone, Debug)]
pub struct Decoded {
    object: Map<String, Value>,
}

impl Decoded {
    /// Parse `raw` as a UTF-8 JSON object and classify it. An `errors` key
    /// yields `"{code}: {message}"` when a top-level `message` is present,
    /// else `"{code}: "` plus the newline-joined `message` sub-field of each
    /// entry. A bare `message` key yields that message. Anything else is
    /// returned unchanged for the caller to map into a record.
    pub fn from_bytes(raw: &[u8]) -> ApiResult<Self> {
        let value: Value = serde_json::from_slice(raw).map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("invalid response json")
                .with_source(err)
        })?;
        let Value::Object(object) = value else {
            return Err(
                Error::new(ErrorKind::Internal).with_message("response is not a json object")
            );
        };
        classify(&object)?;
        Ok(Self { object })
    }

    pub fn from_object(object: Map<String, Value>) -> Self {
        Self { object }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.object.get(key)
    }

    pub fn object(&self) -> &Map<String, Value> {
        &self.object
    }

    pub fn into_object(self) -> Map<String, Value> {
        self.object
    }

    pub fn array(&self, key: &str) -> Option<&Vec<Value>> {
        self.object.get(key).and_then(Value::as_array)
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.object.get(key).and_then(Value::as_str)
    }

    pub fn bool_field(&self, key: &str) -> Option<bool> {
        self.object.get(key).and_then(Value::as_bool)
    }

    pub fn u64_field(&self, key: &str) -> Option<u64> {
        self.object.get(key).and_then(Value::as_u64)
    }
}

fn classify(object: &Map<String, Value>) -> ApiResult<()> {
    if let Some(errors) = object.get("errors") {
        let code = object.get("code").map(render).unwrap_or_default();
        if let Some(message) = object.get("message") {
            return Err(Error::new(ErrorKind::Api)
                .with_message(format!("{code}: {}", render(message))));
        }
        let joined = errors
            .as_array()
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| entry.get("message"))
                    .map(render)
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default();
        return Err(Error::new(ErrorKind::Api).with_message(format!("{code}: {joined}")));
    }
    if let Some(message) = object.get("message") {
        return Err(Error::new(ErrorKind::Api).with_message(render(message)));
    }
    Ok(())
}

fn render(value: &Value) -> String {
    match value {
        Value::String(raw) => raw.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::Decoded;
    use crate::core::error::ErrorKind;

    #[test]
    fn error_list_joins_entry_messages() {
        let err = Decoded::from_bytes(br#"{"errors":[{"message":"bad id"}],"code":400}"#)
            .expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Api);
        assert_eq!(err.message(), Some("400: bad id"));
    }

    #[test]
    fn error_list_joins_multiple_entries_with_newlines() {
        let raw = br#"{"errors":[{"message":"first"},{"message":"second"}],"code":409}"#;
        let err = Decoded::from_bytes(raw).expect_err("err");
        assert_eq!(err.message(), Some("409: first\nsecond"));
    }

    #[test]
    fn top_level_message_wins_over_entry_messages() {
        let raw = br#"{"errors":[{"message":"entry"}],"code":403,"message":"denied"}"#;
        let err = Decoded::from_bytes(raw).expect_err("err");
        assert_eq!(err.message(), Some("403: denied"));
    }

    #[test]
    fn bare_message_is_api_error() {
        let err = Decoded::from_bytes(br#"{"message":"oops"}"#).expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Api);
        assert_eq!(err.message(), Some("oops"));
    }

    #[test]
    fn success_payload_passes_through_unchanged() {
        let decoded =
            Decoded::from_bytes(br#"{"segments":[{"id":1}],"rows":5}"#).expect("decoded");
        assert_eq!(decoded.u64_field("rows"), Some(5));
        assert_eq!(decoded.array("segments").expect("segments").len(), 1);
    }

    #[test]
    fn invalid_json_is_internal_error() {
        let err = Decoded::from_bytes(b"{not json").expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn non_object_payload_is_internal_error() {
        let err = Decoded::from_bytes(b"[1,2,3]").expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
