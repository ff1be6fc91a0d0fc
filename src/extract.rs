//! Pulling JSON out of free-form model output.
//!
//! Models are asked for JSON but routinely wrap it in prose or markdown code
//! fences. Extraction takes the widest bracket-delimited span (first opening
//! bracket to last closing bracket) and parses it. Callers that must not fail
//! use the `*_or_*` helpers, which degrade to an empty or raw-wrapped value.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value, json};
use thiserror::Error;

static ARRAY_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[\s\S]*\]").expect("Invalid regex"));
static OBJECT_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[\s\S]*\}").expect("Invalid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum JsonShape {
    Array,
    Object,
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no JSON {0} found in model output")]
    NotFound(JsonShape),

    #[error("malformed JSON {shape} in model output: {source}")]
    Malformed {
        shape: JsonShape,
        #[source]
        source: serde_json::Error,
    },
}

/// Finds and parses the widest `shape`-delimited span in `text`.
pub fn extract_json(text: &str, shape: JsonShape) -> Result<Value, ExtractError> {
    let pattern = match shape {
        JsonShape::Array => &*ARRAY_SPAN,
        JsonShape::Object => &*OBJECT_SPAN,
    };
    let span = pattern
        .find(text)
        .ok_or(ExtractError::NotFound(shape))?;
    let value: Value = serde_json::from_str(span.as_str())
        .map_err(|source| ExtractError::Malformed { shape, source })?;

    let matches_shape = match shape {
        JsonShape::Array => value.is_array(),
        JsonShape::Object => value.is_object(),
    };
    if matches_shape {
        Ok(value)
    } else {
        Err(ExtractError::NotFound(shape))
    }
}

pub fn extract_array(text: &str) -> Result<Vec<Value>, ExtractError> {
    match extract_json(text, JsonShape::Array)? {
        Value::Array(items) => Ok(items),
        _ => Err(ExtractError::NotFound(JsonShape::Array)),
    }
}

pub fn extract_object(text: &str) -> Result<Map<String, Value>, ExtractError> {
    match extract_json(text, JsonShape::Object)? {
        Value::Object(map) => Ok(map),
        _ => Err(ExtractError::NotFound(JsonShape::Object)),
    }
}

/// The array in `text`, or `[]` when there is none or it does not parse.
pub fn array_or_empty(text: &str) -> Vec<Value> {
    extract_array(text).unwrap_or_else(|error| {
        tracing::warn!(%error, "falling back to empty list");
        Vec::new()
    })
}

/// The object in `text`, or `{ "raw": text }` when there is none.
pub fn object_or_raw(text: &str) -> Value {
    match extract_object(text) {
        Ok(map) => Value::Object(map),
        Err(error) => {
            tracing::warn!(%error, "falling back to raw model output");
            json!({ "raw": text })
        }
    }
}

/// Reads `key` as a string, coercing absent or non-string values to `""`.
pub fn string_field(map: &Map<String, Value>, key: &str) -> String {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_inside_code_fence() {
        let text = "Here you go:\n```json\n[{\"title\": \"Post daily\"}, {\"title\": \"Run ads\"}]\n```\nEnjoy!";
        let items = extract_array(text).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1]["title"], "Run ads");
    }

    #[test]
    fn object_inside_prose() {
        let text = "Sure! {\"summary\": \"grow\", \"nested\": {\"a\": 1}} Let me know.";
        let map = extract_object(text).unwrap();
        assert_eq!(map["summary"], "grow");
        assert_eq!(map["nested"]["a"], 1);
    }

    #[test]
    fn missing_array_is_not_found() {
        assert!(matches!(
            extract_array("no structure here"),
            Err(ExtractError::NotFound(JsonShape::Array))
        ));
        assert!(array_or_empty("no structure here").is_empty());
    }

    #[test]
    fn greedy_span_over_two_arrays_is_malformed() {
        // The widest span "[1] and [2]" is not valid JSON.
        let text = "first [1] and [2]";
        assert!(matches!(
            extract_array(text),
            Err(ExtractError::Malformed { .. })
        ));
        assert!(array_or_empty(text).is_empty());
    }

    #[test]
    fn object_fallback_wraps_raw_text() {
        let value = object_or_raw("plain words");
        assert_eq!(value, json!({ "raw": "plain words" }));
    }

    #[test]
    fn string_field_coerces() {
        let map = extract_object(r#"{"a": "x", "b": 3, "c": null}"#).unwrap();
        assert_eq!(string_field(&map, "a"), "x");
        assert_eq!(string_field(&map, "b"), "");
        assert_eq!(string_field(&map, "c"), "");
        assert_eq!(string_field(&map, "missing"), "");
    }
}
