//! # Response Parsing
//!
//! Decodes the body of a `get_actions` response into an [`ActionsPage`]. Action
//! payloads stay opaque; only `global_sequence` and `block_num` are interpreted.

use crate::error::StreamError;
use serde::Deserialize;
use serde_json::{value::RawValue, Number, Value};

/// 2^64, the first `f64` that no longer fits into a `u64`.
const U64_LIMIT_F64: f64 = 18_446_744_073_709_551_616.0;

/// The body of `GET /v2/history/get_actions`.
#[derive(Debug, Deserialize)]
pub struct GetActionsResponse {
    #[serde(default)]
    pub query_time_ms: f64,
    #[serde(default)]
    pub cached: bool,
    #[serde(default)]
    pub last_indexed_block: u64,
    #[serde(default)]
    pub total: Total,
    #[serde(default)]
    pub actions: Vec<RawAction>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Total {
    #[serde(default)]
    pub value: u64,
    #[serde(default)]
    pub relation: String,
}

/// One entry of `actions` as it appears on the wire.
#[derive(Debug, Deserialize)]
pub struct RawAction {
    pub block_num: u32,
    pub global_sequence: Value,
    pub act: Box<RawValue>,
}

/// A normalised action-sequence identifier.
///
/// Hyperion nodes serialise `global_sequence` either as a decimal string or as a
/// JSON number depending on version and size of the value. Both shapes are
/// accepted; a number with a fractional part is truncated toward zero. Any other
/// JSON type is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GlobalSequence(pub u64);

impl TryFrom<&Value> for GlobalSequence {
    type Error = StreamError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(text) => text.parse::<u64>().map(GlobalSequence).map_err(|e| {
                StreamError::InvalidGlobalSequence(format!(
                    "parse global sequence {text:?}: {e}"
                ))
            }),
            Value::Number(number) => from_number(number).map(GlobalSequence),
            other => Err(StreamError::InvalidGlobalSequence(format!(
                "unexpected type for global_sequence: {}",
                json_type_name(other)
            ))),
        }
    }
}

fn from_number(number: &Number) -> Result<u64, StreamError> {
    if let Some(exact) = number.as_u64() {
        return Ok(exact);
    }
    match number.as_f64() {
        Some(float) if float.is_finite() && float >= 0.0 && float < U64_LIMIT_F64 => {
            Ok(float.trunc() as u64)
        }
        _ => Err(StreamError::InvalidGlobalSequence(format!(
            "global_sequence {number} is not an unsigned 64-bit value"
        ))),
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

/// A decoded action.
#[derive(Debug, Clone)]
pub struct Action {
    pub global_sequence: u64,
    pub block_num: u32,
    pub act: Box<RawValue>,
}

/// One page of actions, in the order the node returned them.
#[derive(Debug, Clone, Default)]
pub struct ActionsPage {
    pub actions: Vec<Action>,
    pub last_indexed_block: u64,
}

impl TryFrom<GetActionsResponse> for ActionsPage {
    type Error = StreamError;

    fn try_from(response: GetActionsResponse) -> Result<Self, Self::Error> {
        let actions = response
            .actions
            .into_iter()
            .map(|raw| {
                let GlobalSequence(global_sequence) =
                    GlobalSequence::try_from(&raw.global_sequence)?;
                Ok(Action {
                    global_sequence,
                    block_num: raw.block_num,
                    act: raw.act,
                })
            })
            .collect::<Result<Vec<_>, StreamError>>()?;

        Ok(Self {
            actions,
            last_indexed_block: response.last_indexed_block,
        })
    }
}

/// Decodes a raw response body.
pub fn parse_page(body: &[u8]) -> Result<ActionsPage, StreamError> {
    let response: GetActionsResponse = serde_json::from_slice(body)?;
    ActionsPage::try_from(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalize(value: Value) -> Result<u64, StreamError> {
        GlobalSequence::try_from(&value).map(|GlobalSequence(seq)| seq)
    }

    #[test]
    fn string_and_number_encodings_agree() {
        assert_eq!(normalize(json!("12345")).unwrap(), 12345);
        assert_eq!(normalize(json!(12345)).unwrap(), 12345);
        assert_eq!(normalize(json!(12345.0)).unwrap(), 12345);
    }

    #[test]
    fn fractional_numbers_truncate_toward_zero() {
        assert_eq!(normalize(json!(12345.9)).unwrap(), 12345);
    }

    #[test]
    fn large_string_values_keep_full_precision() {
        assert_eq!(
            normalize(json!("18446744073709551615")).unwrap(),
            u64::MAX
        );
    }

    #[test]
    fn other_json_types_are_rejected() {
        for value in [json!(null), json!(true), json!([1]), json!({"v": 1})] {
            let err = normalize(value).unwrap_err();
            assert!(matches!(err, StreamError::InvalidGlobalSequence(_)));
        }
    }

    #[test]
    fn negative_and_non_numeric_strings_are_rejected() {
        assert!(normalize(json!(-1)).is_err());
        assert!(normalize(json!(-0.5)).is_err());
        assert!(normalize(json!("12a")).is_err());
        assert!(normalize(json!("")).is_err());
    }

    #[test]
    fn parse_page_keeps_response_order() {
        let body = json!({
            "query_time_ms": 3.2,
            "cached": false,
            "last_indexed_block": 42,
            "total": { "value": 3, "relation": "eq" },
            "actions": [
                { "block_num": 10, "global_sequence": "105", "act": { "name": "b" } },
                { "block_num": 9, "global_sequence": 100, "act": { "name": "a" } },
                { "block_num": 11, "global_sequence": 107.0, "act": { "name": "c" } }
            ]
        });

        let page = parse_page(body.to_string().as_bytes()).unwrap();

        let sequences: Vec<u64> = page.actions.iter().map(|a| a.global_sequence).collect();
        assert_eq!(sequences, vec![105, 100, 107]);
        assert_eq!(page.actions[1].block_num, 9);
        assert_eq!(page.actions[0].act.get(), r#"{"name":"b"}"#);
        assert_eq!(page.last_indexed_block, 42);
    }

    #[test]
    fn parse_page_accepts_missing_metadata() {
        let page = parse_page(br#"{"actions": []}"#).unwrap();
        assert!(page.actions.is_empty());
    }

    #[test]
    fn parse_page_rejects_malformed_body() {
        let err = parse_page(b"<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, StreamError::Decode(_)));
    }

    #[test]
    fn parse_page_rejects_bad_sequence() {
        let body = br#"{"actions": [{"block_num": 1, "global_sequence": false, "act": {}}]}"#;
        let err = parse_page(body).unwrap_err();
        assert!(err.to_string().contains("unexpected type for global_sequence: bool"));
    }
}
