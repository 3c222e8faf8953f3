//! Decoding of inbound frames and encoding of outbound frames.

use serde_json::{Map, Value};

use crate::models::{ws_types, Envelope, HistoryMessage, PostData};

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing or non-string \"type\" field")]
    MissingType,
    #[error("history frame without \"data\" array")]
    MissingData,
}

/// Parse a text frame into an [`Envelope`].
///
/// Unknown tags are not an error: they decode to [`Envelope::Other`] and it is
/// up to the caller to drop them. A `post_data` frame without `value` carries
/// `null`; producers may put their payload in other fields.
pub fn decode(raw: &str) -> Result<Envelope, CodecError> {
    let mut obj: Map<String, Value> = serde_json::from_str(raw)?;
    let kind = match obj.get("type") {
        Some(Value::String(kind)) => kind.clone(),
        _ => return Err(CodecError::MissingType),
    };

    match kind.as_str() {
        ws_types::POST_DATA => {
            let value = obj.remove("value").unwrap_or(Value::Null);
            Ok(Envelope::PostData(value))
        }
        ws_types::HISTORY => match obj.remove("data") {
            Some(Value::Array(data)) => Ok(Envelope::History(data)),
            _ => Err(CodecError::MissingData),
        },
        _ => Ok(Envelope::Other(kind)),
    }
}

/// Re-frame a received publisher payload for subscribers. The buffer is handed
/// back untouched, extra fields included, so a refcounted transport buffer
/// stays shared.
pub fn encode_broadcast<T>(raw: T) -> T {
    raw
}

/// `{"type":"history","data":[...]}`, oldest entry first.
pub fn encode_history(snapshot: &[Value]) -> Result<String, CodecError> {
    let msg = HistoryMessage {
        r#type: ws_types::HISTORY,
        data: snapshot,
    };
    Ok(serde_json::to_string(&msg)?)
}

/// Build the frame a publisher sends for `value`.
pub fn encode_post_data(value: &Value) -> Result<String, CodecError> {
    Ok(serde_json::to_string(&PostData {
        r#type: ws_types::POST_DATA,
        value,
    })?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_post_data() {
        let env = decode(r#"{"type":"post_data","value":"A"}"#).unwrap();
        assert_eq!(env, Envelope::PostData(json!("A")));
    }

    #[test]
    fn decode_post_data_null_value_is_valid() {
        let env = decode(r#"{"type":"post_data","value":null}"#).unwrap();
        assert_eq!(env, Envelope::PostData(Value::Null));
    }

    #[test]
    fn decode_post_data_without_value_carries_null() {
        let env = decode(r#"{"values":[1,2,3],"type":"post_data"}"#).unwrap();
        assert_eq!(env, Envelope::PostData(Value::Null));
    }

    #[test]
    fn decode_unknown_type_keeps_tag() {
        let env = decode(r#"{"type":"chat","value":"hi"}"#).unwrap();
        assert_eq!(env, Envelope::Other("chat".to_string()));
    }

    #[test]
    fn decode_rejects_non_json_and_missing_type() {
        assert!(matches!(decode("not json"), Err(CodecError::Json(_))));
        assert!(matches!(decode("[1,2]"), Err(CodecError::Json(_))));
        assert!(matches!(
            decode(r#"{"value":1}"#),
            Err(CodecError::MissingType)
        ));
        assert!(matches!(
            decode(r#"{"type":7,"value":1}"#),
            Err(CodecError::MissingType)
        ));
    }

    #[test]
    fn decode_history_frame() {
        let env = decode(r#"{"type":"history","data":[1,2]}"#).unwrap();
        assert_eq!(env, Envelope::History(vec![json!(1), json!(2)]));
        assert!(matches!(
            decode(r#"{"type":"history","data":3}"#),
            Err(CodecError::MissingData)
        ));
    }

    #[test]
    fn broadcast_is_byte_identical() {
        let raw = r#"{ "type" : "post_data", "value": [1, 2], "extra": true }"#;
        assert_eq!(encode_broadcast(raw), raw);
        let owned = raw.to_string();
        assert_eq!(encode_broadcast(owned.clone()), owned);
    }

    #[test]
    fn history_encoding_is_ordered() {
        let frame = encode_history(&[json!("A"), json!("B")]).unwrap();
        assert_eq!(frame, r#"{"type":"history","data":["A","B"]}"#);
    }

    #[test]
    fn post_data_encoding_decodes_back() {
        let raw = encode_post_data(&json!({"values": [3, 4]})).unwrap();
        assert_eq!(raw, r#"{"type":"post_data","value":{"values":[3,4]}}"#);
        assert_eq!(
            decode(&raw).unwrap(),
            Envelope::PostData(json!({"values": [3, 4]}))
        );
    }
}
