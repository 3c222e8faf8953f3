//! Wire-level message models exchanged with publishers and subscribers.

use serde::Serialize;
use serde_json::Value;

/// Envelope tags.
pub mod ws_types {
    pub const POST_DATA: &str = "post_data";
    pub const HISTORY: &str = "history";
}

/// Decoded envelope.
///
/// The relay only acts on [`Envelope::PostData`]. `History` is what subscribers
/// receive on join; any other tag is kept by name so it can be logged.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    PostData(Value),
    History(Vec<Value>),
    Other(String),
}

impl Envelope {
    /// Tag as it appears on the wire.
    pub fn kind(&self) -> &str {
        match self {
            Self::PostData(_) => ws_types::POST_DATA,
            Self::History(_) => ws_types::HISTORY,
            Self::Other(kind) => kind,
        }
    }
}

/// Inbound publisher frame, `{"type":"post_data","value":...}`.
#[derive(Debug, Clone, Serialize)]
pub struct PostData<'a> {
    pub r#type: &'a str,
    pub value: &'a Value,
}

/// Replay frame sent once to a newly joined subscriber.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryMessage<'a> {
    pub r#type: &'a str,
    pub data: &'a [Value],
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn history_message_shape() {
        let data = vec![json!("A"), json!({"x": 1})];
        let msg = HistoryMessage {
            r#type: ws_types::HISTORY,
            data: &data,
        };
        let v = serde_json::to_value(&msg).unwrap();
        assert_eq!(v, json!({"type": "history", "data": ["A", {"x": 1}]}));
    }

    #[test]
    fn envelope_kind_reports_wire_tag() {
        assert_eq!(Envelope::PostData(Value::Null).kind(), "post_data");
        assert_eq!(Envelope::History(vec![]).kind(), "history");
        assert_eq!(Envelope::Other("chat".to_string()).kind(), "chat");
    }
}
