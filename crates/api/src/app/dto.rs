use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// -------------------------
// Request DTOs
// -------------------------

/// Message relayed by the messaging channel.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingMessage {
    #[serde(default)]
    pub key: Option<String>,
    /// Sender phone; some relays send it as a JSON number.
    #[serde(default)]
    pub from: Option<JsonValue>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub chat_id: Option<JsonValue>,
    /// Data-API base URL for this request.
    #[serde(default)]
    pub data_api: Option<String>,
}

impl IncomingMessage {
    pub fn sender(&self) -> Option<String> {
        match self.from.as_ref()? {
            JsonValue::String(s) => Some(s.clone()),
            JsonValue::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct ReplyResponse {
    pub reply: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sender_accepts_strings_and_numbers() {
        let msg: IncomingMessage =
            serde_json::from_str(r#"{"key":"k","from":5491122334455,"chatId":12}"#).unwrap();
        assert_eq!(msg.sender().as_deref(), Some("5491122334455"));
        assert_eq!(msg.text, None);

        let msg: IncomingMessage =
            serde_json::from_str(r#"{"from":"+54 9 11","text":"hola","dataApi":"http://x"}"#).unwrap();
        assert_eq!(msg.sender().as_deref(), Some("+54 9 11"));
        assert_eq!(msg.data_api.as_deref(), Some("http://x"));

        let msg: IncomingMessage = serde_json::from_str(r#"{"from":null}"#).unwrap();
        assert_eq!(msg.sender(), None);
    }
}
