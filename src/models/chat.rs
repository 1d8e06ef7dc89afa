use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::Sender;

/// A rendered chat message as the view layer displays it.
/// Suggestions become clickable quick-replies; clicking one re-submits
/// its text as a new message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub sender: Sender,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

/// One stored turn at `users/{uid}/chatHistory/{autoId}`: the user's
/// prompt and the assistant's response, ordered ascending by timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurn {
    pub prompt: String,
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_omits_absent_suggestions() {
        let msg = ChatMessage {
            id: "m1".into(),
            sender: Sender::Assistant,
            content: "Hello".into(),
            suggestions: None,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert!(json.get("suggestions").is_none());
    }

    #[test]
    fn turn_round_trips() {
        let turn = ChatTurn {
            prompt: "How can I sleep better?".into(),
            response: "Try a consistent bedtime.".into(),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&turn).unwrap();
        let back: ChatTurn = serde_json::from_value(json).unwrap();
        assert_eq!(back, turn);
    }
}
