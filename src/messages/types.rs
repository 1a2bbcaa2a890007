use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a locally originated message with a fresh id
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            sender,
            timestamp: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn ai(text: impl Into<String>) -> Self {
        Self::new(Sender::Ai, text)
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }

    /// The part of an assistant reply meant to be spoken.
    ///
    /// Replies may carry a short summary and extended detail separated by
    /// `|||`; only the summary is read aloud.
    pub fn spoken_summary(&self) -> &str {
        summary_segment(&self.text)
    }

    /// Extended detail after the separator, if any
    pub fn detail(&self) -> Option<&str> {
        self.text
            .split_once(SUMMARY_SEPARATOR)
            .map(|(_, rest)| rest.trim())
            .filter(|rest| !rest.is_empty())
    }
}

/// Separator between the summary and the detail of an assistant reply
pub const SUMMARY_SEPARATOR: &str = "|||";

/// Text before the first separator, trimmed
pub fn summary_segment(text: &str) -> &str {
    text.split(SUMMARY_SEPARATOR).next().unwrap_or_default().trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_messages_have_distinct_ids() {
        let a = Message::user("hello");
        let b = Message::ai("hi");
        assert_ne!(a.id, b.id);
        assert!(a.is_user());
        assert!(!b.is_user());
    }

    #[test]
    fn test_summary_and_detail() {
        let msg = Message::ai("Tomato price is ₹20/kg ||| details about mandis");
        assert_eq!(msg.spoken_summary(), "Tomato price is ₹20/kg");
        assert_eq!(msg.detail(), Some("details about mandis"));
    }

    #[test]
    fn test_summary_without_separator() {
        let msg = Message::ai("  plain answer  ");
        assert_eq!(msg.spoken_summary(), "plain answer");
        assert_eq!(msg.detail(), None);
    }

    #[test]
    fn test_summary_empty_before_separator() {
        assert_eq!(summary_segment("   ||| only detail"), "");
    }

    #[test]
    fn test_sender_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Sender::Ai).unwrap(), "\"ai\"");
        assert_eq!(serde_json::to_string(&Sender::User).unwrap(), "\"user\"");
    }
}
