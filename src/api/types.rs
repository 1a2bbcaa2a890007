//! Request and response types of the assistant API
//!
//! Wire structs mirror the JSON the server sends and stay private to the
//! client; the public types are what the rest of the crate works with.

use crate::error::{HorizonError, Result};
use crate::language::Language;
use crate::messages::{types::summary_segment, Message, Sender};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Finalized microphone capture ready to upload
#[derive(Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub file_name: &'static str,
    pub mime: &'static str,
}

impl AudioClip {
    pub fn wav(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            file_name: "input.wav",
            mime: "audio/wav",
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for AudioClip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioClip")
            .field("file_name", &self.file_name)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// What the user said or typed for one turn
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChatPayload {
    Text(String),
    Audio(AudioClip),
}

impl ChatPayload {
    /// Text to show for the user's side of the turn when the server does not
    /// echo a transcription back
    pub fn fallback_user_text(&self) -> &str {
        match self {
            ChatPayload::Text(text) => text,
            ChatPayload::Audio(_) => "Voice Input",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatRequest {
    pub payload: ChatPayload,
    pub language: Language,
}

/// Validated reply of `POST /api/chat`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatReply {
    pub response_text: String,
    /// Transcription of the user's audio, or the echoed text
    pub user_text: Option<String>,
    pub audio_url: Option<String>,
    /// Language the server detected, if it is one we support
    pub detected_language: Option<Language>,
}

impl ChatReply {
    /// Part of the reply to synthesize; empty when nothing is speakable
    pub fn summary(&self) -> &str {
        summary_segment(&self.response_text)
    }
}

#[derive(Deserialize)]
pub(crate) struct ChatReplyWire {
    response_text: Option<String>,
    #[serde(default)]
    user_text: Option<String>,
    #[serde(default)]
    audio_url: Option<String>,
    #[serde(default)]
    detected_language: Option<String>,
}

impl TryFrom<ChatReplyWire> for ChatReply {
    type Error = HorizonError;

    fn try_from(wire: ChatReplyWire) -> Result<Self> {
        let response_text = wire.response_text.ok_or_else(|| {
            HorizonError::InvalidPayload("chat reply without response_text".to_string())
        })?;
        let detected_language = wire.detected_language.and_then(|tag| match tag.parse() {
            Ok(lang) => Some(lang),
            Err(e) => {
                warn!("Ignoring detected language: {}", e);
                None
            }
        });
        Ok(ChatReply {
            response_text,
            user_text: wire.user_text.filter(|t| !t.trim().is_empty()),
            audio_url: wire.audio_url.filter(|u| !u.trim().is_empty()),
            detected_language,
        })
    }
}

#[derive(Serialize)]
pub(crate) struct SynthesizeBody<'a> {
    pub text: &'a str,
    pub language: &'a str,
}

#[derive(Deserialize)]
pub(crate) struct SynthesizeWire {
    #[serde(default)]
    pub audio_url: Option<String>,
}

impl SynthesizeWire {
    pub fn into_audio_url(self) -> Option<String> {
        self.audio_url.filter(|u| !u.trim().is_empty())
    }
}

#[derive(Deserialize)]
pub(crate) struct HistoryEntryWire {
    id: serde_json::Value,
    text: String,
    sender: Sender,
    timestamp: String,
}

impl TryFrom<HistoryEntryWire> for Message {
    type Error = HorizonError;

    fn try_from(wire: HistoryEntryWire) -> Result<Self> {
        let id = match wire.id {
            serde_json::Value::String(s) => s,
            serde_json::Value::Number(n) => n.to_string(),
            other => {
                return Err(HorizonError::InvalidPayload(format!(
                    "history id must be a string or number, got {}",
                    other
                )))
            }
        };
        Ok(Message {
            id,
            text: wire.text,
            sender: wire.sender,
            timestamp: parse_timestamp(&wire.timestamp)?,
        })
    }
}

/// Parse RFC 3339 timestamps, or naive ISO timestamps taken as UTC
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| HorizonError::InvalidPayload(format!("bad timestamp `{}`: {}", raw, e)))
}

#[derive(Serialize)]
pub(crate) struct CredentialsBody<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LoginReply {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub username: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Profile {
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Profile fields to change. `None` leaves the stored value alone.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Reply of `PUT /api/auth/profile`
#[derive(Deserialize)]
pub(crate) struct ProfileUpdateWire {
    pub user: Profile,
}

#[derive(Serialize)]
pub(crate) struct ChangePasswordBody<'a> {
    pub current_password: &'a str,
    pub new_password: &'a str,
}

#[derive(Serialize)]
pub(crate) struct ResetPasswordBody<'a> {
    pub username: &'a str,
    pub new_password: &'a str,
}

/// Error body the server attaches to refused requests
#[derive(Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn message(self) -> Option<String> {
        match self.detail {
            Some(serde_json::Value::String(s)) => Some(s),
            Some(other) => Some(other.to_string()),
            None => self.error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(json: &str) -> ChatReplyWire {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_chat_reply_validation() {
        let reply = ChatReply::try_from(wire(
            r#"{"response_text":"Tomato ₹20/kg ||| more","user_text":"tomato price",
                "audio_url":null,"detected_language":"hi"}"#,
        ))
        .unwrap();
        assert_eq!(reply.summary(), "Tomato ₹20/kg");
        assert_eq!(reply.user_text.as_deref(), Some("tomato price"));
        assert_eq!(reply.detected_language, Some(Language::Hindi));
        assert_eq!(reply.audio_url, None);
    }

    #[test]
    fn test_chat_reply_requires_text() {
        let err = ChatReply::try_from(wire(r#"{"user_text":"hi"}"#)).unwrap_err();
        assert!(matches!(err, HorizonError::InvalidPayload(_)));
    }

    #[test]
    fn test_unknown_detected_language_dropped() {
        let reply =
            ChatReply::try_from(wire(r#"{"response_text":"ok","detected_language":"fr"}"#)).unwrap();
        assert_eq!(reply.detected_language, None);
    }

    #[test]
    fn test_history_entry_numeric_id_and_naive_timestamp() {
        let entry: HistoryEntryWire = serde_json::from_str(
            r#"{"id":42,"text":"hello","sender":"user","timestamp":"2024-03-01T10:15:30.123456"}"#,
        )
        .unwrap();
        let msg = Message::try_from(entry).unwrap();
        assert_eq!(msg.id, "42");
        assert_eq!(msg.sender, Sender::User);
        assert_eq!(msg.timestamp.to_rfc3339(), "2024-03-01T10:15:30.123456+00:00");
    }

    #[test]
    fn test_history_entry_rejects_bad_sender() {
        let entry = serde_json::from_str::<HistoryEntryWire>(
            r#"{"id":"1","text":"x","sender":"bot","timestamp":"2024-03-01T10:15:30"}"#,
        );
        assert!(entry.is_err());
    }

    #[test]
    fn test_empty_audio_url_is_none() {
        let wire: SynthesizeWire = serde_json::from_str(r#"{"audio_url":""}"#).unwrap();
        assert_eq!(wire.into_audio_url(), None);
    }

    #[test]
    fn test_profile_update_omits_unset_fields() {
        let update = ProfileUpdate {
            display_name: Some("Meena".into()),
            avatar_url: None,
        };
        assert_eq!(
            serde_json::to_string(&update).unwrap(),
            r#"{"display_name":"Meena"}"#
        );
    }

    #[test]
    fn test_error_body_message() {
        let body: ErrorBody = serde_json::from_str(r#"{"detail":"Invalid credentials"}"#).unwrap();
        assert_eq!(body.message().as_deref(), Some("Invalid credentials"));
    }
}
