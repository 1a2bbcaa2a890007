use super::types::{
    ChangePasswordBody, ChatReply, ChatReplyWire, ChatRequest, CredentialsBody, ErrorBody,
    HistoryEntryWire, LoginReply, Profile, ProfileUpdate, ProfileUpdateWire, ResetPasswordBody,
    SynthesizeBody, SynthesizeWire,
};
use super::{AssistantApi, ChatPayload};
use crate::config::HorizonConfig;
use crate::error::{HorizonError, Result};
use crate::language::Language;
use crate::messages::Message;
use base64::Engine;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::debug;

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// reqwest-backed [`AssistantApi`]
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

/// How a non-success status is reported
#[derive(Clone, Copy)]
enum Auth {
    /// Bearer call: 401 means the session is gone
    Bearer,
    /// Login, register and password forms: any refusal, 401 included,
    /// carries a message for the user
    Credentials,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS).min(timeout))
            .build()
            .map_err(|e| HorizonError::ConfigError(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &HorizonConfig) -> Result<Self> {
        Self::new(config.api_base_url.clone(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder, auth: Auth) -> Result<Response> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                HorizonError::Transport("request timed out".to_string())
            } else {
                HorizonError::from(e)
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED && matches!(auth, Auth::Bearer) {
            return Err(HorizonError::Unauthorized);
        }

        let detail = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(ErrorBody::message);
        match auth {
            Auth::Credentials => Err(HorizonError::Rejected(
                detail.unwrap_or_else(|| format!("Authentication failed ({})", status)),
            )),
            Auth::Bearer => Err(HorizonError::Transport(match detail {
                Some(detail) => format!("server returned {}: {}", status, detail),
                None => format!("server returned {}", status),
            })),
        }
    }
}

#[async_trait::async_trait]
impl AssistantApi for ApiClient {
    async fn chat(&self, token: &str, request: ChatRequest) -> Result<ChatReply> {
        let form = match request.payload {
            ChatPayload::Text(text) => Form::new().text("message", text),
            ChatPayload::Audio(clip) => {
                let part = Part::bytes(clip.bytes)
                    .file_name(clip.file_name)
                    .mime_str(clip.mime)?;
                Form::new().part("audio", part)
            }
        }
        .text("language", request.language.code())
        // Speech is requested separately for the summary only
        .text("voice_enabled", "false");

        debug!("POST /api/chat (language {})", request.language);
        let response = self
            .send(
                self.http
                    .post(self.url("/api/chat"))
                    .bearer_auth(token)
                    .multipart(form),
                Auth::Bearer,
            )
            .await?;
        let wire: ChatReplyWire = response.json().await?;
        ChatReply::try_from(wire)
    }

    async fn synthesize(
        &self,
        token: &str,
        text: &str,
        language: Language,
    ) -> Result<Option<String>> {
        let body = SynthesizeBody {
            text,
            language: language.code(),
        };
        let response = self
            .send(
                self.http
                    .post(self.url("/api/chat/tts"))
                    .bearer_auth(token)
                    .json(&body),
                Auth::Bearer,
            )
            .await?;
        let wire: SynthesizeWire = response.json().await?;
        Ok(wire.into_audio_url())
    }

    async fn fetch_audio(&self, url: &str) -> Result<Vec<u8>> {
        if url.starts_with("data:") {
            return decode_data_url(url);
        }
        let absolute = if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            self.url(&format!("/{}", url.trim_start_matches('/')))
        };
        let response = self.send(self.http.get(absolute), Auth::Bearer).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn history(&self, token: &str) -> Result<Vec<Message>> {
        let response = self
            .send(
                self.http.get(self.url("/api/chat/history")).bearer_auth(token),
                Auth::Bearer,
            )
            .await?;
        let entries: Vec<HistoryEntryWire> = response.json().await?;
        entries.into_iter().map(Message::try_from).collect()
    }

    async fn delete_message(&self, token: &str, id: &str) -> Result<()> {
        self.send(
            self.http
                .delete(self.url(&format!("/api/chat/history/{}", id)))
                .bearer_auth(token),
            Auth::Bearer,
        )
        .await?;
        Ok(())
    }

    async fn clear_history(&self, token: &str) -> Result<()> {
        self.send(
            self.http
                .delete(self.url("/api/chat/history"))
                .bearer_auth(token),
            Auth::Bearer,
        )
        .await?;
        Ok(())
    }

    async fn login(&self, username: &str, password: &str) -> Result<LoginReply> {
        let response = self
            .send(
                self.http
                    .post(self.url("/api/auth/login"))
                    .json(&CredentialsBody { username, password }),
                Auth::Credentials,
            )
            .await?;
        let reply: LoginReply = response.json().await?;
        if reply.access_token.trim().is_empty() {
            return Err(HorizonError::InvalidPayload(
                "login reply with empty access_token".to_string(),
            ));
        }
        Ok(reply)
    }

    async fn register(&self, username: &str, password: &str) -> Result<()> {
        self.send(
            self.http
                .post(self.url("/api/auth/register"))
                .json(&CredentialsBody { username, password }),
            Auth::Credentials,
        )
        .await?;
        Ok(())
    }

    async fn profile(&self, token: &str) -> Result<Profile> {
        let response = self
            .send(
                self.http.get(self.url("/api/auth/profile")).bearer_auth(token),
                Auth::Bearer,
            )
            .await?;
        Ok(response.json().await?)
    }

    async fn update_profile(&self, token: &str, update: &ProfileUpdate) -> Result<Profile> {
        let response = self
            .send(
                self.http
                    .put(self.url("/api/auth/profile"))
                    .bearer_auth(token)
                    .json(update),
                Auth::Bearer,
            )
            .await?;
        let wire: ProfileUpdateWire = response.json().await?;
        Ok(wire.user)
    }

    async fn change_password(&self, token: &str, current: &str, new: &str) -> Result<()> {
        // The server answers a wrong current password with 401
        self.send(
            self.http
                .post(self.url("/api/auth/change-password"))
                .bearer_auth(token)
                .json(&ChangePasswordBody {
                    current_password: current,
                    new_password: new,
                }),
            Auth::Credentials,
        )
        .await?;
        Ok(())
    }

    async fn reset_password(&self, username: &str, new_password: &str) -> Result<()> {
        self.send(
            self.http
                .post(self.url("/api/auth/reset-password"))
                .json(&ResetPasswordBody {
                    username,
                    new_password,
                }),
            Auth::Credentials,
        )
        .await?;
        Ok(())
    }

    async fn delete_account(&self, token: &str) -> Result<()> {
        self.send(
            self.http
                .delete(self.url("/api/auth/profile"))
                .bearer_auth(token),
            Auth::Bearer,
        )
        .await?;
        Ok(())
    }
}

/// Decode a `data:` URL such as `data:audio/mp3;base64,SUQz...`
pub fn decode_data_url(url: &str) -> Result<Vec<u8>> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| HorizonError::InvalidPayload("not a data URL".to_string()))?;
    let (meta, data) = rest
        .split_once(',')
        .ok_or_else(|| HorizonError::InvalidPayload("data URL without payload".to_string()))?;
    if meta.ends_with(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(data.trim())
            .map_err(|e| HorizonError::InvalidPayload(format!("bad base64 audio: {}", e)))
    } else {
        Ok(data.as_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_base64_data_url() {
        let bytes = decode_data_url("data:audio/mp3;base64,SUQzBA==").unwrap();
        assert_eq!(bytes, b"ID3\x04");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_data_url("data:audio/mp3;base64,@@@").is_err());
        assert!(decode_data_url("data:audio/mp3;base64").is_err());
        assert!(decode_data_url("https://x/a.mp3").is_err());
    }

    #[test]
    fn test_base_url_trimmed() {
        let client = ApiClient::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("/api/chat"), "http://localhost:8000/api/chat");
    }
}
