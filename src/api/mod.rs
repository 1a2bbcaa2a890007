//! Client side of the assistant API
//!
//! [`AssistantApi`] is the seam between the orchestrator and the network.
//! [`ApiClient`] talks to the real server; tests plug in their own
//! implementation.

pub mod client;
pub mod types;

pub use client::{decode_data_url, ApiClient};
pub use types::{
    AudioClip, ChatPayload, ChatReply, ChatRequest, LoginReply, Profile, ProfileUpdate,
};

use crate::error::Result;
use crate::language::Language;
use crate::messages::Message;

/// Operations the client needs from the assistant server.
///
/// Authenticated calls take the bearer token explicitly, so one client can
/// outlive any number of logins.
#[async_trait::async_trait]
pub trait AssistantApi: Send + Sync {
    /// Send one user turn and get the assistant's reply.
    ///
    /// # Errors
    ///
    /// [`HorizonError::Unauthorized`](crate::error::HorizonError::Unauthorized)
    /// when the token is rejected, `Transport` for network failures and
    /// unexpected statuses, `InvalidPayload` when the reply is malformed.
    async fn chat(&self, token: &str, request: ChatRequest) -> Result<ChatReply>;

    /// Synthesize speech for `text`. `None` when the server produced no audio.
    async fn synthesize(&self, token: &str, text: &str, language: Language)
        -> Result<Option<String>>;

    /// Resolve an audio URL returned by the server into encoded audio bytes
    async fn fetch_audio(&self, url: &str) -> Result<Vec<u8>>;

    async fn history(&self, token: &str) -> Result<Vec<Message>>;

    async fn delete_message(&self, token: &str, id: &str) -> Result<()>;

    async fn clear_history(&self, token: &str) -> Result<()>;

    async fn login(&self, username: &str, password: &str) -> Result<LoginReply>;

    async fn register(&self, username: &str, password: &str) -> Result<()>;

    async fn profile(&self, token: &str) -> Result<Profile>;

    /// Change display name or avatar. Returns the profile as stored.
    async fn update_profile(&self, token: &str, update: &ProfileUpdate) -> Result<Profile>;

    /// A wrong `current` password is `Rejected`, not `Unauthorized`.
    async fn change_password(&self, token: &str, current: &str, new: &str) -> Result<()>;

    /// Set a new password for `username` without signing in
    async fn reset_password(&self, username: &str, new_password: &str) -> Result<()>;

    /// Delete the account together with its chat history
    async fn delete_account(&self, token: &str) -> Result<()>;
}
