//! Shared application state for the Horizon client
//!
//! This module provides a thread-safe shared state that can be accessed by:
//! - **Orchestrator**: applies commands and task results to the controller
//! - **UI**: reads state for rendering, sends commands
//!
//! The design separates:
//! - **State**: the controller plus account data, queried synchronously
//! - **Commands**: requests to change state (sent to the orchestrator)
//! - **Events**: notifications for the UI, including device work it must do

use crate::api::{AudioClip, ProfileUpdate};
use crate::controller::{Generation, VoiceController, VoiceStatus};
use crate::error::HorizonError;
use crate::language::Language;
use crate::messages::Message;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Who is signed in, as far as the UI needs to know
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Account {
    #[default]
    SignedOut,
    /// Login or registration request in flight
    Authenticating,
    SignedIn {
        username: String,
        display_name: Option<String>,
        avatar_url: Option<String>,
    },
}

impl Account {
    pub fn is_signed_in(&self) -> bool {
        matches!(self, Account::SignedIn { .. })
    }

    pub fn is_authenticating(&self) -> bool {
        matches!(self, Account::Authenticating)
    }

    pub fn display_name(&self) -> Option<&str> {
        match self {
            Account::SignedIn {
                username,
                display_name,
                ..
            } => Some(
                display_name
                    .as_deref()
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or(username),
            ),
            _ => None,
        }
    }
}

/// Complete application state
#[derive(Clone, Debug)]
pub struct AppState {
    pub controller: VoiceController,
    pub account: Account,
    /// Message for the login form (bad credentials, registration done)
    pub auth_notice: Option<String>,
    /// Outcome of the last account settings request
    pub settings_notice: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Language::default(), Duration::from_secs(5))
    }
}

impl AppState {
    pub fn new(language: Language, banner_duration: Duration) -> Self {
        Self {
            controller: VoiceController::new(language, banner_duration),
            account: Account::SignedOut,
            auth_notice: None,
            settings_notice: None,
        }
    }

    /// Copy of everything the UI renders, taken at `now`
    pub fn snapshot(&self, now: Instant) -> AppStateSnapshot {
        AppStateSnapshot {
            status: self.controller.status(),
            generation: self.controller.generation(),
            language: self.controller.language(),
            messages: self.controller.messages().to_vec(),
            banner_visible: self.controller.banner_visible(now),
            notice: self.controller.notice().map(str::to_string),
            account: self.account.clone(),
            auth_notice: self.auth_notice.clone(),
            settings_notice: self.settings_notice.clone(),
        }
    }

    pub fn status(&self) -> VoiceStatus {
        self.controller.status()
    }

    pub fn is_idle(&self) -> bool {
        self.controller.status().is_idle()
    }
}

/// Point-in-time copy of the state, independent of later changes
#[derive(Clone, Debug)]
pub struct AppStateSnapshot {
    pub status: VoiceStatus,
    pub generation: Generation,
    pub language: Language,
    pub messages: Vec<Message>,
    pub banner_visible: bool,
    pub notice: Option<String>,
    pub account: Account,
    pub auth_notice: Option<String>,
    pub settings_notice: Option<String>,
}

/// Thread-safe wrapper around [`AppState`]
#[derive(Clone)]
pub struct SharedAppState {
    inner: Arc<RwLock<AppState>>,
}

impl Default for SharedAppState {
    fn default() -> Self {
        Self::from_state(AppState::default())
    }
}

impl SharedAppState {
    pub fn new(language: Language, banner_duration: Duration) -> Self {
        Self::from_state(AppState::new(language, banner_duration))
    }

    pub fn from_state(state: AppState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(state)),
        }
    }

    pub fn read(&self) -> parking_lot::RwLockReadGuard<'_, AppState> {
        self.inner.read()
    }

    pub fn write(&self) -> parking_lot::RwLockWriteGuard<'_, AppState> {
        self.inner.write()
    }

    pub fn snapshot(&self) -> AppStateSnapshot {
        self.inner.read().snapshot(Instant::now())
    }

    // === Convenience read methods ===

    pub fn status(&self) -> VoiceStatus {
        self.inner.read().controller.status()
    }

    pub fn is_idle(&self) -> bool {
        self.inner.read().is_idle()
    }

    pub fn generation(&self) -> Generation {
        self.inner.read().controller.generation()
    }

    pub fn language(&self) -> Language {
        self.inner.read().controller.language()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.inner.read().controller.messages().to_vec()
    }

    pub fn message_count(&self) -> usize {
        self.inner.read().controller.history().len()
    }

    pub fn banner_visible(&self) -> bool {
        self.inner.read().controller.banner_visible(Instant::now())
    }

    pub fn account(&self) -> Account {
        self.inner.read().account.clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.inner.read().account.is_signed_in()
    }
}

/// Commands sent to the orchestrator
#[derive(Clone, Debug)]
pub enum AppCommand {
    Login { username: String, password: String },
    Register { username: String, password: String },
    Logout,
    /// Refetch history and profile from the server
    LoadHistory,
    ResetPassword { username: String, new_password: String },
    UpdateProfile(ProfileUpdate),
    ChangePassword {
        current_password: String,
        new_password: String,
    },
    /// Delete the account on the server, then sign out
    DeleteAccount,

    /// Orb click: interrupt, stop or start depending on status
    MicTap,
    StartListening,
    StopListening,
    /// Stop capturing and throw the audio away
    CancelListening,
    Interrupt,
    SubmitText(String),
    /// Speak the message with this id
    ReadAloud(String),
    DeleteMessage(String),
    ClearHistory,
    SetLanguage(Language),
    DismissNotice,

    // Reports from the devices owned by the UI
    MicrophoneOpened,
    MicrophoneDenied(HorizonError),
    CaptureFinished {
        generation: Generation,
        clip: Option<AudioClip>,
    },
    PlaybackStarted(Generation),
    PlaybackEnded(Generation),
    PlaybackFailed { generation: Generation, reason: String },

    /// Periodic wake-up for timers (banner expiry)
    Tick,
    Shutdown,
}

/// Events emitted by the orchestrator for the UI
#[derive(Clone, Debug)]
pub enum AppEvent {
    /// State changed, re-render needed
    StateChanged,
    /// Open the microphone and report back
    OpenMicrophone,
    /// Stop capturing; report the clip back only with `submit`
    CloseMicrophone { generation: Generation, submit: bool },
    /// Play encoded audio, replacing anything playing
    Play { generation: Generation, audio: Vec<u8> },
    StopPlayback,
    /// Error occurred
    Error(String),
    /// Shutdown complete
    Shutdown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let state = AppState::default();
        assert!(state.is_idle());
        assert_eq!(state.account, Account::SignedOut);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let shared = SharedAppState::default();
        let before = shared.snapshot();

        shared.write().controller.submit_text("hello");

        assert!(before.status.is_idle());
        assert_eq!(shared.snapshot().status, VoiceStatus::Thinking);
        assert_eq!(shared.generation(), 1);
    }

    #[test]
    fn test_account_display_name() {
        let account = Account::SignedIn {
            username: "asha".into(),
            display_name: None,
            avatar_url: None,
        };
        assert_eq!(account.display_name(), Some("asha"));
        assert!(account.is_signed_in());
        assert_eq!(Account::Authenticating.display_name(), None);
    }
}
