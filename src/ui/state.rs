//! UI-local state and the actions components hand back to the app
//!
//! Everything conversational lives in the orchestrator. The UI only keeps
//! form drafts, which panels are open and which answers are expanded.

use crate::api::ProfileUpdate;
use crate::language::Language;
use crate::state::{Account, AppCommand};
use std::collections::HashSet;

pub const PASSWORD_MISMATCH: &str = "New passwords do not match!";

/// Which form the signed-out screen shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthMode {
    #[default]
    SignIn,
    ResetPassword,
}

/// Drafts and view toggles owned by the UI thread
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Text in the message input
    pub input_text: String,
    pub username: String,
    pub password: String,
    pub auth_mode: AuthMode,

    // Password drafts, shared by the reset form and the settings panel
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
    /// Validation message for the form on screen
    pub form_error: Option<String>,

    pub settings_open: bool,
    pub display_name: String,
    pub avatar_url: String,
    /// Second click of the two-step account deletion is armed
    pub confirm_delete: bool,

    pub light_theme: bool,
    applied_light_theme: Option<bool>,

    /// AI messages whose detail section is open
    pub expanded: HashSet<String>,
}

impl UiState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the trimmed draft, leaving the input empty. `None` if blank.
    pub fn take_input(&mut self) -> Option<String> {
        let text = self.input_text.trim().to_string();
        if text.is_empty() {
            return None;
        }
        self.input_text.clear();
        Some(text)
    }

    /// Take the login form contents; the password is cleared either way
    pub fn take_credentials(&mut self) -> Option<(String, String)> {
        let username = self.username.trim().to_string();
        let password = std::mem::take(&mut self.password);
        if username.is_empty() || password.is_empty() {
            return None;
        }
        Some((username, password))
    }

    /// Take the new password once it is non-empty and confirmed. Sets
    /// `form_error` otherwise.
    pub fn take_new_password(&mut self) -> Option<String> {
        if self.new_password.is_empty() {
            self.form_error = Some("Enter a new password".to_string());
            return None;
        }
        if self.new_password != self.confirm_password {
            self.form_error = Some(PASSWORD_MISMATCH.to_string());
            return None;
        }
        self.form_error = None;
        self.confirm_password.clear();
        Some(std::mem::take(&mut self.new_password))
    }

    pub fn set_auth_mode(&mut self, mode: AuthMode) {
        self.auth_mode = mode;
        self.form_error = None;
        self.clear_passwords();
    }

    /// Open the settings panel with the profile fields filled in
    pub fn open_settings(&mut self, account: &Account) {
        if let Account::SignedIn {
            display_name,
            avatar_url,
            ..
        } = account
        {
            self.display_name = display_name.clone().unwrap_or_default();
            self.avatar_url = avatar_url.clone().unwrap_or_default();
        }
        self.settings_open = true;
        self.confirm_delete = false;
        self.form_error = None;
    }

    pub fn close_settings(&mut self) {
        self.settings_open = false;
        self.confirm_delete = false;
        self.form_error = None;
        self.clear_passwords();
    }

    /// The profile fields as an update; blank fields are left unchanged
    pub fn profile_update(&self) -> ProfileUpdate {
        let field = |s: &str| Some(s.trim().to_string()).filter(|s| !s.is_empty());
        ProfileUpdate {
            display_name: field(&self.display_name),
            avatar_url: field(&self.avatar_url),
        }
    }

    /// True once per change of the theme preference, including the first
    /// frame
    pub fn take_theme_change(&mut self) -> bool {
        let changed = self.applied_light_theme != Some(self.light_theme);
        self.applied_light_theme = Some(self.light_theme);
        changed
    }

    fn clear_passwords(&mut self) {
        self.password.clear();
        self.current_password.clear();
        self.new_password.clear();
        self.confirm_password.clear();
    }

    pub fn toggle_detail(&mut self, id: &str) {
        if !self.expanded.remove(id) {
            self.expanded.insert(id.to_string());
        }
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    /// Forget everything tied to the signed-in user. The theme stays.
    pub fn reset(&mut self) {
        self.input_text.clear();
        self.close_settings();
        self.display_name.clear();
        self.avatar_url.clear();
        self.auth_mode = AuthMode::SignIn;
        self.expanded.clear();
    }
}

/// Something the user asked for during a frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    Login { username: String, password: String },
    Register { username: String, password: String },
    ResetPassword { username: String, new_password: String },
    Logout,
    UpdateProfile(ProfileUpdate),
    ChangePassword {
        current_password: String,
        new_password: String,
    },
    DeleteAccount,
    /// Orb click or Space
    MicTap,
    /// Right-click or Escape while listening
    CancelListening,
    SubmitText(String),
    ReadAloud(String),
    DeleteMessage(String),
    ClearHistory,
    SetLanguage(Language),
    DismissNotice,
}

impl From<UiAction> for AppCommand {
    fn from(action: UiAction) -> Self {
        match action {
            UiAction::Login { username, password } => AppCommand::Login { username, password },
            UiAction::Register { username, password } => {
                AppCommand::Register { username, password }
            }
            UiAction::ResetPassword {
                username,
                new_password,
            } => AppCommand::ResetPassword {
                username,
                new_password,
            },
            UiAction::Logout => AppCommand::Logout,
            UiAction::UpdateProfile(update) => AppCommand::UpdateProfile(update),
            UiAction::ChangePassword {
                current_password,
                new_password,
            } => AppCommand::ChangePassword {
                current_password,
                new_password,
            },
            UiAction::DeleteAccount => AppCommand::DeleteAccount,
            UiAction::MicTap => AppCommand::MicTap,
            UiAction::CancelListening => AppCommand::CancelListening,
            UiAction::SubmitText(text) => AppCommand::SubmitText(text),
            UiAction::ReadAloud(id) => AppCommand::ReadAloud(id),
            UiAction::DeleteMessage(id) => AppCommand::DeleteMessage(id),
            UiAction::ClearHistory => AppCommand::ClearHistory,
            UiAction::SetLanguage(language) => AppCommand::SetLanguage(language),
            UiAction::DismissNotice => AppCommand::DismissNotice,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_input_trims_and_clears() {
        let mut state = UiState::new();
        state.input_text = "  what is the price of tomato  ".into();
        assert_eq!(
            state.take_input().as_deref(),
            Some("what is the price of tomato")
        );
        assert!(state.input_text.is_empty());
    }

    #[test]
    fn test_blank_input_is_kept() {
        let mut state = UiState::new();
        state.input_text = "   ".into();
        assert_eq!(state.take_input(), None);
        assert_eq!(state.input_text, "   ");
    }

    #[test]
    fn test_credentials_need_both_fields() {
        let mut state = UiState::new();
        state.username = "asha".into();
        assert_eq!(state.take_credentials(), None);

        state.password = "secret".into();
        assert_eq!(
            state.take_credentials(),
            Some(("asha".to_string(), "secret".to_string()))
        );
        assert!(state.password.is_empty());
        assert_eq!(state.username, "asha");
    }

    #[test]
    fn test_toggle_detail() {
        let mut state = UiState::new();
        state.toggle_detail("7");
        assert!(state.is_expanded("7"));
        state.toggle_detail("7");
        assert!(!state.is_expanded("7"));
    }

    #[test]
    fn test_new_password_must_match() {
        let mut state = UiState::new();
        state.new_password = "monsoon".into();
        state.confirm_password = "monsoom".into();
        assert_eq!(state.take_new_password(), None);
        assert_eq!(state.form_error.as_deref(), Some(PASSWORD_MISMATCH));
        assert_eq!(state.new_password, "monsoon");

        state.confirm_password = "monsoon".into();
        assert_eq!(state.take_new_password().as_deref(), Some("monsoon"));
        assert!(state.form_error.is_none());
        assert!(state.new_password.is_empty());
        assert!(state.confirm_password.is_empty());
    }

    #[test]
    fn test_open_settings_fills_profile() {
        let mut state = UiState::new();
        state.open_settings(&Account::SignedIn {
            username: "asha".into(),
            display_name: Some("Asha Devi".into()),
            avatar_url: None,
        });
        assert!(state.settings_open);
        assert_eq!(state.display_name, "Asha Devi");
        assert_eq!(
            state.profile_update(),
            ProfileUpdate {
                display_name: Some("Asha Devi".into()),
                avatar_url: None,
            }
        );

        state.current_password = "old".into();
        state.close_settings();
        assert!(!state.settings_open);
        assert!(state.current_password.is_empty());
    }

    #[test]
    fn test_theme_change_reported_once() {
        let mut state = UiState::new();
        assert!(state.take_theme_change());
        assert!(!state.take_theme_change());
        state.light_theme = true;
        assert!(state.take_theme_change());
        assert!(!state.take_theme_change());
    }

    #[test]
    fn test_reset_keeps_theme() {
        let mut state = UiState::new();
        state.light_theme = true;
        state.settings_open = true;
        state.auth_mode = AuthMode::ResetPassword;
        state.reset();
        assert!(state.light_theme);
        assert!(!state.settings_open);
        assert_eq!(state.auth_mode, AuthMode::SignIn);
    }

    #[test]
    fn test_action_to_command() {
        let cmd: AppCommand = UiAction::SetLanguage(Language::Tamil).into();
        assert!(matches!(cmd, AppCommand::SetLanguage(Language::Tamil)));
        let cmd: AppCommand = UiAction::DeleteMessage("12".into()).into();
        assert!(matches!(cmd, AppCommand::DeleteMessage(id) if id == "12"));
    }
}
