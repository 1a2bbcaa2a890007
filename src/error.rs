//! Error types for the Horizon client
//!
//! Every failure that can reach the session controller is one of these
//! variants. `class()` folds them into the handful of outcomes the controller
//! actually distinguishes.

use thiserror::Error;

/// Horizon client errors
#[derive(Error, Debug, Clone)]
pub enum HorizonError {
    /// Microphone access was refused by the host
    #[error("Microphone permission denied: {0}")]
    PermissionDenied(String),

    /// Audio device initialization or operation error
    #[error("Audio device error: {0}")]
    AudioDeviceError(String),

    /// The request failed, timed out or returned an unexpected status
    #[error("Transport error: {0}")]
    Transport(String),

    /// The collaborator API rejected the bearer credential
    #[error("Unauthorized")]
    Unauthorized,

    /// The server refused the request and explained why (e.g. bad credentials)
    #[error("Rejected: {0}")]
    Rejected(String),

    /// A response body did not match the expected shape
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Channel communication error
    #[error("Channel error: {0}")]
    ChannelError(String),

    /// File system I/O error
    #[error("IO error: {0}")]
    IOError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// How the session controller reacts to a failure
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// Device or permission problem; warn the user and return to idle
    Capability,
    /// Network or server problem; show the connectivity banner
    Transport,
    /// Credential rejected; tear the session down
    Authentication,
}

impl From<std::io::Error> for HorizonError {
    fn from(e: std::io::Error) -> Self {
        HorizonError::IOError(e.to_string())
    }
}

impl From<reqwest::Error> for HorizonError {
    fn from(e: reqwest::Error) -> Self {
        if e.status() == Some(reqwest::StatusCode::UNAUTHORIZED) {
            HorizonError::Unauthorized
        } else if e.is_decode() {
            HorizonError::InvalidPayload(e.to_string())
        } else {
            HorizonError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for HorizonError {
    fn from(e: serde_json::Error) -> Self {
        HorizonError::InvalidPayload(e.to_string())
    }
}

impl HorizonError {
    /// Classify this error for the session controller
    pub fn class(&self) -> ErrorClass {
        match self {
            HorizonError::PermissionDenied(_) | HorizonError::AudioDeviceError(_) => {
                ErrorClass::Capability
            }
            HorizonError::Unauthorized => ErrorClass::Authentication,
            HorizonError::Transport(_)
            | HorizonError::Rejected(_)
            | HorizonError::InvalidPayload(_)
            | HorizonError::ChannelError(_)
            | HorizonError::IOError(_)
            | HorizonError::ConfigError(_) => ErrorClass::Transport,
        }
    }

    /// Check if this error is recoverable
    ///
    /// Recoverable errors leave the session usable; the rest need the user
    /// to log in again, fix a device or restart.
    pub fn is_recoverable(&self) -> bool {
        match self {
            HorizonError::PermissionDenied(_) => true,
            HorizonError::AudioDeviceError(_) => false,
            HorizonError::Transport(_) => true,
            HorizonError::Unauthorized => false,
            HorizonError::Rejected(_) => true,
            HorizonError::InvalidPayload(_) => true,
            HorizonError::ChannelError(_) => false,
            HorizonError::IOError(_) => false,
            HorizonError::ConfigError(_) => false,
        }
    }

    /// Get a user-friendly description of the error
    pub fn user_message(&self) -> String {
        match self {
            HorizonError::PermissionDenied(_) => {
                "Microphone access is required for voice communication.".to_string()
            }
            HorizonError::AudioDeviceError(_) => {
                "Audio device error. Please check your microphone/speakers.".to_string()
            }
            HorizonError::Transport(_) | HorizonError::InvalidPayload(_) => {
                "Could not connect to server. Please ensure backend is running.".to_string()
            }
            HorizonError::Rejected(detail) => detail.clone(),
            HorizonError::Unauthorized => "Your session has expired. Please log in again.".to_string(),
            HorizonError::ChannelError(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
            HorizonError::IOError(_) => "File system error occurred.".to_string(),
            HorizonError::ConfigError(_) => "Configuration error. Please check settings.".to_string(),
        }
    }
}

/// Result type alias for Horizon operations
pub type Result<T> = std::result::Result<T, HorizonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes() {
        assert_eq!(
            HorizonError::PermissionDenied("blocked".into()).class(),
            ErrorClass::Capability
        );
        assert_eq!(
            HorizonError::Transport("timeout".into()).class(),
            ErrorClass::Transport
        );
        assert_eq!(
            HorizonError::InvalidPayload("missing field".into()).class(),
            ErrorClass::Transport
        );
        assert_eq!(HorizonError::Unauthorized.class(), ErrorClass::Authentication);
    }

    #[test]
    fn test_recoverability() {
        assert!(HorizonError::Transport("x".into()).is_recoverable());
        assert!(!HorizonError::Unauthorized.is_recoverable());
        assert!(!HorizonError::AudioDeviceError("x".into()).is_recoverable());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: HorizonError = io.into();
        assert!(matches!(err, HorizonError::IOError(_)));
    }

    #[test]
    fn test_json_conversion() {
        let err: HorizonError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, HorizonError::InvalidPayload(_)));
    }
}
