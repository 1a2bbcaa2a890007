//! Horizon - voice-first assistant client
//!
//! The user speaks or types a question, a remote collaborator API answers,
//! and the answer is spoken back. One conversational turn runs at a time;
//! starting a new one or interrupting supersedes whatever is in flight.

pub mod api;
pub mod audio;
pub mod config;
pub mod controller;
pub mod error;
pub mod language;
pub mod messages;
pub mod orchestrator;
pub mod session;
pub mod state;
pub mod ui;

// Re-export error types
pub use error::{ErrorClass, HorizonError, Result};

pub use api::{ApiClient, AssistantApi};
pub use config::HorizonConfig;
pub use controller::{Effect, Generation, VoiceController, VoiceStatus};
pub use language::Language;
pub use orchestrator::{Orchestrator, OrchestratorHandle};
pub use session::{Session, SessionStore};
pub use state::{Account, AppCommand, AppEvent, AppState, AppStateSnapshot, SharedAppState};
