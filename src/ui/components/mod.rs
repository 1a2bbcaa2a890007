//! UI components
//!
//! Each component renders from borrowed state and returns the
//! [`UiAction`](crate::ui::UiAction)s the user triggered this frame.

pub mod banner;
pub mod header;
pub mod input_bar;
pub mod login_panel;
pub mod message_list;
pub mod settings_panel;
pub mod voice_orb;

pub use banner::{StatusBanner, CONNECTIVITY_MESSAGE};
pub use header::Header;
pub use input_bar::InputBar;
pub use login_panel::LoginPanel;
pub use message_list::MessageList;
pub use settings_panel::SettingsPanel;
pub use voice_orb::VoiceOrb;
