pub mod history;
pub mod types;

pub use history::ConversationHistory;
pub use types::{Message, Sender};
