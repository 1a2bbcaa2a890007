use super::types::Message;

/// Ordered conversation log owned by the session controller.
///
/// Lives inside the shared application state, so every mutation happens
/// under the state's write lock and the UI never sees half of a turn.
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    messages: Vec<Message>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the user and assistant halves of one turn together
    pub fn append_turn(&mut self, user: Message, ai: Message) {
        self.messages.reserve(2);
        self.messages.push(user);
        self.messages.push(ai);
    }

    /// Remove the message with `id`. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.messages.len();
        self.messages.retain(|m| m.id != id);
        self.messages.len() != before
    }

    /// Replace the whole log, e.g. with history fetched from the server
    pub fn replace(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn get(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ConversationHistory {
        let mut history = ConversationHistory::new();
        history.append_turn(Message::user("one"), Message::ai("uno"));
        history.append_turn(Message::user("two"), Message::ai("dos"));
        history
    }

    #[test]
    fn test_append_turn_keeps_order() {
        let history = sample();
        let texts: Vec<_> = history.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["one", "uno", "two", "dos"]);
    }

    #[test]
    fn test_remove_by_id() {
        let mut history = sample();
        let id = history.messages()[1].id.clone();

        assert!(history.remove(&id));
        let texts: Vec<_> = history.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["one", "two", "dos"]);

        assert!(!history.remove(&id));
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_clear() {
        let mut history = sample();
        history.clear();
        assert!(history.is_empty());
    }
}
