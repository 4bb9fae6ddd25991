//! Ordered turn history for one chat session.

use bedchat_types::chat::Turn;

/// Append-only list of turns, oldest first.
///
/// Grows for the lifetime of the session; nothing is ever evicted.
#[derive(Debug, Clone, Default)]
pub struct ConversationBuffer {
    turns: Vec<Turn>,
}

impl ConversationBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a turn to the end of the conversation.
    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Borrow the turns in chronological order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Owned copy of the current turns, for building a request or handing to
    /// another task.
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.clone()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
