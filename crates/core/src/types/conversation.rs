use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

// =============================================================================
// Conversation Window
// =============================================================================

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Bounded window of the most recent conversation messages.
///
/// Holds at most `max_turns * 2` messages (one user and one assistant message
/// per turn) and drops the oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationWindow {
    max_turns: usize,
    messages: VecDeque<ConversationTurn>,
}

impl ConversationWindow {
    pub fn new(max_turns: usize) -> Self {
        Self {
            max_turns,
            messages: VecDeque::with_capacity(max_turns * 2),
        }
    }

    /// Maximum number of messages retained.
    pub fn capacity(&self) -> usize {
        self.max_turns * 2
    }

    pub fn push(&mut self, turn: ConversationTurn) {
        self.messages.push_back(turn);
        while self.messages.len() > self.capacity() {
            self.messages.pop_front();
        }
    }

    /// Record a full exchange.
    pub fn record_exchange(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.push(ConversationTurn::user(user));
        self.push(ConversationTurn::assistant(assistant));
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConversationTurn> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Snapshot for one request.
    pub fn to_vec(&self) -> Vec<ConversationTurn> {
        self.messages.iter().cloned().collect()
    }
}

impl Default for ConversationWindow {
    fn default() -> Self {
        Self::new(5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_truncates_oldest_first() {
        let mut window = ConversationWindow::new(2);
        for i in 0..3 {
            window.record_exchange(format!("q{}", i), format!("a{}", i));
        }

        assert_eq!(window.len(), 4);
        let contents: Vec<_> = window.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["q1", "a1", "q2", "a2"]);
    }

    #[test]
    fn test_zero_turn_window_keeps_nothing() {
        let mut window = ConversationWindow::new(0);
        window.push(ConversationTurn::user("hello"));
        assert!(window.is_empty());
    }

    #[test]
    fn test_role_serialization() {
        let turn = ConversationTurn::assistant("hi");
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["role"], "assistant");
    }
}
