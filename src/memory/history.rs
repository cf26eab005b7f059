use crate::types::Message;
use std::collections::VecDeque;

/// One completed exchange with the assistant.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationTurn {
    pub user: String,
    pub assistant: String,
}

/// Bounded, insertion-ordered buffer of the most recent conversation turns.
///
/// Ring-buffer semantics: appending beyond the capacity evicts the oldest
/// turn. In-memory only; independent of the vector index.
#[derive(Debug)]
pub struct ConversationWindow {
    max_turns: usize,
    turns: VecDeque<ConversationTurn>,
}

impl ConversationWindow {
    pub fn new(max_turns: usize) -> Self {
        Self {
            max_turns,
            turns: VecDeque::with_capacity(max_turns),
        }
    }

    pub fn push(&mut self, turn: ConversationTurn) {
        self.turns.push_back(turn);
        while self.turns.len() > self.max_turns {
            self.turns.pop_front();
        }
    }

    /// Expand the stored turns into role-tagged messages, oldest first, for
    /// placement ahead of the next user message in the prompt.
    pub fn render(&self) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.turns.len() * 2);
        for turn in &self.turns {
            messages.push(Message::user(turn.user.clone()));
            messages.push(Message::assistant(turn.assistant.clone()));
        }
        messages
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MessageRole;

    fn turn(i: usize) -> ConversationTurn {
        ConversationTurn {
            user: format!("question {}", i),
            assistant: format!("answer {}", i),
        }
    }

    #[test]
    fn holds_at_most_max_turns() {
        let mut window = ConversationWindow::new(5);
        for i in 0..6 {
            window.push(turn(i));
        }

        assert_eq!(window.len(), 5);
        let rendered = window.render();
        // The first turn was evicted; the remaining five are in order.
        assert_eq!(rendered[0].content, "question 1");
        assert_eq!(rendered[rendered.len() - 1].content, "answer 5");
    }

    #[test]
    fn render_alternates_roles_oldest_first() {
        let mut window = ConversationWindow::new(5);
        window.push(turn(0));
        window.push(turn(1));

        let rendered = window.render();
        assert_eq!(rendered.len(), 4);
        assert_eq!(rendered[0].role, MessageRole::User);
        assert_eq!(rendered[0].content, "question 0");
        assert_eq!(rendered[1].role, MessageRole::Assistant);
        assert_eq!(rendered[1].content, "answer 0");
        assert_eq!(rendered[2].content, "question 1");
        assert_eq!(rendered[3].content, "answer 1");
    }

    #[test]
    fn empty_window_renders_nothing() {
        let window = ConversationWindow::new(3);
        assert!(window.is_empty());
        assert!(window.render().is_empty());
    }
}
