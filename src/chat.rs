//! Session chat stream
//!
//! Guesses, ordinary chat and system notices share one ordered log. The
//! log only grows during a game and is wiped once, when the game starts.

use serde::{Deserialize, Serialize};

use crate::{constants::chat::MAX_MESSAGE_LENGTH, players::Id};

/// How a chat line should be presented and who may see it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatKind {
    /// Ordinary chat from a player
    User,
    /// Chat from a player who already guessed this turn
    ///
    /// Only the drawer and players who guessed can see these, so the
    /// word cannot leak to players still guessing.
    Guessed,
    /// Neutral system notice
    Info,
    /// Positive system notice, such as a correct guess
    Success,
    /// Cautionary system notice
    Warning,
}

/// A single line of the chat log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Rendered text
    pub text: String,
    /// Player who wrote it, `None` for system notices
    pub sender: Option<Id>,
    /// Presentation and visibility class
    pub kind: ChatKind,
}

impl ChatMessage {
    /// A line written by a player, rendered as `"<name>: <text>"`
    pub fn user(sender: Id, name: &str, text: &str, kind: ChatKind) -> Self {
        Self {
            text: format!("{name}: {text}"),
            sender: Some(sender),
            kind,
        }
    }

    /// A notice generated by the session
    pub fn system(kind: ChatKind, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: None,
            kind,
        }
    }

    /// Whether a viewer can see this line
    ///
    /// `privileged` is true for the drawer and for players who already
    /// guessed the current word.
    pub fn visible_to(&self, privileged: bool) -> bool {
        privileged || self.kind != ChatKind::Guessed
    }
}

/// Trims chat input and caps it to the maximum message length
///
/// Returns `None` when nothing is left to send.
pub fn clean_text(text: &str) -> Option<&str> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    match text.char_indices().nth(MAX_MESSAGE_LENGTH) {
        Some((cut, _)) => Some(&text[..cut]),
        None => Some(text),
    }
}

/// Ordered, append-only list of chat lines
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
}

impl ChatLog {
    /// Appends a line
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Removes every line
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Lines in the order they were appended
    pub fn iter(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    /// Number of lines
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the log has no lines
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The most recent line
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_format() {
        let id = Id::new();
        let message = ChatMessage::user(id, "Ada", "hello", ChatKind::User);
        assert_eq!(message.text, "Ada: hello");
        assert_eq!(message.sender, Some(id));
        assert_eq!(message.kind, ChatKind::User);
    }

    #[test]
    fn test_guessed_visibility() {
        let message = ChatMessage::user(Id::new(), "Ada", "nice", ChatKind::Guessed);
        assert!(!message.visible_to(false));
        assert!(message.visible_to(true));

        let notice = ChatMessage::system(ChatKind::Info, "Starting round 1");
        assert!(notice.visible_to(false));
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  hi  "), Some("hi"));
        assert_eq!(clean_text("   "), None);
        assert_eq!(clean_text(""), None);

        let long = "é".repeat(MAX_MESSAGE_LENGTH + 10);
        let cleaned = clean_text(&long).unwrap();
        assert_eq!(cleaned.chars().count(), MAX_MESSAGE_LENGTH);
    }

    #[test]
    fn test_log_order_and_clear() {
        let mut log = ChatLog::default();
        log.push(ChatMessage::system(ChatKind::Info, "one"));
        log.push(ChatMessage::system(ChatKind::Success, "two"));

        let texts: Vec<_> = log.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["one", "two"]);
        assert_eq!(log.last().map(|m| m.kind), Some(ChatKind::Success));

        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&ChatKind::Guessed).unwrap(),
            "\"guessed\""
        );
    }
}
