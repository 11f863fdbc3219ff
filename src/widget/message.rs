//! Messages and the append-only chat log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prefix put in front of every failure description shown in the log.
pub const ERROR_PREFIX: &str = "Error: ";

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Typed by the person using the widget.
    User,
    /// Returned by the remote endpoint, or an error description.
    Bot,
}

/// A single rendered chat message. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Display text.
    pub text: String,
    /// Author.
    pub origin: Origin,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a message stamped with the current time.
    pub fn new(text: impl Into<String>, origin: Origin) -> Self {
        Self {
            text: text.into(),
            origin,
            created_at: Utc::now(),
        }
    }

    /// Create a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Origin::User)
    }

    /// Create a bot message.
    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(text, Origin::Bot)
    }

    /// Create a bot message describing a failure.
    pub fn error(description: impl std::fmt::Display) -> Self {
        Self::bot(format!("{ERROR_PREFIX}{description}"))
    }

    /// Whether this message was authored by the user.
    pub fn is_user(&self) -> bool {
        self.origin == Origin::User
    }
}

/// Ordered, append-only sequence of messages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatLog {
    messages: Vec<Message>,
}

impl ChatLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return a reference to it.
    pub fn append(&mut self, message: Message) -> &Message {
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    /// All messages, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The most recent message.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Iterate over messages from a given origin.
    pub fn by_origin(&self, origin: Origin) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(move |m| m.origin == origin)
    }
}
