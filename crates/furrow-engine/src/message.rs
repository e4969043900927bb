//! Transcript entries.
//!
//! A [`Message`] is one line of the conversation: who wrote it, what they
//! wrote, and a per-conversation identifier.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Text typed by the person at the keyboard.
    User,
    /// Reply produced by the assistant (simulated or real).
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// Identifier of a message, unique within its conversation.
///
/// Allocated from a monotonic counter, so later messages always compare
/// greater than earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(u64);

impl MessageId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw counter value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msg-{}", self.0)
    }
}

/// A single entry in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Identifier, unique within the conversation.
    pub id: MessageId,
    /// Author of the message.
    pub role: Role,
    /// Message text, kept verbatim (whitespace and newlines included).
    pub content: String,
    /// When the message was created.
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub(crate) fn new(id: MessageId, role: Role, content: impl Into<String>) -> Self {
        Self {
            id,
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// Whether this message was written by the user.
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}
