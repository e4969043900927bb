//! Conversation store.
//!
//! The [`Conversation`] is the append-only transcript plus the pending flag.
//! Views render from it and nothing else. The only public mutation is
//! [`Conversation::push`]; the pending flag is driven by the owning
//! [`ChatSession`](crate::session::ChatSession).

use crate::message::{Message, MessageId, Role};
use uuid::Uuid;

/// Greeting the assistant opens every conversation with.
pub const GREETING: &str = "Hello! I'm your Farm Budget Planning Assistant. I can help you with:\n\n\
- Creating farm budgets\n\
- Calculating crop expenses\n\
- Planning equipment investments\n\
- Estimating labor costs\n\n\
How can I assist you today?";

/// Ordered, append-only sequence of messages for one session.
#[derive(Debug, Clone)]
pub struct Conversation {
    id: Uuid,
    messages: Vec<Message>,
    next_id: u64,
    pending: bool,
    revision: u64,
}

impl Conversation {
    /// Create a conversation seeded with the default greeting.
    pub fn new() -> Self {
        Self::with_greeting(GREETING)
    }

    /// Create a conversation seeded with a custom assistant greeting.
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        let mut conversation = Self {
            id: Uuid::new_v4(),
            messages: Vec::new(),
            next_id: 1,
            pending: false,
            revision: 0,
        };
        conversation.push(Role::Assistant, greeting);
        conversation
    }

    /// Session identifier, used to correlate log lines.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Append a message to the end of the transcript.
    ///
    /// Always succeeds; returns the identifier assigned to the new message.
    pub fn push(&mut self, role: Role, content: impl Into<String>) -> MessageId {
        let id = MessageId::new(self.next_id);
        self.next_id += 1;
        self.messages.push(Message::new(id, role, content));
        self.revision += 1;
        id
    }

    /// All messages in display order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the transcript is empty. Never true for a seeded conversation.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Most recent message.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Look up a message by identifier.
    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Whether an assistant reply is outstanding.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Mutation counter. Bumped on every append and every pending change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn set_pending(&mut self, pending: bool) {
        if self.pending != pending {
            self.pending = pending;
            self.revision += 1;
        }
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
