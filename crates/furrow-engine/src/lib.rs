//! furrow-engine: Headless conversation engine for the Farm Budget Planner chat
//!
//! This crate provides everything below the UI:
//! - The append-only conversation store and its pending flag
//! - The chat session that validates submissions and tracks outstanding replies
//! - Reply producers (simulated backend and a scripted test double)
//! - Configuration

pub mod config;
pub mod conversation;
pub mod message;
pub mod reply;
pub mod session;

// Re-export commonly used types
pub use config::{ConcurrencyPolicy, Config, ConfigError};
pub use conversation::{Conversation, GREETING};
pub use message::{Message, MessageId, Role};
pub use reply::{
    failure_reply, simulated_reply, ReplyError, ReplyProducer, ScriptedReply,
    ScriptedReplyProducer, SimulatedReplyProducer, DEFAULT_REPLY_DELAY,
};
pub use session::{ChatSession, RequestId, SessionState, SubmitError, Submission};

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
