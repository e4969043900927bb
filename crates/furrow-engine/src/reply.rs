//! Reply producers.
//!
//! A [`ReplyProducer`] turns the text of a user message into assistant reply
//! text, asynchronously. The session runs each call on its own task, wraps it
//! in a timeout, and may abort it, so implementations need not handle either.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Default delay of the simulated producer.
pub const DEFAULT_REPLY_DELAY: Duration = Duration::from_millis(1000);

/// Capability to answer a user message.
pub trait ReplyProducer: Send + Sync + 'static {
    /// Short name shown in logs and the loading indicator.
    fn name(&self) -> &str;

    /// Produce reply text for `prompt`.
    fn produce(&self, prompt: String) -> impl Future<Output = Result<String, ReplyError>> + Send;
}

/// Build the simulated reply for a user message.
pub fn simulated_reply(prompt: &str) -> String {
    format!(
        "I understand you're asking about \"{prompt}\". As a demo, I'm providing a simulated \
         response. In a production environment, this would be connected to an AI service to \
         provide accurate farm budgeting assistance."
    )
}

/// Assistant text appended in place of a reply when production fails.
pub fn failure_reply(error: &ReplyError) -> String {
    format!("Sorry, I couldn't answer that just now ({error}). Please try again.")
}

/// Stand-in for a real assistant backend.
///
/// Waits a fixed delay, then echoes the prompt inside [`simulated_reply`].
/// Never fails.
#[derive(Debug, Clone)]
pub struct SimulatedReplyProducer {
    delay: Duration,
}

impl SimulatedReplyProducer {
    /// Create a producer with the given delay.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Configured delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for SimulatedReplyProducer {
    fn default() -> Self {
        Self::new(DEFAULT_REPLY_DELAY)
    }
}

impl ReplyProducer for SimulatedReplyProducer {
    fn name(&self) -> &str {
        "assistant"
    }

    fn produce(&self, prompt: String) -> impl Future<Output = Result<String, ReplyError>> + Send {
        let delay = self.delay;
        async move {
            tokio::time::sleep(delay).await;
            Ok(simulated_reply(&prompt))
        }
    }
}

/// One canned outcome for [`ScriptedReplyProducer`].
#[derive(Debug, Clone)]
pub struct ScriptedReply {
    /// How long the call takes.
    pub delay: Duration,
    /// What the call returns.
    pub outcome: Result<String, ReplyError>,
}

impl ScriptedReply {
    /// A successful reply after `delay`.
    pub fn ok(delay: Duration, content: impl Into<String>) -> Self {
        Self {
            delay,
            outcome: Ok(content.into()),
        }
    }

    /// A failed reply after `delay`.
    pub fn err(delay: Duration, error: ReplyError) -> Self {
        Self {
            delay,
            outcome: Err(error),
        }
    }
}

/// Producer that plays back a fixed script, one entry per call.
///
/// Useful for exercising failures, slow replies and out-of-order completion.
/// Once the script runs out every call fails with [`ReplyError::Unavailable`].
#[derive(Debug, Default)]
pub struct ScriptedReplyProducer {
    script: Mutex<VecDeque<ScriptedReply>>,
}

impl ScriptedReplyProducer {
    /// Create a producer from a list of outcomes, consumed in call order.
    pub fn new(script: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
        }
    }

    /// Number of outcomes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl ReplyProducer for ScriptedReplyProducer {
    fn name(&self) -> &str {
        "scripted"
    }

    fn produce(&self, _prompt: String) -> impl Future<Output = Result<String, ReplyError>> + Send {
        let next = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        async move {
            let Some(step) = next else {
                return Err(ReplyError::Unavailable("script exhausted".into()));
            };
            tokio::time::sleep(step.delay).await;
            step.outcome
        }
    }
}

/// Errors a reply producer can report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplyError {
    /// The producer did not answer in time.
    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The backend could not be reached or refused the request.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The backend answered with something that is not a usable reply.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_reply_embeds_prompt() {
        let reply = simulated_reply("What is my corn budget?");
        assert!(reply.contains("\"What is my corn budget?\""));
        assert!(reply.starts_with("I understand you're asking about"));
        assert!(reply.ends_with("accurate farm budgeting assistance."));
    }

    #[test]
    fn test_simulated_reply_keeps_newlines() {
        let reply = simulated_reply("seed\ncosts");
        assert!(reply.contains("seed\ncosts"));
    }

    #[test]
    fn test_failure_reply_mentions_error() {
        let text = failure_reply(&ReplyError::Timeout(Duration::from_secs(2)));
        assert!(text.contains("timed out after 2000ms"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_producer_waits_delay() {
        let producer = SimulatedReplyProducer::default();
        let start = tokio::time::Instant::now();

        let reply = producer.produce("fertilizer".into()).await.unwrap();

        assert!(start.elapsed() >= DEFAULT_REPLY_DELAY);
        assert!(reply.contains("fertilizer"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_scripted_producer_plays_in_order() {
        let producer = ScriptedReplyProducer::new([
            ScriptedReply::ok(Duration::from_millis(10), "one"),
            ScriptedReply::err(
                Duration::from_millis(10),
                ReplyError::InvalidResponse("empty".into()),
            ),
        ]);
        assert_eq!(producer.remaining(), 2);

        assert_eq!(producer.produce("a".into()).await, Ok("one".into()));
        assert_eq!(
            producer.produce("b".into()).await,
            Err(ReplyError::InvalidResponse("empty".into()))
        );
        assert!(matches!(
            producer.produce("c".into()).await,
            Err(ReplyError::Unavailable(_))
        ));
        assert_eq!(producer.remaining(), 0);
    }
}
