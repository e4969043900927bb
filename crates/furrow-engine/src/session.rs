//! Chat session: the single owner of a conversation.
//!
//! [`ChatSession`] validates submissions, appends user messages, dispatches
//! reply production onto tokio tasks and applies their results when the owner
//! drains them. Reply tasks never touch the conversation; they report back
//! over a channel, so all mutation happens on the owner's task.
//!
//! ```text
//!   submit("...") ──► push user msg ──► pending = true ──► spawn producer
//!                                                              │
//!   poll_replies() / next_reply() ◄──── ReplyEvent ◄───────────┘
//!        │
//!        └─► push assistant msg ──► pending = false (when nothing is left)
//! ```

use crate::config::{ConcurrencyPolicy, Config};
use crate::conversation::Conversation;
use crate::message::{Message, MessageId, Role};
use crate::reply::{failure_reply, ReplyError, ReplyProducer, SimulatedReplyProducer};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Identifier of one request/response cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// Result of a submission that was not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Input was empty or whitespace only; nothing changed.
    Ignored,
    /// User message appended and reply production started.
    Dispatched {
        request: RequestId,
        message: MessageId,
    },
    /// User message appended; reply production waits for earlier requests.
    Queued {
        request: RequestId,
        message: MessageId,
    },
}

impl Submission {
    /// Whether the user message was appended (the input field should clear).
    pub fn is_accepted(&self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

/// Where a session is in its request/response cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No reply outstanding.
    Idle,
    /// At least one reply outstanding.
    AwaitingReply,
}

/// Completion report sent from a reply task back to the session.
#[derive(Debug)]
struct ReplyEvent {
    request: RequestId,
    result: Result<String, ReplyError>,
}

/// Sends exactly one [`ReplyEvent`] for a request.
///
/// If the reply task ends without reporting (the producer panicked, or the
/// task was aborted) the drop sends a failure instead, so the owner never
/// waits on a request that can no longer finish. Events for aborted requests
/// are discarded by the session.
struct ReplyReporter {
    request: RequestId,
    tx: Option<mpsc::UnboundedSender<ReplyEvent>>,
}

impl ReplyReporter {
    fn new(request: RequestId, tx: mpsc::UnboundedSender<ReplyEvent>) -> Self {
        Self {
            request,
            tx: Some(tx),
        }
    }

    fn report(mut self, result: Result<String, ReplyError>) {
        self.send(result);
    }

    fn send(&mut self, result: Result<String, ReplyError>) {
        if let Some(tx) = self.tx.take() {
            // Receiver gone means the session was dropped.
            let _ = tx.send(ReplyEvent {
                request: self.request,
                result,
            });
        }
    }
}

impl Drop for ReplyReporter {
    fn drop(&mut self) {
        if self.tx.is_some() {
            self.send(Err(ReplyError::Unavailable("reply task ended".into())));
        }
    }
}

/// A request waiting for its turn under [`ConcurrencyPolicy::Queue`].
#[derive(Debug)]
struct QueuedRequest {
    request: RequestId,
    prompt: String,
}

/// Owner of one conversation and its outstanding replies.
///
/// Submitting requires a tokio runtime, since reply production is spawned.
/// Dropping the session aborts every outstanding reply task.
pub struct ChatSession<P: ReplyProducer = SimulatedReplyProducer> {
    conversation: Conversation,
    producer: Arc<P>,
    policy: ConcurrencyPolicy,
    reply_timeout: Duration,
    in_flight: HashMap<RequestId, JoinHandle<()>>,
    queue: VecDeque<QueuedRequest>,
    next_request: u64,
    tx: mpsc::UnboundedSender<ReplyEvent>,
    rx: mpsc::UnboundedReceiver<ReplyEvent>,
}

impl ChatSession<SimulatedReplyProducer> {
    /// Build a session with the simulated producer described by `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::with_conversation(
            Conversation::with_greeting(config.greeting.clone()),
            SimulatedReplyProducer::new(config.reply_delay()),
            config.concurrency,
            config.reply_timeout(),
        )
    }
}

impl<P: ReplyProducer> ChatSession<P> {
    /// Create a session with the default greeting and timeout.
    pub fn new(producer: P, policy: ConcurrencyPolicy) -> Self {
        Self::with_conversation(
            Conversation::new(),
            producer,
            policy,
            Config::default().reply_timeout(),
        )
    }

    /// Create a session around an existing conversation.
    pub fn with_conversation(
        conversation: Conversation,
        producer: P,
        policy: ConcurrencyPolicy,
        reply_timeout: Duration,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            conversation,
            producer: Arc::new(producer),
            policy,
            reply_timeout,
            in_flight: HashMap::new(),
            queue: VecDeque::new(),
            next_request: 1,
            tx,
            rx,
        }
    }

    /// The conversation, for rendering.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Messages in display order.
    pub fn messages(&self) -> &[Message] {
        self.conversation.messages()
    }

    /// Whether a reply is outstanding.
    pub fn is_pending(&self) -> bool {
        self.conversation.is_pending()
    }

    /// Current cycle state.
    pub fn state(&self) -> SessionState {
        if self.is_pending() {
            SessionState::AwaitingReply
        } else {
            SessionState::Idle
        }
    }

    /// Policy for submissions made while a reply is outstanding.
    pub fn policy(&self) -> ConcurrencyPolicy {
        self.policy
    }

    /// Whether a submission right now would be accepted.
    ///
    /// Drives the input affordance: false only under
    /// [`ConcurrencyPolicy::Reject`] while a reply is outstanding.
    pub fn accepts_input(&self) -> bool {
        !(self.policy == ConcurrencyPolicy::Reject && self.is_pending())
    }

    /// Number of requests currently being produced.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Number of requests waiting behind others.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Name of the reply producer.
    pub fn producer_name(&self) -> &str {
        self.producer.name()
    }

    /// Submit raw input text.
    ///
    /// Blank input is ignored. Otherwise the untrimmed text is appended as a
    /// user message, the session becomes pending and reply production is
    /// started (or queued) before this returns.
    pub fn submit(&mut self, input: &str) -> Result<Submission, SubmitError> {
        if input.trim().is_empty() {
            debug!(session = %self.conversation.id(), "Ignoring blank submission");
            return Ok(Submission::Ignored);
        }

        let busy = self.is_pending();
        if busy && self.policy == ConcurrencyPolicy::Reject {
            warn!(
                session = %self.conversation.id(),
                in_flight = self.in_flight.len(),
                "Rejecting submission while a reply is pending"
            );
            return Err(SubmitError::Busy);
        }

        let message = self.conversation.push(Role::User, input);
        let request = RequestId(self.next_request);
        self.next_request += 1;

        let submission = if busy && self.policy == ConcurrencyPolicy::Queue {
            self.queue.push_back(QueuedRequest {
                request,
                prompt: input.to_string(),
            });
            Submission::Queued { request, message }
        } else {
            self.dispatch(request, input.to_string());
            Submission::Dispatched { request, message }
        };

        info!(
            session = %self.conversation.id(),
            %request,
            %message,
            queued = matches!(submission, Submission::Queued { .. }),
            "Accepted submission"
        );

        self.refresh_pending();
        Ok(submission)
    }

    /// Apply every reply that has already arrived, without waiting.
    ///
    /// Returns the number of messages appended.
    pub fn poll_replies(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.rx.try_recv() {
            if self.apply(event).is_some() {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for the next outstanding reply and append it.
    ///
    /// Returns `None` immediately when nothing is outstanding.
    pub async fn next_reply(&mut self) -> Option<&Message> {
        while self.is_pending() {
            let event = self.rx.recv().await?;
            if let Some(id) = self.apply(event) {
                return self.conversation.get(id);
            }
        }
        None
    }

    /// Wait until every outstanding reply has been appended.
    pub async fn settle(&mut self) {
        while self.next_reply().await.is_some() {}
    }

    /// Abort all outstanding replies and drop queued requests.
    ///
    /// Returns the number of requests cancelled. No reply is ever appended
    /// for a cancelled request.
    pub fn cancel(&mut self) -> usize {
        let cancelled = self.in_flight.len() + self.queue.len();
        for (_, handle) in self.in_flight.drain() {
            handle.abort();
        }
        self.queue.clear();
        // Late results from aborted tasks are discarded in `apply`.
        while self.rx.try_recv().is_ok() {}
        if cancelled > 0 {
            info!(session = %self.conversation.id(), cancelled, "Cancelled outstanding replies");
        }
        self.refresh_pending();
        cancelled
    }

    fn dispatch(&mut self, request: RequestId, prompt: String) {
        let producer = Arc::clone(&self.producer);
        let tx = self.tx.clone();
        let reply_timeout = self.reply_timeout;

        debug!(session = %self.conversation.id(), %request, "Dispatching reply");

        let handle = tokio::spawn(async move {
            let reporter = ReplyReporter::new(request, tx);
            let result = match tokio::time::timeout(reply_timeout, producer.produce(prompt)).await
            {
                Ok(result) => result,
                Err(_) => Err(ReplyError::Timeout(reply_timeout)),
            };
            reporter.report(result);
        });
        self.in_flight.insert(request, handle);
    }

    /// Append the reply (or failure notice) for a finished request.
    fn apply(&mut self, event: ReplyEvent) -> Option<MessageId> {
        if self.in_flight.remove(&event.request).is_none() {
            debug!(request = %event.request, "Discarding reply for cancelled request");
            return None;
        }

        let id = match event.result {
            Ok(content) => {
                let id = self.conversation.push(Role::Assistant, content);
                info!(
                    session = %self.conversation.id(),
                    request = %event.request,
                    message = %id,
                    "Reply received"
                );
                id
            }
            Err(e) => {
                warn!(
                    session = %self.conversation.id(),
                    request = %event.request,
                    error = %e,
                    "Reply failed"
                );
                self.conversation.push(Role::Assistant, failure_reply(&e))
            }
        };

        if self.in_flight.is_empty() {
            if let Some(next) = self.queue.pop_front() {
                self.dispatch(next.request, next.prompt);
            }
        }

        self.refresh_pending();
        Some(id)
    }

    fn refresh_pending(&mut self) {
        let pending = !self.in_flight.is_empty() || !self.queue.is_empty();
        self.conversation.set_pending(pending);
    }
}

impl<P: ReplyProducer> Drop for ChatSession<P> {
    fn drop(&mut self) {
        for (_, handle) in self.in_flight.drain() {
            handle.abort();
        }
    }
}

impl<P: ReplyProducer> fmt::Debug for ChatSession<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatSession")
            .field("conversation", &self.conversation)
            .field("producer", &self.producer.name())
            .field("policy", &self.policy)
            .field("in_flight", &self.in_flight.len())
            .field("queued", &self.queue.len())
            .finish_non_exhaustive()
    }
}

/// Errors returned by [`ChatSession::submit`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// A reply is outstanding and the policy rejects concurrent submissions.
    #[error("a reply is still pending")]
    Busy,
}
