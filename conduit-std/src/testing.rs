//! Testing utilities for Conduit.
//!
//! This module provides extensions that make pipeline behavior observable
//! in tests.
//!
//! - [`RecordingExtension`]: records every message it sees
//! - [`CountingExtension`]: counts invocations, optionally rejecting messages

use conduit_core::{Direction, Extension, Hooks, Message, MessageError, Next, RequestContext};
use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicUsize, Ordering},
};

// ============================================================================
// Recording Extension
// ============================================================================

/// An extension that records every message it receives.
///
/// Clones share the same record.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = RecordingExtension::new();
/// pipeline.add_extension(recorder.clone());
///
/// pipeline.run_incoming(message, &context).await?;
///
/// assert_eq!(recorder.count(), 1);
/// ```
#[derive(Clone)]
pub struct RecordingExtension {
    seen: Arc<Mutex<Vec<(Direction, Message)>>>,
    hooks: Hooks,
}

impl RecordingExtension {
    /// Record both directions.
    pub fn new() -> Self {
        Self::with_hooks(Hooks::all())
    }

    /// Record only the given directions.
    pub fn with_hooks(hooks: Hooks) -> Self {
        Self {
            seen: Arc::new(Mutex::new(Vec::new())),
            hooks,
        }
    }

    /// Messages seen so far, in order.
    pub fn messages(&self) -> Vec<Message> {
        self.lock().iter().map(|(_, message)| message.clone()).collect()
    }

    /// Messages seen in one direction.
    pub fn messages_in(&self, direction: Direction) -> Vec<Message> {
        self.lock()
            .iter()
            .filter(|(seen, _)| *seen == direction)
            .map(|(_, message)| message.clone())
            .collect()
    }

    /// Number of messages seen.
    pub fn count(&self) -> usize {
        self.lock().len()
    }

    /// Clear the record.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn record(&self, direction: Direction, message: &Message) {
        self.lock().push((direction, message.clone()));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(Direction, Message)>> {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RecordingExtension {
    fn default() -> Self {
        Self::new()
    }
}

impl Extension for RecordingExtension {
    fn hooks(&self) -> Hooks {
        self.hooks
    }

    fn name(&self) -> &str {
        "recording"
    }

    async fn incoming(&self, message: Message, _context: &RequestContext, next: Next) {
        self.record(Direction::Incoming, &message);
        next.resume(message);
    }

    async fn outgoing(&self, message: Message, next: Next) {
        self.record(Direction::Outgoing, &message);
        next.resume(message);
    }
}

// ============================================================================
// Counting Extension
// ============================================================================

/// An extension that counts invocations.
///
/// # Example
///
/// ```rust,ignore
/// let counter = CountingExtension::new();
/// pipeline.add_extension(counter.clone());
///
/// pipeline.run_outgoing(message).await?;
///
/// assert_eq!(counter.count(), 1);
/// ```
#[derive(Clone)]
pub struct CountingExtension {
    count: Arc<AtomicUsize>,
    reject_with: Option<MessageError>,
}

impl CountingExtension {
    /// Count and pass messages through.
    pub fn new() -> Self {
        Self {
            count: Arc::new(AtomicUsize::new(0)),
            reject_with: None,
        }
    }

    /// Count and reject every message with `error`.
    pub fn rejecting(error: MessageError) -> Self {
        Self {
            reject_with: Some(error),
            ..Self::new()
        }
    }

    /// Get the current count.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Reset the counter.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }

    fn visit(&self, mut message: Message) -> Message {
        self.count.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.reject_with {
            message.set_error(error.clone());
        }
        message
    }
}

impl Default for CountingExtension {
    fn default() -> Self {
        Self::new()
    }
}

impl Extension for CountingExtension {
    fn hooks(&self) -> Hooks {
        Hooks::all()
    }

    fn name(&self) -> &str {
        "counting"
    }

    async fn incoming(&self, message: Message, _context: &RequestContext, next: Next) {
        next.resume(self.visit(message));
    }

    async fn outgoing(&self, message: Message, next: Next) {
        next.resume(self.visit(message));
    }
}
