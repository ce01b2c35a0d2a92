//! Single-use continuations.
//!
//! A hook hands its (possibly mutated) message back to the pipeline by
//! resuming its [`Next`]. The runner holds the paired [`Resume`] and waits for
//! it alongside the hook's own future, so a hook may resume synchronously,
//! after an `.await`, or from a task it spawned.
//!
//! [`Next::resume`] consumes the continuation, so resuming twice does not
//! compile. Callback-style APIs that need a cloneable handle can convert it
//! with [`Next::shared`]; every extra call on a [`SharedNext`] is counted and
//! reported by the runner as a contract violation. The runner only moves on
//! once every handle is gone, so a late second call is never missed.

use crate::message::Message;
use futures::channel::oneshot;
use std::{
    fmt,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};

struct Slot {
    sender: Mutex<Option<oneshot::Sender<Message>>>,
    calls: Arc<AtomicUsize>,
    // Dropped with the last handle, which wakes `Resume::released`.
    _release: oneshot::Sender<()>,
}

impl Slot {
    fn resume(&self, message: Message) {
        let calls = self.calls.fetch_add(1, Ordering::AcqRel) + 1;
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match sender {
            Some(sender) => {
                if sender.send(message).is_err() {
                    tracing::debug!("continuation resumed after its pipeline run was abandoned");
                }
            }
            None => {
                tracing::error!(
                    calls,
                    channel = %message.channel(),
                    "continuation resumed more than once, message discarded"
                );
            }
        }
    }
}

/// Create a continuation and the handle the runner waits on.
pub fn continuation() -> (Next, Resume) {
    let (sender, receiver) = oneshot::channel();
    let (release, released) = oneshot::channel();
    let calls = Arc::new(AtomicUsize::new(0));
    let next = Next {
        slot: Arc::new(Slot {
            sender: Mutex::new(Some(sender)),
            calls: Arc::clone(&calls),
            _release: release,
        }),
    };
    (
        next,
        Resume {
            receiver,
            released,
            calls,
        },
    )
}

/// The single-use continuation handed to every hook.
///
/// Dropping it without calling [`resume`](Next::resume) fails the pipeline
/// run.
pub struct Next {
    slot: Arc<Slot>,
}

impl Next {
    /// Pass the message on to the next hook.
    pub fn resume(self, message: Message) {
        self.slot.resume(message);
    }

    /// Convert into a cloneable handle for callback-style APIs.
    pub fn shared(self) -> SharedNext {
        SharedNext { slot: self.slot }
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("calls", &self.slot.calls.load(Ordering::Acquire))
            .finish()
    }
}

/// A cloneable continuation.
///
/// Only the first [`resume`](SharedNext::resume) reaches the pipeline.
/// Later calls are discarded and fail the run with
/// [`PipelineError::ContinuationReused`](crate::PipelineError::ContinuationReused).
#[derive(Clone)]
pub struct SharedNext {
    slot: Arc<Slot>,
}

impl SharedNext {
    /// Pass the message on to the next hook.
    pub fn resume(&self, message: Message) {
        self.slot.resume(message);
    }
}

impl fmt::Debug for SharedNext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedNext")
            .field("calls", &self.slot.calls.load(Ordering::Acquire))
            .finish()
    }
}

/// The runner's end of a continuation.
pub struct Resume {
    receiver: oneshot::Receiver<Message>,
    released: oneshot::Receiver<()>,
    calls: Arc<AtomicUsize>,
}

impl Resume {
    /// Wait for the hook to resume.
    ///
    /// Returns `None` once every handle to the continuation was dropped
    /// without resuming.
    pub async fn recv(&mut self) -> Option<Message> {
        (&mut self.receiver).await.ok()
    }

    /// Wait until every [`Next`] and [`SharedNext`] handle has been dropped.
    ///
    /// After this returns, [`calls`](Self::calls) is final. A handle that is
    /// kept alive forever keeps this pending.
    pub async fn released(&mut self) {
        let _ = (&mut self.released).await;
    }

    /// How many times the continuation has been resumed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Acquire)
    }
}

impl fmt::Debug for Resume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resume").field("calls", &self.calls()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resume_delivers_message() {
        let (next, mut resume) = continuation();
        next.resume(Message::new("/a"));

        let message = resume.recv().await.unwrap();
        assert_eq!(message.channel(), "/a");
        assert_eq!(resume.calls(), 1);
    }

    #[tokio::test]
    async fn test_dropped_continuation() {
        let (next, mut resume) = continuation();
        drop(next);

        assert!(resume.recv().await.is_none());
        assert_eq!(resume.calls(), 0);
    }

    #[tokio::test]
    async fn test_resume_from_spawned_task() {
        let (next, mut resume) = continuation();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            next.resume(Message::new("/later"));
        });

        let message = resume.recv().await.unwrap();
        assert_eq!(message.channel(), "/later");
    }

    #[tokio::test]
    async fn test_shared_counts_every_call() {
        let (next, mut resume) = continuation();
        let shared = next.shared();
        let again = shared.clone();

        shared.resume(Message::new("/first"));
        again.resume(Message::new("/second"));

        assert_eq!(resume.recv().await.unwrap().channel(), "/first");
        assert_eq!(resume.calls(), 2);
    }

    #[tokio::test]
    async fn test_released_waits_for_late_resume() {
        let (next, mut resume) = continuation();
        let shared = next.shared();
        let task = shared.clone();
        drop(shared);
        tokio::spawn(async move {
            task.resume(Message::new("/first"));
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            task.resume(Message::new("/second"));
        });

        assert_eq!(resume.recv().await.unwrap().channel(), "/first");
        resume.released().await;
        assert_eq!(resume.calls(), 2);
    }

    #[tokio::test]
    async fn test_released_after_single_resume() {
        let (next, mut resume) = continuation();
        next.resume(Message::new("/a"));

        resume.released().await;
        assert_eq!(resume.calls(), 1);
    }

    #[tokio::test]
    async fn test_all_shared_handles_dropped() {
        let (next, mut resume) = continuation();
        let shared = next.shared();
        let clone = shared.clone();
        drop(shared);
        drop(clone);

        assert!(resume.recv().await.is_none());
    }
}
