//! # Extensions
//!
//! An extension is a unit of message policy with up to two hooks:
//!
//! - `incoming` runs on messages arriving from a client, before routing. It
//!   also receives the transport's [`RequestContext`].
//! - `outgoing` runs on messages about to be delivered to a client.
//!
//! Each hook gets the message by value plus a [`Next`] continuation and must
//! resume it exactly once. Hooks may suspend (session lookups, remote calls)
//! without blocking other pipeline runs.

use crate::{context::RequestContext, message::Message, next::Next};
use bitflags::bitflags;
use futures::future::BoxFuture;
use std::{fmt, future::Future};

bitflags! {
    /// The hooks an extension declares.
    ///
    /// The pipeline only invokes declared hooks.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Hooks: u8 {
        /// The extension handles messages arriving from clients.
        const INCOMING = 1;
        /// The extension handles messages delivered to clients.
        const OUTGOING = 1 << 1;
    }
}

/// Which side of the bus a pipeline run serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Client to router.
    Incoming,
    /// Router to client.
    Outgoing,
}

impl Direction {
    /// The hook flag for this direction.
    pub const fn hook(self) -> Hooks {
        match self {
            Direction::Incoming => Hooks::INCOMING,
            Direction::Outgoing => Hooks::OUTGOING,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Incoming => "incoming",
            Direction::Outgoing => "outgoing",
        })
    }
}

/// A pluggable unit of message policy.
///
/// Undeclared hooks default to resuming with the message unchanged.
///
/// # Example
///
/// ```rust
/// use conduit_core::{Extension, Hooks, Message, Next};
/// use serde_json::json;
///
/// struct Stamp;
///
/// impl Extension for Stamp {
///     fn hooks(&self) -> Hooks {
///         Hooks::OUTGOING
///     }
///
///     async fn outgoing(&self, mut message: Message, next: Next) {
///         message.ext_mut().insert("server", json!("eu-1"));
///         next.resume(message);
///     }
/// }
/// ```
///
/// Native `async fn` gives static dispatch. The pipeline stores extensions
/// as [`DynExtension`] trait objects.
///
/// # Continuations
///
/// The next hook starts only after this hook's future has completed *and*
/// every handle to its [`Next`] has been dropped. Work awaited after
/// `next.resume(..)` therefore delays the rest of the pipeline; spawn it
/// instead if it should not.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an `Extension`",
    label = "missing `Extension` implementation",
    note = "Extensions must declare their hooks and implement `incoming` and/or `outgoing`."
)]
pub trait Extension: Send + Sync + 'static {
    /// The hooks this extension implements.
    fn hooks(&self) -> Hooks;

    /// Name used in logs and errors.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Called on messages arriving from a client.
    fn incoming(
        &self,
        message: Message,
        context: &RequestContext,
        next: Next,
    ) -> impl Future<Output = ()> + Send {
        let _ = context;
        async move { next.resume(message) }
    }

    /// Called on messages about to be delivered to a client.
    fn outgoing(&self, message: Message, next: Next) -> impl Future<Output = ()> + Send {
        async move { next.resume(message) }
    }
}

/// Object-safe version of [`Extension`].
pub trait DynExtension: Send + Sync + 'static {
    /// See [`Extension::hooks`].
    fn hooks_dyn(&self) -> Hooks;

    /// See [`Extension::name`].
    fn name_dyn(&self) -> &str;

    /// See [`Extension::incoming`].
    fn incoming_dyn<'a>(
        &'a self,
        message: Message,
        context: &'a RequestContext,
        next: Next,
    ) -> BoxFuture<'a, ()>;

    /// See [`Extension::outgoing`].
    fn outgoing_dyn<'a>(&'a self, message: Message, next: Next) -> BoxFuture<'a, ()>;
}

// Blanket implementation: Any type implementing Extension implements DynExtension automatically.
impl<T: Extension> DynExtension for T {
    fn hooks_dyn(&self) -> Hooks {
        self.hooks()
    }

    fn name_dyn(&self) -> &str {
        self.name()
    }

    fn incoming_dyn<'a>(
        &'a self,
        message: Message,
        context: &'a RequestContext,
        next: Next,
    ) -> BoxFuture<'a, ()> {
        Box::pin(self.incoming(message, context, next))
    }

    fn outgoing_dyn<'a>(&'a self, message: Message, next: Next) -> BoxFuture<'a, ()> {
        Box::pin(self.outgoing(message, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::next::continuation;

    struct Passive;

    impl Extension for Passive {
        fn hooks(&self) -> Hooks {
            Hooks::empty()
        }
    }

    #[tokio::test]
    async fn test_default_hooks_resume_unchanged() {
        let ext: Box<dyn DynExtension> = Box::new(Passive);
        assert!(ext.name_dyn().ends_with("Passive"));

        let (next, mut resume) = continuation();
        ext.incoming_dyn(Message::new("/in"), &RequestContext::new(), next)
            .await;
        assert_eq!(resume.recv().await.unwrap().channel(), "/in");

        let (next, mut resume) = continuation();
        ext.outgoing_dyn(Message::new("/out"), next).await;
        assert_eq!(resume.recv().await.unwrap().channel(), "/out");
    }

    #[test]
    fn test_direction_hook_flags() {
        assert_eq!(Direction::Incoming.hook(), Hooks::INCOMING);
        assert!(Hooks::all().contains(Direction::Outgoing.hook()));
        assert_eq!(Direction::Outgoing.to_string(), "outgoing");
    }
}
