//! Extensions built from synchronous closures.

use conduit_core::{Extension, Hooks, Message, Next, RequestContext};

/// An incoming-only extension wrapping a closure. See [`incoming_fn`].
pub struct IncomingFn<F> {
    f: F,
    name: &'static str,
}

/// Wrap a closure that inspects or edits incoming messages.
///
/// The closure runs synchronously and the message is resumed right after.
///
/// ```rust
/// use conduit_core::MessageError;
/// use conduit_std::incoming_fn;
///
/// let read_only = incoming_fn(|message, _context| {
///     if message.channel().starts_with("/announcements/") {
///         message.set_error(MessageError::new(403, "Read-only channel"));
///     }
/// })
/// .named("read_only");
/// # let _ = read_only;
/// ```
pub fn incoming_fn<F>(f: F) -> IncomingFn<F>
where
    F: Fn(&mut Message, &RequestContext) + Send + Sync + 'static,
{
    IncomingFn {
        f,
        name: "incoming_fn",
    }
}

impl<F> IncomingFn<F> {
    /// Name used in logs and errors.
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }
}

impl<F> Extension for IncomingFn<F>
where
    F: Fn(&mut Message, &RequestContext) + Send + Sync + 'static,
{
    fn hooks(&self) -> Hooks {
        Hooks::INCOMING
    }

    fn name(&self) -> &str {
        self.name
    }

    async fn incoming(&self, mut message: Message, context: &RequestContext, next: Next) {
        (self.f)(&mut message, context);
        next.resume(message);
    }
}

/// An outgoing-only extension wrapping a closure. See [`outgoing_fn`].
pub struct OutgoingFn<F> {
    f: F,
    name: &'static str,
}

/// Wrap a closure that edits outgoing messages.
pub fn outgoing_fn<F>(f: F) -> OutgoingFn<F>
where
    F: Fn(&mut Message) + Send + Sync + 'static,
{
    OutgoingFn {
        f,
        name: "outgoing_fn",
    }
}

impl<F> OutgoingFn<F> {
    /// Name used in logs and errors.
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }
}

impl<F> Extension for OutgoingFn<F>
where
    F: Fn(&mut Message) + Send + Sync + 'static,
{
    fn hooks(&self) -> Hooks {
        Hooks::OUTGOING
    }

    fn name(&self) -> &str {
        self.name
    }

    async fn outgoing(&self, mut message: Message, next: Next) {
        (self.f)(&mut message);
        next.resume(message);
    }
}
