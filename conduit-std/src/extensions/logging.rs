//! Logging extension for message observation.

use conduit_core::{Direction, Extension, Hooks, Message, Next, RequestContext};

/// An extension that logs every message in both directions.
///
/// Register it last to see the decisions of the other extensions.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageLogger;

fn log(direction: Direction, message: &Message) {
    tracing::debug!(
        %direction,
        channel = %message.channel(),
        client_id = message.client_id().unwrap_or(""),
        rejected = message.is_rejected(),
        "message"
    );
}

impl Extension for MessageLogger {
    fn hooks(&self) -> Hooks {
        Hooks::all()
    }

    fn name(&self) -> &str {
        "message_logger"
    }

    async fn incoming(&self, message: Message, _context: &RequestContext, next: Next) {
        log(Direction::Incoming, &message);
        next.resume(message);
    }

    async fn outgoing(&self, message: Message, next: Next) {
        log(Direction::Outgoing, &message);
        next.resume(message);
    }
}
