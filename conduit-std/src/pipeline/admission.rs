//! Router-facing verdict for an incoming message.

use conduit_core::{Message, MessageError};

/// Whether a message that went through the incoming pipeline may be routed.
#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    /// No error was set; hand the message to the router.
    Deliver(Message),
    /// A hook rejected the message. Send `reply` back to the client and
    /// drop the message.
    Reject {
        /// Error reply for the client.
        reply: Message,
        /// The rejection.
        error: MessageError,
    },
}

impl Admission {
    /// Whether the message may be routed.
    pub fn is_deliver(&self) -> bool {
        matches!(self, Admission::Deliver(_))
    }

    /// The rejection, if any.
    pub fn error(&self) -> Option<&MessageError> {
        match self {
            Admission::Deliver(_) => None,
            Admission::Reject { error, .. } => Some(error),
        }
    }
}

impl From<Message> for Admission {
    fn from(message: Message) -> Self {
        match message.error().cloned() {
            None => Admission::Deliver(message),
            Some(error) => Admission::Reject {
                reply: message.reply(),
                error,
            },
        }
    }
}
