//! Standard extensions.

mod attach;
mod csrf;
mod func;
mod logging;
mod session;

pub use attach::{CsrfTokenAttacher, TokenFn, TokenSource};
pub use csrf::{CsrfProtection, tokens_match};
pub use func::{IncomingFn, OutgoingFn, incoming_fn, outgoing_fn};
pub use logging::MessageLogger;
pub use session::{ContextSession, SessionFn, session_fn};
