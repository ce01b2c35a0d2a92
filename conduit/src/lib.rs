//! # conduit - Extension Pipeline for Publish/Subscribe Servers
//!
//! `conduit` runs cross-cutting message policy (CSRF protection, auth,
//! logging, rewriting) as an ordered list of extensions on every message
//! entering or leaving a bus.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use conduit::prelude::*;
//!
//! let pipeline = Pipeline::builder()
//!     .extension(CsrfProtection::new(ContextSession))
//!     .extension(MessageLogger)
//!     .build();
//!
//! // Per request, the transport fills in the context.
//! let context = RequestContext::new().with(SessionToken::new(session.csrf_token()));
//!
//! match pipeline.admit(message, &context).await? {
//!     Admission::Deliver(message) => router.publish(message).await,
//!     Admission::Reject { reply, .. } => transport.reply(reply).await,
//! }
//! ```
//!
//! ## Writing an extension
//!
//! ```rust
//! use conduit::{Extension, Hooks, Message, MessageError, Next, RequestContext};
//!
//! struct RequireClientId;
//!
//! impl Extension for RequireClientId {
//!     fn hooks(&self) -> Hooks {
//!         Hooks::INCOMING
//!     }
//!
//!     async fn incoming(&self, mut message: Message, _context: &RequestContext, next: Next) {
//!         if !message.is_meta() && message.client_id().is_none() {
//!             message.set_error(MessageError::new(402, "Unknown client"));
//!         }
//!         next.resume(message);
//!     }
//! }
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use conduit_core::{
    // Errors
    BoxError,
    ChannelError,
    ConduitError,
    ConfigError,
    ContextError,
    // Extension
    Direction,
    DynExtension,
    // Message
    Ext,
    ExtKey,
    Extension,
    Hooks,
    Message,
    MessageError,
    MessageErrorParse,
    // Continuation
    Next,
    PipelineError,
    // Context
    RequestContext,
    Resume,
    SessionProvider,
    SessionToken,
    SharedNext,
    continuation,
};

// Pipeline
pub use conduit_std::pipeline::{
    Admission, ErrorPolicy, ExtensionId, HookOrder, Pipeline, PipelineBuilder, PipelineConfig,
};

pub use conduit_std::channel::ChannelPattern;

/// Standard extension implementations.
pub mod extensions {
    pub use conduit_std::extensions::{
        ContextSession, CsrfProtection, CsrfTokenAttacher, IncomingFn, MessageLogger, OutgoingFn,
        SessionFn, TokenFn, TokenSource, incoming_fn, outgoing_fn, session_fn, tokens_match,
    };
}

/// Testing utilities.
pub mod testing {
    pub use conduit_std::testing::{CountingExtension, RecordingExtension};
}

/// Prelude module - common imports for Conduit.
///
/// # Usage
///
/// ```rust,ignore
/// use conduit::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Admission,
        // Channels
        ChannelPattern,
        Extension,
        Hooks,
        Message,
        MessageError,
        Next,
        Pipeline,
        PipelineConfig,
        PipelineError,
        RequestContext,
        SessionProvider,
        SessionToken,
        extensions::{ContextSession, CsrfProtection, CsrfTokenAttacher, MessageLogger},
    };
}
