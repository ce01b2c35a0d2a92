//! # conduit-core
//!
//! Core traits and the message model for the Conduit extension pipeline.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! extensions that don't need the pipeline engine in `conduit-std`.
//!
//! # Building Blocks
//!
//! ## Message ([`Message`])
//!
//! The unit of data flowing through the bus. A message carries a channel, an
//! opaque JSON payload, an extensible metadata bag ([`Ext`]) and an optional
//! in-band [`MessageError`]. Once an error is set the message must not be
//! routed any further.
//!
//! ## Extension ([`Extension`])
//!
//! A unit of policy with two optional hooks: `incoming` runs on messages
//! arriving from a client before routing, `outgoing` runs on messages about to
//! be delivered to a client. Which hooks exist is declared through [`Hooks`].
//!
//! ## Continuation ([`Next`])
//!
//! Every hook receives a single-use continuation and must resume it exactly
//! once, either synchronously or after asynchronous work. The pipeline runner
//! waits on the paired [`Resume`] handle.
//!
//! ## Request Context ([`RequestContext`])
//!
//! Opaque, transport-supplied data (session, cookies, ...) handed to
//! `incoming` hooks only. It is borrowed for a single hook invocation.
//!
//! # Error Types
//!
//! - [`ConduitError`] - Top-level error type
//! - [`PipelineError`] - Hook contract violations and run faults
//! - [`MessageError`] - In-band policy rejection carried on a message

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod context;
mod error;
mod ext;
mod extension;
mod message;
mod next;
mod session;

// Re-exports
pub use context::RequestContext;
pub use error::{
    BoxError, ChannelError, ConduitError, ConfigError, ContextError, MessageErrorParse,
    PipelineError,
};
pub use ext::{Ext, ExtKey};
pub use extension::{Direction, DynExtension, Extension, Hooks};
pub use message::{Message, MessageError};
pub use next::{Next, Resume, SharedNext, continuation};
pub use session::{SessionProvider, SessionToken};
