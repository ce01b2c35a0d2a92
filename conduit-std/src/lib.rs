//! # conduit-std
//!
//! Pipeline engine and standard extensions for Conduit.
//!
//! This crate provides:
//! - **Pipeline**: [`Pipeline`], [`PipelineBuilder`], [`PipelineConfig`], [`Admission`]
//! - **CSRF**: [`CsrfProtection`] (incoming check) and [`CsrfTokenAttacher`] (outgoing attach)
//! - **Sessions**: [`ContextSession`], [`session_fn`]
//! - **Standard extensions**: [`MessageLogger`], [`incoming_fn`], [`outgoing_fn`]
//! - **Channels**: [`ChannelPattern`] globs
//! - **Testing**: recording and counting extensions

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use conduit_core;

// Modules
pub mod channel;
pub mod extensions;
pub mod pipeline;
pub mod testing;

pub use channel::ChannelPattern;
pub use extensions::{
    ContextSession, CsrfProtection, CsrfTokenAttacher, IncomingFn, MessageLogger, OutgoingFn,
    SessionFn, TokenFn, TokenSource, incoming_fn, outgoing_fn, session_fn, tokens_match,
};
pub use pipeline::{
    Admission, ErrorPolicy, ExtensionId, HookOrder, Pipeline, PipelineBuilder, PipelineConfig,
};
