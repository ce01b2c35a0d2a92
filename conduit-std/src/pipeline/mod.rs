//! # Extension Pipeline
//!
//! An ordered, mutable list of extensions run for every message crossing
//! the bus boundary.
//!
//! - Incoming hooks run in registration order, then the message goes to the
//!   router.
//! - Outgoing hooks run in registration order (or reverse, see
//!   [`HookOrder`]) before the transport delivers the message.
//!
//! Hooks run strictly one after another for a given message; different
//! messages may be processed concurrently. Each run works on a snapshot of
//! the registration list, so adding or removing an extension never affects a
//! run already in flight.
//!
//! # Example
//!
//! ```rust,ignore
//! let pipeline = Pipeline::builder()
//!     .extension(MessageLogger)
//!     .extension(CsrfProtection::new(ContextSession))
//!     .build();
//!
//! match pipeline.admit(message, &context).await? {
//!     Admission::Deliver(message) => router.publish(message).await,
//!     Admission::Reject { reply, .. } => transport.send(reply).await,
//! }
//! ```

mod admission;
mod config;
mod runner;

pub use admission::Admission;
pub use config::{ErrorPolicy, HookOrder, PipelineConfig};

use conduit_core::{
    Direction, DynExtension, Extension, Message, PipelineError, RequestContext,
};
use runner::{Leg, Run};
use std::{
    fmt,
    sync::{
        Arc, PoisonError, RwLock,
        atomic::{AtomicU64, Ordering},
    },
};
use tracing::Instrument;

/// Handle to a registered extension, used to remove it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExtensionId(u64);

struct Entry {
    id: ExtensionId,
    extension: Arc<dyn DynExtension>,
}

/// The extension pipeline owned by a bus instance.
pub struct Pipeline {
    entries: RwLock<Vec<Entry>>,
    next_id: AtomicU64,
    config: PipelineConfig,
}

impl Pipeline {
    /// Create an empty pipeline with default settings.
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    /// Create an empty pipeline.
    pub fn with_config(config: PipelineConfig) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(0),
            config,
        }
    }

    /// Start a builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// The active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Append an extension. Registration order is execution order.
    pub fn add_extension<X: Extension>(&self, extension: X) -> ExtensionId {
        self.add_shared(Arc::new(extension))
    }

    /// Append an already shared extension.
    pub fn add_shared(&self, extension: Arc<dyn DynExtension>) -> ExtensionId {
        let id = ExtensionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(extension = extension.name_dyn(), hooks = ?extension.hooks_dyn(), "extension added");
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Entry { id, extension });
        id
    }

    /// Remove an extension. Returns `false` if it was not registered.
    pub fn remove_extension(&self, id: ExtensionId) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.iter().position(|entry| entry.id == id) {
            Some(index) => {
                let entry = entries.remove(index);
                tracing::debug!(extension = entry.extension.name_dyn(), "extension removed");
                true
            }
            None => false,
        }
    }

    /// Number of registered extensions.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether no extension is registered.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Names of registered extensions, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.read()
            .iter()
            .map(|entry| entry.extension.name_dyn().to_owned())
            .collect()
    }

    /// Run the incoming hooks on a message from a client.
    ///
    /// The returned message may carry an error, in which case the router
    /// must not deliver it. See [`admit`](Self::admit).
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] when a hook breaks its contract or the run
    /// exceeds the configured timeout. The timeout needs a Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when [`PipelineConfig::run_timeout`] is set and the future is
    /// not polled inside a Tokio runtime with the time driver enabled.
    pub async fn run_incoming(
        &self,
        message: Message,
        context: &RequestContext,
    ) -> Result<Message, PipelineError> {
        self.run(Leg::Incoming(context), message).await
    }

    /// Run the outgoing hooks on a message about to be delivered.
    ///
    /// # Errors
    ///
    /// Same as [`run_incoming`](Self::run_incoming).
    ///
    /// # Panics
    ///
    /// Same as [`run_incoming`](Self::run_incoming).
    pub async fn run_outgoing(&self, message: Message) -> Result<Message, PipelineError> {
        self.run(Leg::Outgoing, message).await
    }

    /// Run the incoming hooks and decide whether the message may be routed.
    ///
    /// # Errors
    ///
    /// Same as [`run_incoming`](Self::run_incoming).
    ///
    /// # Panics
    ///
    /// Same as [`run_incoming`](Self::run_incoming).
    pub async fn admit(
        &self,
        message: Message,
        context: &RequestContext,
    ) -> Result<Admission, PipelineError> {
        let message = self.run_incoming(message, context).await?;
        Ok(Admission::from(message))
    }

    async fn run(&self, leg: Leg<'_>, message: Message) -> Result<Message, PipelineError> {
        let direction = leg.direction();
        let chain = self.snapshot(direction);
        let span = tracing::debug_span!(
            "pipeline_run",
            %direction,
            channel = %message.channel(),
            hooks = chain.len()
        );

        let run = Run::new(chain, leg, self.config.on_error)
            .execute(message)
            .instrument(span.clone());

        let result = match self.config.run_timeout() {
            Some(limit) => tokio::time::timeout(limit, run)
                .await
                .unwrap_or_else(|_| Err(PipelineError::Timeout { direction, limit })),
            None => run.await,
        };

        if let Err(error) = &result {
            tracing::error!(parent: &span, %error, "pipeline run failed");
        }
        result
    }

    fn snapshot(&self, direction: Direction) -> Vec<Arc<dyn DynExtension>> {
        let mut chain: Vec<_> = self
            .read()
            .iter()
            .filter(|entry| entry.extension.hooks_dyn().contains(direction.hook()))
            .map(|entry| Arc::clone(&entry.extension))
            .collect();

        if direction == Direction::Outgoing && self.config.outgoing_order == HookOrder::Reverse {
            chain.reverse();
        }
        chain
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Entry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("extensions", &self.names())
            .field("config", &self.config)
            .finish()
    }
}

/// Builder for constructing a [`Pipeline`] at startup.
///
/// # Example
/// ```ignore
/// let pipeline = PipelineBuilder::new()
///     .config(PipelineConfig::default().with_outgoing_order(HookOrder::Reverse))
///     .extension(MessageLogger)
///     .extension(csrf)
///     .build();
/// ```
pub struct PipelineBuilder {
    config: PipelineConfig,
    extensions: Vec<Arc<dyn DynExtension>>,
}

impl PipelineBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            extensions: Vec::new(),
        }
    }

    /// Use `config` for the pipeline.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Register an extension.
    pub fn extension<X: Extension>(mut self, extension: X) -> Self {
        self.extensions.push(Arc::new(extension));
        self
    }

    /// Get the number of registered extensions.
    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    /// Check if the builder has no extensions.
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Build the pipeline.
    pub fn build(self) -> Pipeline {
        let pipeline = Pipeline::with_config(self.config);
        for extension in self.extensions {
            pipeline.add_shared(extension);
        }
        pipeline
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
