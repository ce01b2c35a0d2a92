//! The run state machine.
//!
//! A run walks a snapshot of the chain one hook at a time. For every hook it
//! creates a fresh continuation, drives the hook's future and the
//! continuation together, waits for every continuation handle to be
//! released, and only then moves on with the resumed message.

use super::config::ErrorPolicy;
use conduit_core::{
    Direction, DynExtension, Message, PipelineError, RequestContext, continuation,
};
use futures::FutureExt;
use std::{any::Any, panic::AssertUnwindSafe, sync::Arc};

/// Direction of a run, with the request context for incoming runs.
#[derive(Clone, Copy)]
pub(super) enum Leg<'a> {
    Incoming(&'a RequestContext),
    Outgoing,
}

impl Leg<'_> {
    pub(super) fn direction(&self) -> Direction {
        match self {
            Leg::Incoming(_) => Direction::Incoming,
            Leg::Outgoing => Direction::Outgoing,
        }
    }
}

pub(super) struct Run<'a> {
    chain: Vec<Arc<dyn DynExtension>>,
    leg: Leg<'a>,
    policy: ErrorPolicy,
}

impl<'a> Run<'a> {
    pub(super) fn new(chain: Vec<Arc<dyn DynExtension>>, leg: Leg<'a>, policy: ErrorPolicy) -> Self {
        Self { chain, leg, policy }
    }

    pub(super) async fn execute(self, mut message: Message) -> Result<Message, PipelineError> {
        let total = self.chain.len();

        for (position, extension) in self.chain.iter().enumerate() {
            if message.is_rejected() && self.policy == ErrorPolicy::ShortCircuit {
                tracing::debug!(skipped = total - position, "message rejected, skipping remaining hooks");
                break;
            }

            let was_rejected = message.is_rejected();
            message = self.step(extension.as_ref(), message).await?;

            match (was_rejected, message.error()) {
                (false, Some(error)) => {
                    tracing::debug!(extension = extension.name_dyn(), %error, "message rejected");
                }
                (true, None) => {
                    tracing::warn!(extension = extension.name_dyn(), "hook cleared message error");
                }
                _ => {}
            }
        }

        Ok(message)
    }

    async fn step(
        &self,
        extension: &dyn DynExtension,
        message: Message,
    ) -> Result<Message, PipelineError> {
        let direction = self.leg.direction();
        let channel = message.channel().to_owned();
        let id = message.id().map(str::to_owned);

        let (next, mut resume) = continuation();
        let hook = match self.leg {
            Leg::Incoming(context) => extension.incoming_dyn(message, context, next),
            Leg::Outgoing => extension.outgoing_dyn(message, next),
        };

        let (outcome, resumed) =
            futures::join!(AssertUnwindSafe(hook).catch_unwind(), resume.recv());

        if let Err(payload) = outcome {
            return Err(PipelineError::HookPanicked {
                extension: extension.name_dyn().to_owned(),
                direction,
                message: panic_message(payload.as_ref()),
            });
        }

        let Some(resumed) = resumed else {
            return Err(PipelineError::ContinuationDropped {
                extension: extension.name_dyn().to_owned(),
                direction,
            });
        };

        // Handles moved into spawned tasks may still resume a second time.
        resume.released().await;

        let calls = resume.calls();
        if calls > 1 {
            return Err(PipelineError::ContinuationReused {
                extension: extension.name_dyn().to_owned(),
                direction,
                calls,
            });
        }

        if resumed.channel() != channel || resumed.id() != id.as_deref() {
            return Err(PipelineError::MessageSwapped {
                extension: extension.name_dyn().to_owned(),
                direction,
                expected: channel,
                found: resumed.channel().to_owned(),
            });
        }

        Ok(resumed)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
