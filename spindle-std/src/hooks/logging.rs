//! Logging hook for lifecycle observation.

use spindle_core::{BoxError, EventContext, EventPayload, EventType, Hook, HookDescriptor};

/// A lifecycle hook that logs each round it is part of.
pub struct LoggingHook;

impl LoggingHook {
    /// Descriptor for observing `kind`.
    pub fn descriptor(kind: EventType) -> HookDescriptor {
        HookDescriptor::event(format!("log_{kind}"), kind)
    }
}

impl Hook for LoggingHook {
    fn call(&self, ctx: &mut EventContext) -> Result<(), BoxError> {
        match ctx.payload() {
            EventPayload::Ready { servers } => {
                tracing::info!(servers = servers.len(), "worker ready");
            }
            EventPayload::Timer { tick } => {
                tracing::trace!(tick, "timer tick");
            }
            EventPayload::Command { command, .. } => {
                tracing::debug!(command = %command, "command received");
            }
        }
        Ok(())
    }
}
