//! Liveness check.

use spindle_core::{BoxError, EventContext, Hook, HookDescriptor};

/// Replies `pong` to the channel the command came from.
pub struct PingHook;

impl PingHook {
    /// Descriptor for the `ping` command.
    pub fn descriptor() -> HookDescriptor {
        HookDescriptor::command("ping").doc("Check that the worker is alive.")
    }
}

impl Hook for PingHook {
    fn call(&self, ctx: &mut EventContext) -> Result<(), BoxError> {
        ctx.reply("pong")?;
        Ok(())
    }
}
