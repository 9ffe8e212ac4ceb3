//! Scoped hook invocation.
//!
//! [`InvocationScope::invoke`] is the single place where a hook runs: it builds
//! the [`EventContext`], prepares it, calls the registry, and closes it, all on
//! the calling thread. A panic anywhere in that sequence, session handling
//! included, is caught here and reported as [`HookError::Panic`].

use crate::{
    context::{EventContext, EventPayload},
    error::HookError,
    hook::HookEntry,
    registry::HookRegistry,
    session::{NoSessions, SessionFactory},
    transport::ReplySink,
};
use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

/// Everything needed to scope a hook invocation. Cheap to clone and `Send`,
/// so it can be moved into offload workers.
#[derive(Clone)]
pub struct InvocationScope {
    sessions: Arc<dyn SessionFactory>,
    sink: Option<Arc<dyn ReplySink>>,
}

impl InvocationScope {
    /// Create a scope that opens sessions from `sessions`.
    pub fn new(sessions: Arc<dyn SessionFactory>) -> Self {
        Self {
            sessions,
            sink: None,
        }
    }

    /// Attach the reply side-channel handed to every context.
    pub fn with_reply_sink(mut self, sink: Arc<dyn ReplySink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Build an unprepared context for `hook`.
    pub fn context(&self, hook: Arc<HookEntry>, payload: EventPayload) -> EventContext {
        let ctx = EventContext::new(hook, payload, Arc::clone(&self.sessions));
        match &self.sink {
            Some(sink) => ctx.with_reply_sink(Arc::clone(sink)),
            None => ctx,
        }
    }

    /// Run `hook` with its resources bound, on the current thread.
    ///
    /// Errors from the body take precedence over errors releasing the
    /// session; the latter are still logged.
    pub fn invoke<R>(
        &self,
        registry: &R,
        hook: &Arc<HookEntry>,
        payload: EventPayload,
    ) -> Result<(), HookError>
    where
        R: HookRegistry + ?Sized,
    {
        let name = hook.name().to_string();
        let mut ctx = self.context(Arc::clone(hook), payload);

        unwind_guard(&name, || ctx.prepare())?.map_err(|source| HookError::Scope {
            hook: name.clone(),
            source,
        })?;

        let result = match unwind_guard(&name, || registry.launch_command(hook, &mut ctx)) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(source)) => Err(HookError::Failed {
                hook: name.clone(),
                source,
            }),
            Err(panicked) => Err(panicked),
        };
        let closed = match unwind_guard(&name, || ctx.close()) {
            Ok(closed) => closed.map_err(|source| HookError::Scope {
                hook: name.clone(),
                source,
            }),
            Err(panicked) => Err(panicked),
        };

        match (result, closed) {
            (Ok(()), closed) => closed,
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(close_err)) => {
                tracing::error!(hook = %name, error = %close_err, "failed to release hook scope");
                Err(e)
            }
        }
    }
}

impl Default for InvocationScope {
    fn default() -> Self {
        Self::new(Arc::new(NoSessions))
    }
}

/// Run `f`, turning a panic into [`HookError::Panic`] for `hook`.
fn unwind_guard<T>(hook: &str, f: impl FnOnce() -> T) -> Result<T, HookError> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| HookError::Panic {
        hook: hook.to_string(),
        message: panic_message(payload.as_ref()),
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
