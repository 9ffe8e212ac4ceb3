//! # Event Context
//!
//! A short-lived value created once per triggering occurrence. It carries the
//! hook being run, the payload that triggered it, and (between `prepare` and
//! `close`) the session the hook asked for.
//!
//! # Protocol
//!
//! ```text
//! Unprepared --prepare()--> Prepared --close()--> Closed
//! ```
//!
//! Every other transition is a [`ConfigurationError`]. A context is never
//! reused: once closed it is discarded.
//!
//! # Thread affinity
//!
//! A bound [`Session`] is not `Send`, so the compiler keeps a prepared context
//! on the thread that prepared it. Both `prepare` and `close` therefore run on
//! the thread executing the hook body, whether that is the event loop or an
//! offload worker.

use crate::{
    error::{ConfigurationError, ContextError},
    event::{EventType, Server, TextMessage},
    hook::{HookArg, HookDescriptor, HookEntry},
    session::{Session, SessionFactory},
    transport::ReplySink,
};
use std::{fmt, sync::Arc};

/// Where an [`EventContext`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// Constructed, resources not yet bound.
    Unprepared,
    /// Resources bound, hook may run.
    Prepared,
    /// Resources released; the context is spent.
    Closed,
}

impl fmt::Display for ContextState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ContextState::Unprepared => "unprepared",
            ContextState::Prepared => "prepared",
            ContextState::Closed => "closed",
        })
    }
}

/// The data that triggered a hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPayload {
    /// A command parsed out of a chat message.
    Command {
        /// The command name, without prefix.
        command: String,
        /// Everything after the command name.
        text: String,
        /// The originating message.
        message: TextMessage,
    },
    /// The readiness round.
    Ready {
        /// Servers known at readiness.
        servers: Vec<Server>,
    },
    /// A timer tick.
    Timer {
        /// 1-based tick counter.
        tick: u64,
    },
}

impl EventPayload {
    /// The event type this payload belongs to.
    pub fn kind(&self) -> EventType {
        match self {
            EventPayload::Command { .. } => EventType::Message,
            EventPayload::Ready { .. } => EventType::Ready,
            EventPayload::Timer { .. } => EventType::Timer,
        }
    }
}

/// Per-invocation scope for a hook.
pub struct EventContext {
    hook: Option<Arc<HookEntry>>,
    payload: EventPayload,
    sessions: Arc<dyn SessionFactory>,
    sink: Option<Arc<dyn ReplySink>>,
    session: Option<Box<dyn Session>>,
    state: ContextState,
}

impl EventContext {
    /// Create a context for `hook`.
    pub fn new(
        hook: Arc<HookEntry>,
        payload: EventPayload,
        sessions: Arc<dyn SessionFactory>,
    ) -> Self {
        let mut ctx = Self::unbound(payload, sessions);
        ctx.hook = Some(hook);
        ctx
    }

    /// Create a context with no hook bound yet.
    ///
    /// `prepare` and `close` fail until [`bind`](Self::bind) is called.
    pub fn unbound(payload: EventPayload, sessions: Arc<dyn SessionFactory>) -> Self {
        Self {
            hook: None,
            payload,
            sessions,
            sink: None,
            session: None,
            state: ContextState::Unprepared,
        }
    }

    /// Bind a hook to an unprepared context.
    pub fn bind(&mut self, hook: Arc<HookEntry>) -> Result<(), ConfigurationError> {
        if self.state != ContextState::Unprepared {
            return Err(ConfigurationError::InvalidContextState {
                action: "bind",
                state: self.state,
            });
        }
        self.hook = Some(hook);
        Ok(())
    }

    /// Attach the reply side-channel.
    pub fn with_reply_sink(mut self, sink: Arc<dyn ReplySink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Bind the resources the hook declared.
    ///
    /// Opens a session on the current thread if the hook requires
    /// [`HookArg::Db`].
    pub fn prepare(&mut self) -> Result<(), ContextError> {
        let hook = self.hook.as_ref().ok_or(ConfigurationError::MissingHook)?;
        if self.state != ContextState::Unprepared {
            return Err(ConfigurationError::InvalidContextState {
                action: "prepare",
                state: self.state,
            }
            .into());
        }

        if hook.descriptor().needs(HookArg::Db) {
            tracing::debug!(hook = hook.name(), "opening session");
            let session = self.sessions.open().map_err(ContextError::Session)?;
            self.session = Some(session);
        }

        self.state = ContextState::Prepared;
        Ok(())
    }

    /// Release the resources bound by [`prepare`](Self::prepare).
    ///
    /// Closing twice, or closing a context that was never prepared, is an
    /// error.
    pub fn close(&mut self) -> Result<(), ContextError> {
        let hook = self.hook.as_ref().ok_or(ConfigurationError::MissingHook)?;
        if self.state != ContextState::Prepared {
            return Err(ConfigurationError::InvalidContextState {
                action: "close",
                state: self.state,
            }
            .into());
        }

        self.state = ContextState::Closed;
        if let Some(session) = self.session.take() {
            tracing::debug!(hook = hook.name(), "closing session");
            session.close().map_err(ContextError::Session)?;
        }
        Ok(())
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ContextState {
        self.state
    }

    /// Descriptor of the bound hook.
    pub fn hook(&self) -> Option<&HookDescriptor> {
        self.hook.as_deref().map(HookEntry::descriptor)
    }

    /// The triggering payload.
    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }

    /// The command text, or `""` for lifecycle events.
    pub fn text(&self) -> &str {
        match &self.payload {
            EventPayload::Command { text, .. } => text,
            _ => "",
        }
    }

    /// The command name that triggered the hook.
    pub fn command(&self) -> Option<&str> {
        match &self.payload {
            EventPayload::Command { command, .. } => Some(command),
            _ => None,
        }
    }

    /// The originating message, for command events.
    pub fn message(&self) -> Option<&TextMessage> {
        match &self.payload {
            EventPayload::Command { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Servers known at readiness, for ready events.
    pub fn servers(&self) -> &[Server] {
        match &self.payload {
            EventPayload::Ready { servers } => servers,
            _ => &[],
        }
    }

    /// The tick counter, for timer events.
    pub fn tick(&self) -> Option<u64> {
        match self.payload {
            EventPayload::Timer { tick } => Some(tick),
            _ => None,
        }
    }

    /// Whether a session is currently bound.
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// The bound session, downcast to its concrete type.
    ///
    /// Returns `None` when no session is bound or it is of another type.
    pub fn session<T: Session>(&mut self) -> Option<&mut T> {
        self.session
            .as_mut()
            .and_then(|s| s.as_any_mut().downcast_mut::<T>())
    }

    /// Send `text` to the channel the triggering message came from.
    pub fn reply(&self, text: &str) -> Result<(), ContextError> {
        let message = self
            .message()
            .ok_or(ContextError::NoReplyTarget("event has no originating channel"))?;
        let sink = self
            .sink
            .as_ref()
            .ok_or(ContextError::NoReplyTarget("no reply sink attached"))?;
        sink.send_message(&message.channel_id, text)?;
        Ok(())
    }
}

impl Drop for EventContext {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            let hook = self.hook.as_deref().map(HookEntry::name).unwrap_or("<unbound>");
            tracing::warn!(hook, "event context dropped with a bound session, releasing it");
            if let Err(e) = session.close() {
                tracing::error!(hook, error = %e, "failed to release session");
            }
        }
    }
}

impl fmt::Debug for EventContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventContext")
            .field("hook", &self.hook.as_deref().map(HookEntry::name))
            .field("payload", &self.payload)
            .field("state", &self.state)
            .field("has_session", &self.session.is_some())
            .finish()
    }
}
