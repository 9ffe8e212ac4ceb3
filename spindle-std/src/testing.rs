//! Testing utilities for spindle.
//!
//! This module provides hooks and session factories that record what
//! happened to them, so worker behavior can be asserted on.
//!
//! # Features
//!
//! - [`Recorder`]: a shared log of [`Invocation`]s
//! - [`RecordingHook`]: a hook that records every call
//! - [`FailingHook`]: a hook that records the call, then returns an error
//! - [`PanickingHook`]: a hook that panics
//! - [`CountingSessions`]: a session factory that records opens and closes

use spindle_core::{
    BoxError, EventContext, EventType, Hook, HookDescriptor, Session, SessionFactory,
};
use std::{
    any::Any,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    thread::{self, ThreadId},
    time::Duration,
};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Recorder
// ============================================================================

/// One recorded hook call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Name of the hook that ran.
    pub hook: String,
    /// The event type of the payload.
    pub kind: EventType,
    /// Command name, for command payloads.
    pub command: Option<String>,
    /// Command text, empty otherwise.
    pub text: String,
    /// Tick counter, for timer payloads.
    pub tick: Option<u64>,
    /// Thread the hook body ran on.
    pub thread: ThreadId,
    /// Whether a session was bound during the call.
    pub had_session: bool,
}

impl Invocation {
    fn capture(ctx: &EventContext) -> Self {
        Self {
            hook: ctx.hook().map(|d| d.name().to_string()).unwrap_or_default(),
            kind: ctx.payload().kind(),
            command: ctx.command().map(str::to_string),
            text: ctx.text().to_string(),
            tick: ctx.tick(),
            thread: thread::current().id(),
            had_session: ctx.has_session(),
        }
    }
}

/// A shared, ordered log of hook calls.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = Recorder::new();
/// let registry = PluginRegistry::builder()
///     .register(HookDescriptor::command("ping"), recorder.hook())
///     .build()?;
///
/// // Drive the worker...
///
/// assert_eq!(recorder.names(), vec!["ping"]);
/// ```
#[derive(Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<Invocation>>>,
}

impl Recorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// A hook recording into this log.
    pub fn hook(&self) -> RecordingHook {
        RecordingHook {
            recorder: self.clone(),
            delay: None,
        }
    }

    /// A hook recording into this log, then failing with `message`.
    pub fn failing(&self, message: &str) -> FailingHook {
        FailingHook {
            recorder: Some(self.clone()),
            message: message.to_string(),
        }
    }

    /// Get a clone of the recorded calls.
    pub fn invocations(&self) -> Vec<Invocation> {
        lock(&self.calls).clone()
    }

    /// Names of the hooks called, in order.
    pub fn names(&self) -> Vec<String> {
        lock(&self.calls).iter().map(|i| i.hook.clone()).collect()
    }

    /// Get the number of recorded calls.
    pub fn count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Clear all recorded calls.
    pub fn clear(&self) {
        lock(&self.calls).clear();
    }

    fn record(&self, ctx: &EventContext) {
        lock(&self.calls).push(Invocation::capture(ctx));
    }
}

// ============================================================================
// Hooks
// ============================================================================

/// A hook that records every call.
#[derive(Clone)]
pub struct RecordingHook {
    recorder: Recorder,
    delay: Option<Duration>,
}

impl RecordingHook {
    /// Block the calling thread for `delay` before recording.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl Hook for RecordingHook {
    fn call(&self, ctx: &mut EventContext) -> Result<(), BoxError> {
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
        self.recorder.record(ctx);
        Ok(())
    }
}

/// A hook that always fails.
pub struct FailingHook {
    recorder: Option<Recorder>,
    message: String,
}

impl FailingHook {
    /// Create a failing hook that records nothing.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            recorder: None,
            message: message.into(),
        }
    }
}

impl Hook for FailingHook {
    fn call(&self, ctx: &mut EventContext) -> Result<(), BoxError> {
        if let Some(recorder) = &self.recorder {
            recorder.record(ctx);
        }
        Err(self.message.clone().into())
    }
}

/// A hook that panics with a fixed message.
pub struct PanickingHook(pub &'static str);

impl Hook for PanickingHook {
    fn call(&self, _ctx: &mut EventContext) -> Result<(), BoxError> {
        panic!("{}", self.0)
    }
}

/// Descriptor shorthand for a command hook that needs a session.
pub fn db_command(name: &str) -> HookDescriptor {
    HookDescriptor::command(name).requires(spindle_core::HookArg::Db)
}

// ============================================================================
// Counting Sessions
// ============================================================================

/// Something that happened to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A session was opened on this thread.
    Opened(ThreadId),
    /// A session was closed on this thread.
    Closed(ThreadId),
}

/// A [`SessionFactory`] that records where sessions are opened and closed.
#[derive(Clone, Default)]
pub struct CountingSessions {
    events: Arc<Mutex<Vec<SessionEvent>>>,
    fail_open: Arc<Mutex<Option<String>>>,
}

impl CountingSessions {
    /// Create a new factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later `open` fail with `message`.
    pub fn fail_open(&self, message: impl Into<String>) {
        *lock(&self.fail_open) = Some(message.into());
    }

    /// Everything recorded so far, in order.
    pub fn events(&self) -> Vec<SessionEvent> {
        lock(&self.events).clone()
    }

    /// Number of sessions opened.
    pub fn opens(&self) -> usize {
        self.count(|e| matches!(e, SessionEvent::Opened(_)))
    }

    /// Number of sessions closed.
    pub fn closes(&self) -> usize {
        self.count(|e| matches!(e, SessionEvent::Closed(_)))
    }

    fn count(&self, f: impl Fn(&SessionEvent) -> bool) -> usize {
        lock(&self.events).iter().filter(|e| f(e)).count()
    }
}

impl SessionFactory for CountingSessions {
    fn open(&self) -> Result<Box<dyn Session>, BoxError> {
        if let Some(message) = lock(&self.fail_open).clone() {
            return Err(message.into());
        }
        lock(&self.events).push(SessionEvent::Opened(thread::current().id()));
        Ok(Box::new(CountingSession {
            events: Arc::clone(&self.events),
        }))
    }
}

/// The session handed out by [`CountingSessions`].
pub struct CountingSession {
    events: Arc<Mutex<Vec<SessionEvent>>>,
}

impl Session for CountingSession {
    fn close(self: Box<Self>) -> Result<(), BoxError> {
        lock(&self.events).push(SessionEvent::Closed(thread::current().id()));
        Ok(())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
