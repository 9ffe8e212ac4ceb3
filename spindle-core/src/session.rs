//! Thread-affine resources bound around a hook invocation.
//!
//! A [`SessionFactory`] is shared by every invocation and must be thread-safe.
//! The [`Session`] it opens is not: it is neither `Send` nor `Sync`, so an
//! [`EventContext`](crate::EventContext) holding one cannot leave the thread
//! that prepared it.

use crate::error::BoxError;
use std::any::Any;

/// A resource opened for a single hook invocation.
pub trait Session: Any {
    /// Release the session. Called on the thread that opened it.
    fn close(self: Box<Self>) -> Result<(), BoxError>;

    /// Access the concrete session for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Opens sessions for hooks that declare [`HookArg::Db`](crate::HookArg::Db).
pub trait SessionFactory: Send + Sync + 'static {
    /// Open a session on the calling thread.
    fn open(&self) -> Result<Box<dyn Session>, BoxError>;
}

/// A factory for workers without a database.
///
/// Opening a session always fails, so a hook that requires one fails at
/// `prepare` instead of running without it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSessions;

impl SessionFactory for NoSessions {
    fn open(&self) -> Result<Box<dyn Session>, BoxError> {
        Err("no session factory is configured".into())
    }
}
