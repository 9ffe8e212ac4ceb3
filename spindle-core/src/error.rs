//! Error types for spindle.
//!
//! The taxonomy has three families with different propagation rules:
//!
//! - [`ConfigurationError`] - programmer/setup mistakes. Always surfaced to the caller.
//! - [`HookError`] - failures inside hook bodies. Recovered at the dispatch boundary.
//! - [`TransportError`] - connection or stream failures. Fatal to the worker.
//!
//! [`SpindleError`] wraps all three for callers that want a single type.

use crate::context::ContextState;
use std::time::Duration;
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all spindle operations.
#[derive(Error, Debug)]
pub enum SpindleError {
    /// The worker or an event context was misused.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A hook failed.
    #[error("hook error: {0}")]
    Hook(#[from] HookError),

    /// The transport failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A custom error occurred.
    #[error(transparent)]
    Custom(BoxError),
}

/// Misuse of the worker, the registry or an event context.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The event context has no hook bound to it.
    #[error("event context has no bound hook")]
    MissingHook,

    /// The event context was driven out of order.
    #[error("cannot {action} an event context that is {state}")]
    InvalidContextState {
        /// The operation that was attempted.
        action: &'static str,
        /// The state the context was in.
        state: ContextState,
    },

    /// The ready transition was triggered more than once.
    #[error("worker already marked as ready")]
    AlreadyReady,

    /// Two hooks claim the same command name.
    #[error("command `{0}` is already registered")]
    DuplicateCommand(String),

    /// A lifecycle hook was declared threaded.
    #[error("lifecycle hook `{0}` cannot be threaded")]
    ThreadedLifecycleHook(String),

    /// A worker setting is out of range.
    #[error("invalid setting `{name}`: {reason}")]
    InvalidSetting {
        /// Name of the setting.
        name: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// Errors from an individual hook invocation.
#[derive(Error, Debug)]
pub enum HookError {
    /// The hook body returned an error.
    #[error("hook `{hook}` failed: {source}")]
    Failed {
        /// Name of the hook.
        hook: String,
        /// The error the hook returned.
        #[source]
        source: BoxError,
    },

    /// The hook panicked during execution.
    #[error("hook `{hook}` panicked: {message}")]
    Panic {
        /// Name of the hook.
        hook: String,
        /// The panic payload, when it was a string.
        message: String,
    },

    /// The hook's resources could not be bound or released.
    #[error("hook `{hook}` scope error: {source}")]
    Scope {
        /// Name of the hook.
        hook: String,
        /// What went wrong around the invocation.
        #[source]
        source: ContextError,
    },
}

impl HookError {
    /// Name of the hook that failed.
    pub fn hook(&self) -> &str {
        match self {
            HookError::Failed { hook, .. }
            | HookError::Panic { hook, .. }
            | HookError::Scope { hook, .. } => hook,
        }
    }
}

/// Errors from [`EventContext`](crate::EventContext) operations.
#[derive(Error, Debug)]
pub enum ContextError {
    /// The context was used in a way its protocol forbids.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The session factory could not open or close a session.
    #[error("session error: {0}")]
    Session(#[source] BoxError),

    /// The context has nowhere to send a reply.
    #[error("no reply target: {0}")]
    NoReplyTarget(&'static str),

    /// Sending a reply failed.
    #[error("reply failed: {0}")]
    Reply(#[from] TransportError),
}

/// Errors raised by a [`Transport`](crate::Transport).
#[derive(Error, Debug)]
pub enum TransportError {
    /// The endpoint could not be reached.
    #[error("failed to connect to {endpoint}: {reason}")]
    Connect {
        /// The endpoint that was dialed.
        endpoint: String,
        /// Why the connection failed.
        reason: String,
    },

    /// An operation needed a connection that was never established.
    #[error("transport is not connected")]
    NotConnected,

    /// The connection dropped while a reply was still expected.
    #[error("connection closed while waiting for {0}")]
    Closed(&'static str),

    /// A frame could not be decoded or encoded.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The request did not complete in time.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// An I/O error on the underlying stream.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// Convenience conversions
impl From<BoxError> for SpindleError {
    fn from(err: BoxError) -> Self {
        SpindleError::Custom(err)
    }
}

impl From<ContextError> for SpindleError {
    fn from(err: ContextError) -> Self {
        match err {
            ContextError::Configuration(e) => SpindleError::Configuration(e),
            ContextError::Reply(e) => SpindleError::Transport(e),
            other => SpindleError::Custom(Box::new(other)),
        }
    }
}
