//! # spindle-core
//!
//! Core types and collaborator traits for the spindle event worker.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! plugins that only need to describe hooks, without pulling in the worker.
//!
//! # Collaborators
//!
//! The worker sits between two collaborators it only knows by contract:
//!
//! - [`Transport`] - delivers [`Event`]s and carries replies back through a
//!   [`ReplySink`]
//! - [`HookRegistry`] - maps command names and lifecycle [`EventType`]s to
//!   [`HookEntry`]s and launches them
//!
//! # Scoping
//!
//! Every hook runs inside an [`EventContext`], created by an
//! [`InvocationScope`] on the thread that executes the hook body. A context
//! binds a [`Session`] for hooks that declare [`HookArg::Db`] and releases it
//! on the same thread.
//!
//! # Error Types
//!
//! - [`SpindleError`] - Top-level error type
//! - [`ConfigurationError`] - Misuse; always propagated
//! - [`HookError`] - Hook failures; isolated per invocation
//! - [`TransportError`] - Connection failures; fatal

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod context;
mod error;
mod event;
mod hook;
mod registry;
mod scope;
mod session;
mod transport;

// Re-exports
pub use context::{ContextState, EventContext, EventPayload};
pub use error::{
    BoxError, ConfigurationError, ContextError, HookError, SpindleError, TransportError,
};
pub use event::{Event, EventType, Server, TextMessage};
pub use hook::{Hook, HookArg, HookDescriptor, HookEntry, Trigger};
pub use registry::{CommandTable, HookRegistry, RoundReport};
pub use scope::InvocationScope;
pub use session::{NoSessions, Session, SessionFactory};
pub use transport::{ReplySink, Transport};
