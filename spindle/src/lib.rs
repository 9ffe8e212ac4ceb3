//! # spindle - a single-loop event worker
//!
//! `spindle` connects to a remote command source, publishes the commands it
//! knows, and dispatches what arrives:
//!
//! - **Commands** parsed out of chat messages run their hook off the loop on
//!   a bounded pool, so a slow hook never delays intake.
//! - **Ready** runs once. Ready hooks run inline, in registration order, and
//!   only then is the timer armed.
//! - **Timer** rounds run inline, in registration order, one interval after
//!   the previous round finished.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use spindle::{HookDescriptor, PluginRegistry, Worker, WorkerSettings};
//! use spindle::std::{hooks::PingHook, transport::TcpTransport};
//!
//! let registry = PluginRegistry::builder()
//!     .register(PingHook::descriptor(), PingHook)
//!     .with_help("help")
//!     .build()?;
//!
//! let mut worker = Worker::new(
//!     TcpTransport::new("127.0.0.1:7000", "spindle"),
//!     registry,
//!     WorkerSettings::default(),
//! )?;
//! worker.connect().await?;
//! worker.run().await?;
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub mod command;
pub mod config;
pub mod orchestrator;

pub use spindle_core::{
    // Error types
    BoxError,
    // Hooks
    CommandTable,
    ConfigurationError,
    ContextError,
    // Context
    ContextState,
    // Events
    Event,
    EventContext,
    EventPayload,
    EventType,
    Hook,
    HookArg,
    HookDescriptor,
    HookEntry,
    HookError,
    HookRegistry,
    InvocationScope,
    NoSessions,
    ReplySink,
    RoundReport,
    Server,
    // Sessions
    Session,
    SessionFactory,
    SpindleError,
    TextMessage,
    // Transport
    Transport,
    TransportError,
    Trigger,
};

pub use spindle_std::registry::{PluginRegistry, PluginRegistryBuilder};

/// Standard implementations.
pub mod std {
    pub use spindle_std::{hooks, registry, storage, testing, transport};

    #[cfg(feature = "sqlite")]
    pub use spindle_std::sqlite;
}

pub use command::{ParsedCommand, parse_command};
pub use config::{ConfigError, WorkerConfig, WorkerSettings};
pub use orchestrator::{OffloadPool, ReadinessState, TimerSchedule, Worker};
