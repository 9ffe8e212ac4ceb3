//! # spindle-std
//!
//! Standard implementations for the spindle event worker.
//!
//! This crate provides:
//! - **Registry**: [`registry::PluginRegistry`], built with
//!   [`registry::PluginRegistryBuilder`]
//! - **Transports**: the in-process [`transport::ChannelTransport`] and the
//!   line-delimited JSON [`transport::TcpTransport`]
//! - **Sessions**: [`sqlite::SqliteSessions`] (feature `sqlite`)
//! - **Storage**: [`storage::JsonStore`], JSON documents with a backup copy
//! - **Standard hooks**: ping, help, lifecycle logging, server directory
//! - **Testing**: recording and failing hooks, counting session factory

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use spindle_core;

// Modules
pub mod hooks;
pub mod registry;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod storage;
pub mod testing;
pub mod transport;
