//! The transport contract.
//!
//! A transport is the worker's only link to the remote command source. The
//! worker owns it exclusively and drives it from the event loop; replies
//! produced by hooks (possibly on other threads) go through a separate
//! [`ReplySink`] handle.

use crate::{
    error::TransportError,
    event::{Event, Server},
};
use std::{future::Future, sync::Arc};

/// Connection to the remote event source.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a spindle transport",
    label = "missing `Transport` implementation",
    note = "Transports must implement `connect`, `next_event`, `set_command_list`, `get_servers` and `reply_sink`."
)]
pub trait Transport: Send + 'static {
    /// Establish the connection. Failing here is fatal to the worker.
    fn connect(&mut self) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Wait for the next event.
    ///
    /// Returns `Ok(None)` once the stream has ended cleanly. Must be
    /// cancel-safe: the worker races it against the timer and may drop the
    /// future before it completes.
    fn next_event(&mut self) -> impl Future<Output = Result<Option<Event>, TransportError>> + Send;

    /// Publish the names of the commands this worker handles.
    fn set_command_list(
        &mut self,
        names: Vec<String>,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// List the servers the remote side is attached to.
    fn get_servers(&mut self) -> impl Future<Output = Result<Vec<Server>, TransportError>> + Send;

    /// A handle hooks use to send messages back.
    fn reply_sink(&self) -> Arc<dyn ReplySink>;
}

/// Thread-safe side-channel for outgoing messages.
///
/// `send_message` is synchronous and must not block for long: it is called
/// from hook bodies, including inline lifecycle hooks on the event loop.
pub trait ReplySink: Send + Sync + 'static {
    /// Queue `text` for delivery to `channel_id`.
    fn send_message(&self, channel_id: &str, text: &str) -> Result<(), TransportError>;
}
