//! In-process transport.
//!
//! Events are pushed through a [`ChannelHandle`] and read by the worker from
//! the paired [`ChannelTransport`]. Everything the worker sends back (the
//! command list, replies) is recorded on the handle for inspection. The event
//! stream ends once every handle has been dropped.

use spindle_core::{Event, ReplySink, Server, TextMessage, Transport, TransportError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

/// A message sent through the reply side-channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    /// Target channel.
    pub channel_id: String,
    /// Message text.
    pub text: String,
}

#[derive(Default)]
struct Shared {
    connected: bool,
    connect_error: Option<String>,
    command_list: Option<Vec<String>>,
    servers: Vec<Server>,
    sent: Vec<SentMessage>,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Create a connected transport/handle pair.
pub fn channel_transport() -> (ChannelTransport, ChannelHandle) {
    let (tx, rx) = mpsc::unbounded_channel();
    let shared = Arc::new(Mutex::new(Shared::default()));
    (
        ChannelTransport {
            rx,
            shared: Arc::clone(&shared),
        },
        ChannelHandle { tx, shared },
    )
}

/// The worker side of an in-process transport.
pub struct ChannelTransport {
    rx: mpsc::UnboundedReceiver<Event>,
    shared: Arc<Mutex<Shared>>,
}

impl ChannelTransport {
    /// Messages sent through the reply side-channel, in order.
    ///
    /// Unlike [`ChannelHandle::sent`] this needs no handle, so it can be
    /// read after the event stream has ended.
    pub fn sent(&self) -> Vec<SentMessage> {
        lock(&self.shared).sent.clone()
    }
}

impl Transport for ChannelTransport {
    async fn connect(&mut self) -> Result<(), TransportError> {
        let mut shared = lock(&self.shared);
        if let Some(reason) = shared.connect_error.take() {
            return Err(TransportError::Connect {
                endpoint: "channel".to_string(),
                reason,
            });
        }
        shared.connected = true;
        Ok(())
    }

    async fn next_event(&mut self) -> Result<Option<Event>, TransportError> {
        if !lock(&self.shared).connected {
            return Err(TransportError::NotConnected);
        }
        Ok(self.rx.recv().await)
    }

    async fn set_command_list(&mut self, names: Vec<String>) -> Result<(), TransportError> {
        let mut shared = lock(&self.shared);
        if !shared.connected {
            return Err(TransportError::NotConnected);
        }
        shared.command_list = Some(names);
        Ok(())
    }

    async fn get_servers(&mut self) -> Result<Vec<Server>, TransportError> {
        let shared = lock(&self.shared);
        if !shared.connected {
            return Err(TransportError::NotConnected);
        }
        Ok(shared.servers.clone())
    }

    fn reply_sink(&self) -> Arc<dyn ReplySink> {
        Arc::new(ChannelSink {
            shared: Arc::clone(&self.shared),
        })
    }
}

struct ChannelSink {
    shared: Arc<Mutex<Shared>>,
}

impl ReplySink for ChannelSink {
    fn send_message(&self, channel_id: &str, text: &str) -> Result<(), TransportError> {
        tracing::debug!(channel = channel_id, "sending message");
        lock(&self.shared).sent.push(SentMessage {
            channel_id: channel_id.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }
}

/// The remote side of an in-process transport.
#[derive(Clone)]
pub struct ChannelHandle {
    tx: mpsc::UnboundedSender<Event>,
    shared: Arc<Mutex<Shared>>,
}

impl ChannelHandle {
    /// Push an event to the worker.
    pub fn send(&self, event: Event) {
        if self.tx.send(event).is_err() {
            tracing::debug!("channel transport dropped, event discarded");
        }
    }

    /// Push a chat message.
    pub fn message(&self, channel_id: &str, content: &str) {
        self.send(Event::Message(TextMessage::new(channel_id, content)));
    }

    /// Push the readiness signal.
    pub fn ready(&self) {
        self.send(Event::Ready);
    }

    /// Push a remote timer event.
    pub fn timer(&self) {
        self.send(Event::Timer);
    }

    /// Servers returned by `get_servers`.
    pub fn set_servers(&self, servers: Vec<Server>) {
        lock(&self.shared).servers = servers;
    }

    /// Make the next `connect` fail with `reason`.
    pub fn fail_connect(&self, reason: impl Into<String>) {
        lock(&self.shared).connect_error = Some(reason.into());
    }

    /// Whether the worker has connected.
    pub fn is_connected(&self) -> bool {
        lock(&self.shared).connected
    }

    /// The command list the worker published, if any.
    pub fn command_list(&self) -> Option<Vec<String>> {
        lock(&self.shared).command_list.clone()
    }

    /// Messages sent through the reply side-channel, in order.
    pub fn sent(&self) -> Vec<SentMessage> {
        lock(&self.shared).sent.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_requires_connect() {
        let (mut transport, handle) = channel_transport();
        assert!(matches!(
            transport.next_event().await,
            Err(TransportError::NotConnected)
        ));

        transport.connect().await.unwrap();
        assert!(handle.is_connected());
    }

    #[tokio::test]
    async fn test_stream_ends_when_handles_drop() {
        let (mut transport, handle) = channel_transport();
        transport.connect().await.unwrap();

        handle.ready();
        drop(handle);

        assert_eq!(transport.next_event().await.unwrap(), Some(Event::Ready));
        assert_eq!(transport.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_records_outgoing() {
        let (mut transport, handle) = channel_transport();
        transport.connect().await.unwrap();

        transport
            .set_command_list(vec!["ping".into()])
            .await
            .unwrap();
        transport.reply_sink().send_message("c1", "pong").unwrap();

        assert_eq!(handle.command_list(), Some(vec!["ping".to_string()]));
        assert_eq!(
            handle.sent(),
            vec![SentMessage {
                channel_id: "c1".into(),
                text: "pong".into()
            }]
        );
    }
}
