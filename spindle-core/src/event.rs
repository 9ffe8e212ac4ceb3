//! Events delivered by a transport.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of an incoming event.
///
/// The set is closed: a new kind of event is a new variant here, never a
/// string looked up at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// A chat message that may carry a command.
    Message,
    /// The one-time post-connect readiness signal.
    Ready,
    /// A periodic timer tick.
    Timer,
}

impl EventType {
    /// All event types, in declaration order.
    pub const ALL: [EventType; 3] = [EventType::Message, EventType::Ready, EventType::Timer];

    /// Wire/log name of the event type.
    pub const fn as_str(self) -> &'static str {
        match self {
            EventType::Message => "message",
            EventType::Ready => "ready",
            EventType::Timer => "timer",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A chat message as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextMessage {
    /// Transport-assigned message id.
    #[serde(default)]
    pub id: String,
    /// Id of the author.
    #[serde(default)]
    pub author_id: String,
    /// Channel the message was posted in; replies go here.
    pub channel_id: String,
    /// Server the channel belongs to, if any.
    #[serde(default)]
    pub server_id: Option<String>,
    /// Raw message text.
    pub content: String,
}

impl TextMessage {
    /// Create a message with the given channel and content.
    ///
    /// Ids that are not supplied are left empty.
    pub fn new(channel_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            author_id: String::new(),
            channel_id: channel_id.into(),
            server_id: None,
            content: content.into(),
        }
    }

    /// Set the author id.
    pub fn with_author(mut self, author_id: impl Into<String>) -> Self {
        self.author_id = author_id.into();
        self
    }

    /// Set the server id.
    pub fn with_server(mut self, server_id: impl Into<String>) -> Self {
        self.server_id = Some(server_id.into());
        self
    }
}

/// A server (guild) the transport is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Server {
    /// Transport-assigned server id.
    pub id: String,
    /// Display name.
    pub name: String,
}

impl Server {
    /// Create a server descriptor.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// An event together with its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A chat message.
    Message(TextMessage),
    /// The transport finished connecting.
    Ready,
    /// A timer tick generated by the remote side.
    Timer,
}

impl Event {
    /// The kind of this event.
    pub fn kind(&self) -> EventType {
        match self {
            Event::Message(_) => EventType::Message,
            Event::Ready => EventType::Ready,
            Event::Timer => EventType::Timer,
        }
    }

    /// Shorthand for a message event.
    pub fn message(channel_id: impl Into<String>, content: impl Into<String>) -> Self {
        Event::Message(TextMessage::new(channel_id, content))
    }
}
