//! Line-delimited JSON frames spoken by [`TcpTransport`](super::TcpTransport).
//!
//! Every frame is a single JSON object on its own line. Outbound requests are
//! tagged by `op`, inbound frames by `type`:
//!
//! ```text
//! -> {"op":"hello","identifier":"spindle"}
//! -> {"op":"set_command_list","names":["help","ping"]}
//! <- {"type":"ack"}
//! <- {"type":"message","channel_id":"c1","content":".ping"}
//! -> {"op":"send_message","channel_id":"c1","text":"pong"}
//! ```

use serde::{Deserialize, Serialize};
use spindle_core::{Event, Server, TextMessage, TransportError};

/// A frame sent to the remote side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    /// Identify the worker after connecting.
    Hello {
        /// Worker identifier.
        identifier: String,
    },
    /// Publish the command list. Answered by [`Frame::Ack`].
    SetCommandList {
        /// Command names.
        names: Vec<String>,
    },
    /// Ask for the server list. Answered by [`Frame::Servers`].
    GetServers,
    /// Post a message. Not answered.
    SendMessage {
        /// Target channel.
        channel_id: String,
        /// Message text.
        text: String,
    },
}

/// A frame received from the remote side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Frame {
    /// A chat message.
    Message(TextMessage),
    /// The readiness signal.
    Ready,
    /// A remote timer tick.
    Timer,
    /// Acknowledges a request.
    Ack,
    /// Answer to [`Request::GetServers`].
    Servers {
        /// Known servers.
        servers: Vec<Server>,
    },
    /// The remote side rejected the last request.
    Error {
        /// Reason given by the remote side.
        message: String,
    },
    /// Any `type` this worker does not handle. Ignored by the transport.
    #[serde(other)]
    Unknown,
}

impl Frame {
    /// Convert an event frame, handing back anything else.
    pub fn into_event(self) -> Result<Event, Frame> {
        match self {
            Frame::Message(message) => Ok(Event::Message(message)),
            Frame::Ready => Ok(Event::Ready),
            Frame::Timer => Ok(Event::Timer),
            other => Err(other),
        }
    }
}

/// Encode a request as one line, newline included.
pub fn encode(request: &Request) -> Result<String, TransportError> {
    let mut line =
        serde_json::to_string(request).map_err(|e| TransportError::Protocol(e.to_string()))?;
    line.push('\n');
    Ok(line)
}

/// Decode one line into a frame.
///
/// Only malformed JSON is an error; an unrecognised `type` decodes to
/// [`Frame::Unknown`].
pub fn decode(line: &str) -> Result<Frame, TransportError> {
    serde_json::from_str(line.trim())
        .map_err(|e| TransportError::Protocol(format!("bad frame {line:?}: {e}")))
}
