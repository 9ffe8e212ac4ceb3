//! TCP transport speaking the [`wire`](super::wire) protocol.

use super::wire::{self, Frame, Request};
use spindle_core::{Event, ReplySink, Server, Transport, TransportError};
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines},
    net::{TcpStream, tcp::OwnedReadHalf},
    sync::mpsc,
    time::timeout,
};

const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(10);

type Outgoing = Arc<Mutex<Option<mpsc::UnboundedSender<Request>>>>;

/// A transport connected to a remote command source over TCP.
///
/// Writes go through a background writer task, so [`ReplySink`] handles can
/// be used from any thread. Events that arrive while a request is waiting
/// for its answer are buffered and returned by `next_event` in order.
pub struct TcpTransport {
    endpoint: String,
    identifier: String,
    reply_timeout: Duration,
    lines: Option<Lines<BufReader<OwnedReadHalf>>>,
    outgoing: Outgoing,
    pending: VecDeque<Event>,
}

impl TcpTransport {
    /// Create a transport for `endpoint` (`host:port`). Nothing is dialed
    /// until `connect`.
    pub fn new(endpoint: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            identifier: identifier.into(),
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
            lines: None,
            outgoing: Arc::new(Mutex::new(None)),
            pending: VecDeque::new(),
        }
    }

    /// How long to wait for the answer to a request.
    pub fn with_reply_timeout(mut self, reply_timeout: Duration) -> Self {
        self.reply_timeout = reply_timeout;
        self
    }

    /// The endpoint this transport dials.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request(&self, request: Request) -> Result<(), TransportError> {
        send(&self.outgoing, request)
    }

    async fn wait_for<T>(
        &mut self,
        what: &'static str,
        pick: impl FnMut(Frame) -> Result<T, Frame> + Send,
    ) -> Result<T, TransportError> {
        let lines = self.lines.as_mut().ok_or(TransportError::NotConnected)?;
        let fut = read_until(lines, &mut self.pending, what, pick);
        timeout(self.reply_timeout, fut)
            .await
            .map_err(|_| TransportError::Timeout(self.reply_timeout))?
    }
}

fn send(outgoing: &Outgoing, request: Request) -> Result<(), TransportError> {
    let guard = outgoing.lock().unwrap_or_else(PoisonError::into_inner);
    let tx = guard.as_ref().ok_or(TransportError::NotConnected)?;
    tx.send(request)
        .map_err(|_| TransportError::Closed("the writer to accept a frame"))
}

async fn read_until<T>(
    lines: &mut Lines<BufReader<OwnedReadHalf>>,
    pending: &mut VecDeque<Event>,
    what: &'static str,
    mut pick: impl FnMut(Frame) -> Result<T, Frame>,
) -> Result<T, TransportError> {
    loop {
        let line = lines.next_line().await?.ok_or(TransportError::Closed(what))?;
        if line.trim().is_empty() {
            continue;
        }
        let frame = match wire::decode(&line)?.into_event() {
            Ok(event) => {
                pending.push_back(event);
                continue;
            }
            Err(Frame::Unknown) => {
                tracing::debug!(line = %line.trim(), "skipping unknown frame type");
                continue;
            }
            Err(frame) => frame,
        };
        match pick(frame) {
            Ok(value) => return Ok(value),
            Err(Frame::Error { message }) => return Err(TransportError::Protocol(message)),
            Err(other) => tracing::warn!(frame = ?other, expected = what, "unexpected frame"),
        }
    }
}

impl Transport for TcpTransport {
    async fn connect(&mut self) -> Result<(), TransportError> {
        let stream =
            TcpStream::connect(&self.endpoint)
                .await
                .map_err(|e| TransportError::Connect {
                    endpoint: self.endpoint.clone(),
                    reason: e.to_string(),
                })?;
        let (read, mut write) = stream.into_split();
        let (tx, mut rx) = mpsc::unbounded_channel::<Request>();

        let endpoint = self.endpoint.clone();
        tokio::spawn(async move {
            while let Some(request) = rx.recv().await {
                let line = match wire::encode(&request) {
                    Ok(line) => line,
                    Err(e) => {
                        tracing::error!(error = %e, "dropping unencodable frame");
                        continue;
                    }
                };
                if let Err(e) = write.write_all(line.as_bytes()).await {
                    tracing::error!(endpoint = %endpoint, error = %e, "write failed, stopping writer");
                    break;
                }
            }
            tracing::debug!(endpoint = %endpoint, "writer finished");
        });

        self.lines = Some(BufReader::new(read).lines());
        *self.outgoing.lock().unwrap_or_else(PoisonError::into_inner) = Some(tx);
        tracing::info!(endpoint = %self.endpoint, "connected");

        self.request(Request::Hello {
            identifier: self.identifier.clone(),
        })
    }

    async fn next_event(&mut self) -> Result<Option<Event>, TransportError> {
        if let Some(event) = self.pending.pop_front() {
            return Ok(Some(event));
        }
        let lines = self.lines.as_mut().ok_or(TransportError::NotConnected)?;
        loop {
            let Some(line) = lines.next_line().await? else {
                tracing::info!(endpoint = %self.endpoint, "remote closed the connection");
                return Ok(None);
            };
            if line.trim().is_empty() {
                continue;
            }
            match wire::decode(&line)?.into_event() {
                Ok(event) => return Ok(Some(event)),
                Err(Frame::Error { message }) => {
                    tracing::warn!(error = %message, "remote reported an error");
                }
                Err(Frame::Unknown) => {
                    tracing::debug!(line = %line.trim(), "skipping unknown event type");
                }
                Err(frame) => tracing::warn!(frame = ?frame, "ignoring unsolicited frame"),
            }
        }
    }

    async fn set_command_list(&mut self, names: Vec<String>) -> Result<(), TransportError> {
        self.request(Request::SetCommandList { names })?;
        self.wait_for("ack", |frame| match frame {
            Frame::Ack => Ok(()),
            other => Err(other),
        })
        .await
    }

    async fn get_servers(&mut self) -> Result<Vec<Server>, TransportError> {
        self.request(Request::GetServers)?;
        self.wait_for("servers", |frame| match frame {
            Frame::Servers { servers } => Ok(servers),
            other => Err(other),
        })
        .await
    }

    fn reply_sink(&self) -> Arc<dyn ReplySink> {
        Arc::new(TcpSink {
            outgoing: Arc::clone(&self.outgoing),
        })
    }
}

struct TcpSink {
    outgoing: Outgoing,
}

impl ReplySink for TcpSink {
    fn send_message(&self, channel_id: &str, text: &str) -> Result<(), TransportError> {
        tracing::debug!(channel = channel_id, "sending message");
        send(
            &self.outgoing,
            Request::SendMessage {
                channel_id: channel_id.to_string(),
                text: text.to_string(),
            },
        )
    }
}
