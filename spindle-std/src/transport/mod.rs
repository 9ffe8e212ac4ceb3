//! Transport implementations.
//!
//! - [`ChannelTransport`] - in-process, driven through a [`ChannelHandle`]
//! - [`TcpTransport`] - newline-delimited JSON frames over TCP

pub mod channel;
pub mod tcp;
pub mod wire;

pub use channel::{ChannelHandle, ChannelTransport, SentMessage, channel_transport};
pub use tcp::TcpTransport;
