//! Rust client SDK for vox8, the real-time speech translation service.
//!
//! Streams base64 PCM audio chunks to the service over one persistent
//! WebSocket and dispatches translated transcript/audio events to
//! caller-supplied callbacks, managing the session lifecycle
//! (start / keepalive / graceful end) along the way.
//!
//! ## Design
//! - One [`Vox8Client`] per session; the client holds the connection,
//!   the service-assigned session id, and three optional event callbacks
//! - [`Vox8Client::listen`] is the receive loop — spawn it as a background
//!   task; it runs until the connection closes
//! - No reconnection, retry, buffering, or flow control: recovery policy
//!   belongs to the host application, which also schedules keepalives
//!   (every [`KEEPALIVE_INTERVAL`] of send inactivity)
//! - The transport sits behind the [`transport::Connector`] trait so tests
//!   and embedders can swap the WebSocket out

pub mod client;
pub mod error;
pub mod protocol;
pub mod transport;

pub use client::{EventCallback, Vox8Client, Vox8ClientBuilder};
pub use error::{Error, Result};
pub use protocol::{
    encode_pcm, ClientMessage, VoiceMode, AUDIO_FORMAT, DEFAULT_WS_URL, INPUT_SAMPLE_RATE,
    KEEPALIVE_INTERVAL,
};
pub use transport::{Connector, MessageSink, MessageStream, WsConnector};
