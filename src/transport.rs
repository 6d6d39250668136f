//! WebSocket transport abstraction.
//!
//! The client talks to the service through the [`Connector`] /
//! [`MessageSink`] / [`MessageStream`] traits rather than a concrete
//! WebSocket type, so tests (and embedders with their own transport) can
//! substitute a fake connection. [`WsConnector`] is the production
//! implementation over `tokio-tungstenite`.

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::error::Result;

// ── Traits ─────────────────────────────────────────────────────────

/// Opens a persistent message connection to a service URL.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connect and hand back the write and read halves of the connection.
    async fn connect(&self, url: &str)
        -> Result<(Box<dyn MessageSink>, Box<dyn MessageStream>)>;
}

/// Write half of a connection: sends text frames and closes.
#[async_trait]
pub trait MessageSink: Send {
    /// Send one text frame.
    async fn send_text(&mut self, text: String) -> Result<()>;

    /// Close the connection.
    async fn close(&mut self) -> Result<()>;

    /// Whether the underlying transport still reports an open state.
    fn is_open(&self) -> bool;
}

/// Read half of a connection: yields inbound text frames.
#[async_trait]
pub trait MessageStream: Send {
    /// Next inbound text frame. `None` once the connection is closed by
    /// either peer; `Some(Err(..))` on a transport error.
    async fn next_text(&mut self) -> Option<Result<String>>;
}

// ── tokio-tungstenite implementation ───────────────────────────────

type WsSinkHalf = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, WsMessage>;
type WsStreamHalf = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Production connector backed by `tokio_tungstenite::connect_async`.
#[derive(Debug, Default)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn connect(
        &self,
        url: &str,
    ) -> Result<(Box<dyn MessageSink>, Box<dyn MessageStream>)> {
        let (ws_stream, _response) = tokio_tungstenite::connect_async(url).await?;
        tracing::debug!(url = %url, "WebSocket connected");

        let (sink, stream) = ws_stream.split();
        // Both halves observe the same open flag: a close from either side
        // (local close(), send failure, peer close frame, stream EOF)
        // flips it off.
        let open = Arc::new(AtomicBool::new(true));
        Ok((
            Box::new(WsSink {
                sink,
                open: Arc::clone(&open),
            }),
            Box::new(WsStream { stream, open }),
        ))
    }
}

struct WsSink {
    sink: WsSinkHalf,
    open: Arc<AtomicBool>,
}

#[async_trait]
impl MessageSink for WsSink {
    async fn send_text(&mut self, text: String) -> Result<()> {
        if let Err(e) = self.sink.send(WsMessage::Text(text.into())).await {
            self.open.store(false, Ordering::SeqCst);
            return Err(e.into());
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.open.store(false, Ordering::SeqCst);
        self.sink.close().await?;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

struct WsStream {
    stream: WsStreamHalf,
    open: Arc<AtomicBool>,
}

#[async_trait]
impl MessageStream for WsStream {
    async fn next_text(&mut self) -> Option<Result<String>> {
        while let Some(item) = self.stream.next().await {
            match item {
                Ok(WsMessage::Text(text)) => return Some(Ok(text.to_string())),
                Ok(WsMessage::Close(frame)) => {
                    tracing::debug!(close_frame = ?frame, "server closed the connection");
                    self.open.store(false, Ordering::SeqCst);
                    return None;
                }
                Ok(
                    WsMessage::Ping(_)
                    | WsMessage::Pong(_)
                    | WsMessage::Binary(_)
                    | WsMessage::Frame(_),
                ) => {
                    // vox8 sends JSON text only; ping/pong is handled by
                    // tungstenite itself.
                }
                Err(e) => {
                    self.open.store(false, Ordering::SeqCst);
                    return Some(Err(e.into()));
                }
            }
        }
        self.open.store(false, Ordering::SeqCst);
        None
    }
}
