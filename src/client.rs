//! vox8 session client.
//!
//! [`Vox8Client`] owns one persistent WebSocket connection, the session id
//! the service assigns, and three optional event callbacks. The protocol is
//! deliberately small:
//!
//! 1. **Connect** — open the WebSocket, send `session_start` with the
//!    configured languages, voice mode, and credential
//! 2. **Stream** — send `audio` chunks (base64 PCM16 16kHz mono),
//!    receive `transcript` / `audio` events on the caller's callbacks
//! 3. **Keepalive** — send `keepalive` every 15s of send inactivity
//!    (caller-scheduled)
//! 4. **Close** — send `session_end`, then close the WebSocket
//!
//! The receive loop ([`Vox8Client::listen`]) runs until the connection
//! closes and is meant to be spawned as a background task alongside the
//! caller's audio producer.

use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::protocol::{self, ClientMessage, VoiceMode, AUDIO_FORMAT, DEFAULT_WS_URL};
use crate::transport::{Connector, MessageSink, MessageStream, WsConnector};

/// Callback invoked with the full JSON payload of an inbound event.
pub type EventCallback = Box<dyn Fn(&Value) + Send + Sync>;

// ── Builder ────────────────────────────────────────────────────────

/// Builder for [`Vox8Client`]. Created via [`Vox8Client::builder`].
///
/// At least one of [`api_key`](Self::api_key) /
/// [`session_token`](Self::session_token) is required; everything else has
/// a service default.
pub struct Vox8ClientBuilder {
    target_language: String,
    source_language: String,
    voice_mode: VoiceMode,
    api_key: Option<String>,
    session_token: Option<String>,
    ws_url: String,
    on_transcript: Option<EventCallback>,
    on_audio: Option<EventCallback>,
    on_error: Option<EventCallback>,
    connector: Box<dyn Connector>,
}

impl Vox8ClientBuilder {
    fn new(target_language: impl Into<String>) -> Self {
        Self {
            target_language: target_language.into(),
            source_language: "auto".to_string(),
            voice_mode: VoiceMode::default(),
            api_key: None,
            session_token: None,
            ws_url: DEFAULT_WS_URL.to_string(),
            on_transcript: None,
            on_audio: None,
            on_error: None,
            connector: Box::new(WsConnector),
        }
    }

    /// API key for server-side authentication.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Pre-generated session token, the alternative to an API key.
    /// Takes precedence over the API key when both are set.
    pub fn session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Source language code, or `"auto"` (default) for autodetection.
    pub fn source_language(mut self, lang: impl Into<String>) -> Self {
        self.source_language = lang.into();
        self
    }

    /// Synthesized voice character (default: [`VoiceMode::Match`]).
    pub fn voice_mode(mut self, mode: VoiceMode) -> Self {
        self.voice_mode = mode;
        self
    }

    /// Override the default service endpoint.
    pub fn ws_url(mut self, url: impl Into<String>) -> Self {
        self.ws_url = url.into();
        self
    }

    /// Callback for `transcript` events (full event payload).
    pub fn on_transcript(mut self, f: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        self.on_transcript = Some(Box::new(f));
        self
    }

    /// Callback for translated `audio` events (full event payload,
    /// audio as base64 PCM inside).
    pub fn on_audio(mut self, f: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        self.on_audio = Some(Box::new(f));
        self
    }

    /// Callback for `error` events reported by the service.
    pub fn on_error(mut self, f: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    /// Substitute the transport (used by tests and embedders with their
    /// own connection plumbing). Defaults to [`WsConnector`].
    pub fn connector(mut self, connector: Box<dyn Connector>) -> Self {
        self.connector = connector;
        self
    }

    /// Build the client.
    ///
    /// Fails with [`Error::InvalidConfiguration`] when neither credential
    /// is set (empty strings count as unset).
    pub fn build(self) -> Result<Vox8Client> {
        let api_key = self.api_key.filter(|k| !k.is_empty());
        let session_token = self.session_token.filter(|t| !t.is_empty());
        if api_key.is_none() && session_token.is_none() {
            return Err(Error::InvalidConfiguration(
                "either api_key or session_token must be provided".to_string(),
            ));
        }

        Ok(Vox8Client {
            target_language: self.target_language,
            source_language: self.source_language,
            voice_mode: self.voice_mode,
            api_key,
            session_token,
            ws_url: self.ws_url,
            on_transcript: self.on_transcript,
            on_audio: self.on_audio,
            on_error: self.on_error,
            connector: self.connector,
            sink: Mutex::new(None),
            stream: Mutex::new(None),
            session_id: Mutex::new(None),
        })
    }
}

// ── Client ─────────────────────────────────────────────────────────

/// Client for the vox8 real-time speech translation service.
///
/// One client manages one session over one connection. Reconnecting a
/// disconnected client is not supported — construct a fresh instance
/// instead. Lifecycle calls (`connect` / `disconnect`) must be serialized
/// by the caller; sends and [`listen`](Self::listen) may run concurrently.
///
/// ```no_run
/// use std::sync::Arc;
/// use vox8::Vox8Client;
///
/// # async fn run() -> vox8::Result<()> {
/// let client = Arc::new(
///     Vox8Client::builder("es")
///         .api_key("vox8_xxx")
///         .on_transcript(|evt| println!("{evt}"))
///         .build()?,
/// );
///
/// client.connect().await?;
/// let listener = {
///     let client = Arc::clone(&client);
///     tokio::spawn(async move { client.listen().await })
/// };
///
/// client.send_audio("ZGF0YQ==").await?;
/// client.disconnect().await?;
/// let _ = listener.await;
/// # Ok(())
/// # }
/// ```
pub struct Vox8Client {
    target_language: String,
    source_language: String,
    voice_mode: VoiceMode,
    api_key: Option<String>,
    session_token: Option<String>,
    ws_url: String,
    on_transcript: Option<EventCallback>,
    on_audio: Option<EventCallback>,
    on_error: Option<EventCallback>,
    connector: Box<dyn Connector>,
    /// Write half of the connection; `Some` while connected.
    sink: Mutex<Option<Box<dyn MessageSink>>>,
    /// Read half; taken by `listen` for the lifetime of the loop.
    stream: Mutex<Option<Box<dyn MessageStream>>>,
    /// Service-assigned id, set by the `session_ready` event.
    session_id: Mutex<Option<String>>,
}

impl Vox8Client {
    /// Start building a client for the given target language code
    /// (e.g. `"es"`, `"fr"`, `"de"`).
    pub fn builder(target_language: impl Into<String>) -> Vox8ClientBuilder {
        Vox8ClientBuilder::new(target_language)
    }

    /// Connect to vox8 and start a translation session.
    ///
    /// Sends `session_start` before returning; the service's acknowledgement
    /// arrives later as a `session_ready` event, observed via
    /// [`listen`](Self::listen). Fails with [`Error::AlreadyConnected`] when
    /// a connection already exists.
    pub async fn connect(&self) -> Result<()> {
        let mut sink_slot = self.sink.lock().await;
        if sink_slot.is_some() {
            return Err(Error::AlreadyConnected);
        }

        tracing::info!(
            url = %self.ws_url,
            target = %self.target_language,
            source = %self.source_language,
            "connecting to vox8"
        );
        let (mut sink, stream) = self.connector.connect(&self.ws_url).await?;

        let start = serde_json::to_string(&self.session_start_message())?;
        let sent = sink.send_text(start).await;

        // The handle is stored either way: a failed session_start leaves the
        // client connected to a broken socket, exactly what disconnect()
        // cleans up.
        *sink_slot = Some(sink);
        *self.stream.lock().await = Some(stream);
        sent
    }

    /// Listen for service events and dispatch them to the registered
    /// callbacks. Runs until the connection closes (by either peer) or a
    /// transport error occurs; spawn it as a background task.
    ///
    /// `session_ready` updates [`session_id`](Self::session_id);
    /// `transcript` / `audio` / `error` invoke the matching callback when
    /// one is registered; unknown event types are ignored. Malformed JSON
    /// frames are logged and skipped rather than ending the loop.
    ///
    /// Fails with [`Error::NotConnected`] before [`connect`](Self::connect).
    pub async fn listen(&self) -> Result<()> {
        let mut stream = self
            .stream
            .lock()
            .await
            .take()
            .ok_or(Error::NotConnected)?;

        while let Some(frame) = stream.next_text().await {
            self.handle_event(&frame?).await;
        }
        tracing::info!("vox8 receive loop ended");
        Ok(())
    }

    /// Send one base64-encoded audio chunk (16kHz mono s16le PCM).
    ///
    /// The content is passed through untouched — no validation, no
    /// transcoding, no acknowledgement awaited.
    pub async fn send_audio(&self, audio_base64: impl Into<String>) -> Result<()> {
        self.send_message(&ClientMessage::Audio {
            audio: audio_base64.into(),
        })
        .await
    }

    /// Base64-encode raw PCM bytes and send them as an audio chunk.
    pub async fn send_audio_bytes(&self, pcm: &[u8]) -> Result<()> {
        self.send_audio(protocol::encode_pcm(pcm)).await
    }

    /// Send a keepalive to stop the service from timing out an idle
    /// session. Call roughly every [`crate::KEEPALIVE_INTERVAL`] when no
    /// audio is flowing — the client does not schedule this itself.
    pub async fn send_keepalive(&self) -> Result<()> {
        self.send_message(&ClientMessage::Keepalive).await
    }

    /// Gracefully end the session and close the connection.
    ///
    /// Best-effort sends `session_end` and closes the transport. The
    /// connection handle and session id are cleared on every exit path,
    /// even when the send or close fails (the first failure is still
    /// returned after cleanup). A no-op when not connected.
    pub async fn disconnect(&self) -> Result<()> {
        let mut sink_slot = self.sink.lock().await;
        let Some(mut sink) = sink_slot.take() else {
            return Ok(());
        };

        let result = async {
            sink.send_text(serde_json::to_string(&ClientMessage::SessionEnd)?)
                .await?;
            sink.close().await
        }
        .await;

        *self.stream.lock().await = None;
        *self.session_id.lock().await = None;
        tracing::info!("disconnected from vox8");
        result
    }

    /// Whether a connection exists and the transport reports it open.
    pub async fn is_connected(&self) -> bool {
        self.sink.lock().await.as_ref().is_some_and(|s| s.is_open())
    }

    /// The service-assigned session id, once `session_ready` has been
    /// received. `None` before that and after `disconnect`.
    pub async fn session_id(&self) -> Option<String> {
        self.session_id.lock().await.clone()
    }

    // ── Internals ──────────────────────────────────────────────────

    fn session_start_message(&self) -> ClientMessage {
        // Session token takes precedence when both credentials are set.
        let (session_token, api_key) = match &self.session_token {
            Some(token) => (Some(token.clone()), None),
            None => (None, self.api_key.clone()),
        };
        ClientMessage::SessionStart {
            target_language: self.target_language.clone(),
            source_language: self.source_language.clone(),
            voice_mode: self.voice_mode,
            audio_format: AUDIO_FORMAT,
            session_token,
            api_key,
        }
    }

    async fn send_message(&self, msg: &ClientMessage) -> Result<()> {
        let mut sink_slot = self.sink.lock().await;
        let sink = sink_slot.as_mut().ok_or(Error::NotConnected)?;
        sink.send_text(serde_json::to_string(msg)?).await
    }

    /// Parse one inbound frame and dispatch it by its `type` field.
    async fn handle_event(&self, text: &str) {
        let event: Value = match serde_json::from_str(text) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed vox8 frame");
                return;
            }
        };

        match event.get("type").and_then(Value::as_str).unwrap_or("") {
            "session_ready" => {
                let id = event
                    .get("session_id")
                    .and_then(Value::as_str)
                    .map(str::to_owned);
                tracing::info!(session_id = ?id, "vox8 session ready");
                *self.session_id.lock().await = id;
            }
            "transcript" => {
                if let Some(cb) = &self.on_transcript {
                    cb(&event);
                }
            }
            "audio" => {
                if let Some(cb) = &self.on_audio {
                    cb(&event);
                }
            }
            "error" => {
                tracing::warn!(event = %event, "vox8 reported an error");
                if let Some(cb) = &self.on_error {
                    cb(&event);
                }
            }
            other => {
                tracing::debug!(event_type = other, "ignoring unhandled vox8 event");
            }
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────
