//! Error types for the vox8 client.

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by [`Vox8Client`](crate::Vox8Client) operations.
///
/// Transport failures are carried through unchanged — the client has no
/// retry policy, so the caller decides whether to construct a fresh client
/// and connect again.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The client was built without a usable credential.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// `connect` was called while a connection already exists.
    /// Reconnecting the same client is not supported; disconnect first
    /// or construct a new client.
    #[error("already connected")]
    AlreadyConnected,

    /// A connection-requiring operation was called before `connect`.
    #[error("not connected")]
    NotConnected,

    /// The underlying WebSocket failed to connect, send, or receive.
    #[error(transparent)]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    /// An outbound control message could not be serialized.
    #[error("message serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
