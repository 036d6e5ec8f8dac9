//! Crate-level error types.
//!
//! [`ChartError`] unifies every error source (configuration, WebSocket,
//! JSON, storage, transport) behind a single enum so callers can match on
//! the variant they care about while still using the `?` operator.

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ChartError>;

/// Top-level error type returned by all public APIs.
#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    /// An environment variable held a value that could not be used.
    #[error("configuration error: {0}")]
    Config(String),

    /// A WebSocket operation (connect, send, receive) failed.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Terminal or file I/O failed.
    #[error("io error: {0}")]
    Io(String),

    /// The transport is gone and can no longer carry frames.
    #[error("transport error: {0}")]
    Transport(String),
}
