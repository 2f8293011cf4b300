//! Error types used across the library.

use thiserror::Error;

use crate::model::Snowflake;

/// The error type returned by pretty much everything in the library.
///
/// You can match on the variant to figure out what went wrong.
/// [`Cancelled`](Error::Cancelled) is always safe to retry;
/// [`ConnectionUnavailable`](Error::ConnectionUnavailable) means the gateway
/// session for that guild's shard is gone, so re-establish the connection
/// before trying again.
#[derive(Error, Debug)]
pub enum Error {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Not for bad status codes like 403 or 404 -- those show up as
    /// [`Api`](Error::Api). This is for transport-level stuff like
    /// DNS failures, TLS errors, timeouts, etc.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Connection closed by server")]
    ConnectionClosed,

    /// The string contains the status and body, like
    /// `"HTTP 403: {\"message\": \"Missing Permissions\"}"`.
    #[error("API error: {0}")]
    Api(String),

    /// The caller's cancellation signal fired before the operation finished.
    #[error("Operation cancelled")]
    Cancelled,

    /// No live gateway session serves this guild. Callers must not retry
    /// blindly; the connection has to come back first.
    #[error("No gateway session available for guild {guild_id}")]
    ConnectionUnavailable { guild_id: Snowflake },
}
