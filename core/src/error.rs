//! Error types for the photo platform API client.
//!
//! # Design
//! `Unauthorized` gets a dedicated variant because it is the one status the
//! client reacts to on its own: by the time a caller sees it, the stored
//! session has already been cleared. Every other non-2xx response lands in
//! `Http` with the raw status code and body, uninterpreted.

use thiserror::Error;

/// Errors returned by the client, the transport and the façade.
#[derive(Debug, Error)]
pub enum ApiError {
    /// An authenticated request was rejected with 401. The session identity
    /// has been cleared and the unauthorized hook has run.
    #[error("unauthorized: {body}")]
    Unauthorized { body: String },

    /// The server returned a non-2xx status that the client does not handle.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Connection, DNS or other transport-level failure.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The request payload or filter could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The session store could not be written.
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ApiError {
    /// HTTP status carried by this error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors raised by persistent session stores.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("session storage is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
}
