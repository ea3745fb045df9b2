//! Error taxonomy shared by handlers, connectors and the dispatcher.
//!
//! Connector errors propagate to the handler that made the call. The
//! handler may recover or let them bubble up; whatever reaches the
//! dispatcher is rendered into a 500 response.

use std::fmt;
use thiserror::Error;

/// Errors raised while serving a single request.
#[derive(Debug, Error)]
pub enum TriggerError {
    /// Outbound HTTP call failed (unreachable, timeout, bad target URL).
    #[error("transport error: {reason}")]
    Transport { reason: String },

    /// Key-value store or pub/sub broker could not be used.
    #[error("connection error: {reason}")]
    Connection { reason: String },

    /// Key absent from the key-value store.
    #[error("key not found: {key}")]
    NotFound { key: String },

    /// Body bytes were not valid UTF-8.
    #[error("encoding error: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// Any other failure raised inside handler logic.
    #[error("handler error: {0}")]
    Handler(String),
}

impl TriggerError {
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    pub fn connection(reason: impl Into<String>) -> Self {
        Self::Connection {
            reason: reason.into(),
        }
    }

    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler(message.into())
    }

    /// The failure class, safe to show to any client.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Connection { .. } => ErrorKind::Connection,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Encoding(_) => ErrorKind::Encoding,
            Self::Handler(_) => ErrorKind::Handler,
        }
    }
}

/// Failure class of a [`TriggerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Connection,
    NotFound,
    Encoding,
    Handler,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Transport => "transport error",
            ErrorKind::Connection => "connection error",
            ErrorKind::NotFound => "not found",
            ErrorKind::Encoding => "encoding error",
            ErrorKind::Handler => "handler error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result type for request-scoped operations.
pub type TriggerResult<T> = Result<T, TriggerError>;
