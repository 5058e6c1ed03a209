//! Error types for the RedisBloom client.

use std::fmt;

/// Result type alias for RedisBloom client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to a RedisBloom-enabled server.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O error occurred during communication.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The engine answered with an error reply.
    ///
    /// The message is the engine's text, unmodified, so callers can match on
    /// it (for example `"CMS: key does not exist"`).
    #[error("{0}")]
    Server(String),

    /// The RESP protocol data was malformed or unexpected.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The reply shape did not match what the operation decodes.
    #[error("unexpected response type: expected {expected}, got {actual}")]
    UnexpectedResponse {
        /// The expected type description.
        expected: &'static str,
        /// The actual type description.
        actual: String,
    },

    /// A statistic was requested that the engine could not compute, such as the
    /// CDF of a digest holding no observations.
    #[error("undefined result for {0}")]
    UndefinedResult(&'static str),

    /// The connection to the server was closed.
    #[error("connection closed")]
    ConnectionClosed,

    /// The connection pool has been closed.
    #[error("connection pool closed")]
    PoolClosed,

    /// The connection pool is exhausted and no connections are available.
    #[error("connection pool exhausted (max size: {max_size})")]
    PoolExhausted {
        /// The maximum pool size.
        max_size: usize,
    },

    /// A timeout occurred while dialing the server.
    #[error("operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Authentication failed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// An invalid argument was provided to a command. Raised before any I/O.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Returns `true` if this error is an error reply from the engine.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Server(_))
    }

    /// Returns the engine's error message, if this is an error reply.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Error::Server(msg) => Some(msg.as_str()),
            _ => None,
        }
    }

    /// Returns `true` if the connection this error occurred on can no longer
    /// be trusted to be in sync with the server.
    pub(crate) fn poisons_connection(&self) -> bool {
        matches!(
            self,
            Error::Io(_) | Error::Protocol(_) | Error::ConnectionClosed
        )
    }
}

/// Describes the type of a RESP value for error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// A status reply.
    Status,
    /// A bulk string value.
    String,
    /// An integer value.
    Integer,
    /// An array value.
    Array,
    /// An error reply.
    Error,
    /// A null value.
    Null,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Status => write!(f, "status"),
            ValueKind::String => write!(f, "string"),
            ValueKind::Integer => write!(f, "integer"),
            ValueKind::Array => write!(f, "array"),
            ValueKind::Error => write!(f, "error"),
            ValueKind::Null => write!(f, "nil"),
        }
    }
}
