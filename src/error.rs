//! Error types for smbsession.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Main error type for smbsession operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Process-level errors (spawning, stdio, termination)
    #[error("Process error: {0}")]
    Process(#[from] ProcessError),

    /// Channel operation errors (pattern waits, timeouts)
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Client-level errors (handshake, configuration)
    #[error("Client error: {0}")]
    Client(#[from] ClientError),
}

/// Process layer errors (the spawned smbclient child).
#[derive(Error, Debug)]
pub enum ProcessError {
    /// Failed to spawn the smbclient executable
    #[error("Failed to spawn '{program}': {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The child process terminated while a wait was pending
    #[error("Process terminated")]
    Terminated,

    /// Writing to the child's stdin failed
    #[error("Write to process failed: {0}")]
    Write(#[source] io::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Channel layer errors (trigger dispatch, prompt matching).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// The initial prompt did not appear within the connection timeout
    #[error("Connection timeout after {0:?}")]
    ConnectionTimeout(Duration),

    /// The prompt did not reappear within the command timeout
    #[error("Command timeout after {0:?}")]
    CommandTimeout(Duration),

    /// The dispatcher was closed while a wait was pending
    #[error("Channel closed")]
    Closed,

    /// Invalid regex pattern
    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Client layer errors (session establishment, misconfiguration).
#[derive(Error, Debug)]
pub enum ClientError {
    /// The server answered the handshake with an NT status code
    #[error("{status}")]
    Handshake { status: String },

    /// Client not connected
    #[error("Client not connected - call connect() first")]
    NotConnected,

    /// Client already connected
    #[error("Client already connected")]
    AlreadyConnected,

    /// A per-command timeout exceeding the session default
    #[error("Command timeout {requested:?} exceeds session timeout {limit:?}")]
    TimeoutExceedsSession {
        requested: Duration,
        limit: Duration,
    },
}

/// Result type alias using smbsession's Error.
pub type Result<T> = std::result::Result<T, Error>;
