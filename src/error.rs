//! Error types shared by the client, the state machine and the command layer

use thiserror::Error;

use crate::state::TimerStatus;

/// Failure talking to the remote timer resource.
///
/// Every variant is recoverable: the engine keeps its last good snapshot and
/// surfaces the message instead of tearing anything down.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The request never produced a response (connection refused, timeout, ...)
    #[error("Remote timer unreachable: {0}")]
    Transport(String),

    /// The remote answered with a non-success status
    #[error("Remote timer returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body could not be decoded into a timer
    #[error("Malformed timer response: {0}")]
    Decode(String),
}

impl ClientError {
    /// HTTP-like status code, when the remote produced one
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else {
            ClientError::Transport(e.to_string())
        }
    }
}

/// Rejection produced by the timer state machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Cannot {event} a timer that is {from}")]
    Illegal { from: TimerStatus, event: &'static str },

    #[error("Timer duration must be a positive number of seconds, got {0}")]
    InvalidDuration(i64),

    /// A snapshot that breaks a timer invariant
    #[error("Inconsistent timer snapshot: {0}")]
    Inconsistent(String),
}

/// Outcome of a rejected or failed command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Remote(#[from] ClientError),

    #[error("No timer configured")]
    NoTimer,

    #[error("Timer view has been torn down")]
    TornDown,
}

impl CommandError {
    /// True when the command was refused locally and no remote call was made
    pub fn is_rejected(&self) -> bool {
        !matches!(self, CommandError::Remote(_))
    }
}
