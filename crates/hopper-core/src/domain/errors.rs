//! Errors - failure taxonomy for the queue runtime.
//!
//! - Transport: the broker or the failure store could not be reached / answered an error.
//! - Configuration: the job definitions or connection registry are inconsistent.
//! - Handler: a job handler reported (or raised) a failure for one attempt.
//!
//! Malformed payload JSON is not an error here: it is logged and
//! treated as an empty envelope (see `PayloadEnvelope::decode`).

use thiserror::Error;

/// A failure reported by a broker or store adapter.
///
/// `op` names the capability that failed (`LLEN`, `BLPOP`, `insert failed_jobs`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{op} failed: {message}")]
pub struct TransportError {
    pub op: &'static str,
    pub message: String,
}

impl TransportError {
    pub fn new(op: &'static str, message: impl Into<String>) -> Self {
        Self {
            op,
            message: message.into(),
        }
    }
}

/// Errors surfaced by the dispatch engine, the listeners and the supervisor.
///
/// Every variant is terminal for the message (and the listener) that produced it.
/// None of them is retried by the engine itself.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Length check or blocking pop failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The popped queue key does not have the `prefix:name` shape.
    #[error("malformed queue key '{0}': expected 'prefix:name'")]
    PopDecode(String),

    #[error("failed to requeue job on '{queue}': {source}")]
    RequeuePush {
        queue: String,
        #[source]
        source: TransportError,
    },

    #[error("failed to persist failed job from '{queue}': {source}")]
    FailureStorePersist {
        queue: String,
        #[source]
        source: TransportError,
    },

    #[error("job type connection invalid: unsupported driver '{0}'")]
    UnsupportedDriver(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    /// The listener task panicked or was cancelled.
    #[error("listener task aborted: {0}")]
    ListenerAborted(String),
}

/// The failure of one handler attempt.
///
/// Returned errors and panics are folded into this type so the engine
/// treats them identically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    #[error("{0}")]
    Failed(String),

    #[error("payload decode failed: {0}")]
    Decode(String),

    #[error("handler panicked: {0}")]
    Panicked(String),

    #[error("missing connection: {0}")]
    MissingConnection(String),
}

impl HandlerError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}
