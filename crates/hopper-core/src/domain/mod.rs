//! Domain model: job definitions, queue messages, payload envelopes,
//! failure records and the error taxonomy.

pub mod connection;
pub mod envelope;
pub mod errors;
pub mod failure;
pub mod job;
pub mod message;
pub mod outcome;

pub use self::connection::{Connection, ConnectionKind, Connections};
pub use self::envelope::PayloadEnvelope;
pub use self::errors::{HandlerError, QueueError, TransportError};
pub use self::failure::FailureRecord;
pub use self::job::{Driver, JobDefinition};
pub use self::message::{QueueLabels, QueueMessage};
pub use self::outcome::DispatchOutcome;
