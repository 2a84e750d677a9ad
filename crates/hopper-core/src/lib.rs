//! hopper-core
//!
//! Queue consumer runtime: pops jobs from broker lists, runs the registered
//! handler, and requeues or records failures against a per-job attempt budget.
//!
//! # Modules
//! - **domain**: job definitions, queue messages, payload envelopes, failure records, errors
//! - **ports**: `BrokerClient`, `FailureStore`, `Clock`
//! - **app**: dispatch engine, queue listener, listener supervisor, registries
//! - **typed**: `JobHandler` and the typed `Handler<T>` adapter
//! - **impls**: Redis broker, MySQL failure store, in-memory adapters

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;
pub mod typed;

#[cfg(test)]
mod testing;

pub use app::{
    ConnectionRegistry, DispatchEngine, JobRegistry, ListenerConfig, ListenerExit,
    ListenerSupervisor, QueueListener, SupervisorHandle,
};
pub use domain::{
    Connection, ConnectionKind, Connections, DispatchOutcome, Driver, HandlerError,
    JobDefinition, PayloadEnvelope, QueueError, QueueMessage,
};
pub use typed::{Handler, Job, JobHandler, TypedHandler};
