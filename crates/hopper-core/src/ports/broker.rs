//! BrokerClient port - the narrow slice of a list-based queue store we need.
//!
//! # Implementations
//! - `RedisBroker` (LLEN / BLPOP / RPUSH)
//! - `InMemoryBroker` (development, tests)
//!
//! Listeners do not share a `BrokerClient`; they get one from a `BrokerConnector`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{QueueMessage, TransportError};

/// Queue operations consumed by the listener and the dispatch engine.
///
/// # Contract
/// - `blocking_pop` waits without a timeout; it only returns with an item or an error.
/// - The returned message carries the key as reported by the broker.
/// - `push` appends at the tail, behind items that are already waiting.
#[async_trait]
pub trait BrokerClient: Send + Sync {
    async fn queue_length(&self, queue: &str) -> Result<u64, TransportError>;

    async fn blocking_pop(&self, queue: &str) -> Result<QueueMessage, TransportError>;

    async fn push(&self, queue: &str, payload: &str) -> Result<(), TransportError>;
}

/// Hands out the broker client a single listener polls with.
///
/// A blocking pop occupies its connection until an item arrives, so every
/// listener gets its own client and a parked pop never stalls a sibling.
#[async_trait]
pub trait BrokerConnector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn BrokerClient>, TransportError>;
}

/// Connector that returns the same client to every listener.
///
/// Only for brokers whose blocking pop does not hold a connection,
/// such as `InMemoryBroker`.
#[derive(Clone)]
pub struct SharedBroker(pub Arc<dyn BrokerClient>);

#[async_trait]
impl BrokerConnector for SharedBroker {
    async fn connect(&self) -> Result<Arc<dyn BrokerClient>, TransportError> {
        Ok(Arc::clone(&self.0))
    }
}
