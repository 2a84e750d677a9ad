//! RedisBroker - BrokerClient over Redis lists.
//!
//! - length: `LLEN key`
//! - pop: `BLPOP key 0` (head of the list, waits forever)
//! - push: `RPUSH key payload` (tail of the list)
//!
//! `BLPOP` parks its connection, so each listener polls on a connection of
//! its own (`RedisConnector::connect`). Handlers get a different one.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};

use crate::domain::{QueueMessage, TransportError};
use crate::ports::{BrokerClient, BrokerConnector};

#[derive(Clone)]
pub struct RedisBroker {
    conn: ConnectionManager,
}

impl fmt::Debug for RedisBroker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisBroker")
            .field("connection", &"ConnectionManager")
            .finish()
    }
}

impl RedisBroker {
    /// Wrap a connection owned by one listener.
    ///
    /// The manager must not enforce a response timeout, otherwise an idle
    /// `BLPOP` surfaces as a transport error. `RedisConnector` sets this up.
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

/// Opens Redis connections: one per listener for polling, and a separate
/// one for handler commands.
#[derive(Debug, Clone)]
pub struct RedisConnector {
    client: redis::Client,
}

impl RedisConnector {
    pub fn open(url: &str) -> Result<Self, TransportError> {
        let client = redis::Client::open(url)
            .map_err(|e| TransportError::new("redis connect", format!("invalid url: {e}")))?;
        Ok(Self { client })
    }

    /// A fresh connection without a response timeout, for blocking list commands.
    pub async fn polling_connection(&self) -> Result<ConnectionManager, TransportError> {
        let config = ConnectionManagerConfig::new().set_response_timeout(None);
        ConnectionManager::new_with_config(self.client.clone(), config)
            .await
            .map_err(|e| TransportError::new("redis connect", e.to_string()))
    }

    /// A connection with the default timeouts, handed to job handlers.
    /// It never carries a blocking command.
    pub async fn command_connection(&self) -> Result<ConnectionManager, TransportError> {
        ConnectionManager::new(self.client.clone())
            .await
            .map_err(|e| TransportError::new("redis connect", e.to_string()))
    }
}

#[async_trait]
impl BrokerConnector for RedisConnector {
    async fn connect(&self) -> Result<Arc<dyn BrokerClient>, TransportError> {
        let conn = self.polling_connection().await?;
        Ok(Arc::new(RedisBroker::new(conn)))
    }
}

#[async_trait]
impl BrokerClient for RedisBroker {
    async fn queue_length(&self, queue: &str) -> Result<u64, TransportError> {
        let mut conn = self.conn.clone();
        redis::cmd("LLEN")
            .arg(queue)
            .query_async::<u64>(&mut conn)
            .await
            .map_err(|e| TransportError::new("LLEN", e.to_string()))
    }

    async fn blocking_pop(&self, queue: &str) -> Result<QueueMessage, TransportError> {
        let mut conn = self.conn.clone();
        let popped: Option<(String, String)> = redis::cmd("BLPOP")
            .arg(queue)
            .arg(0)
            .query_async(&mut conn)
            .await
            .map_err(|e| TransportError::new("BLPOP", e.to_string()))?;

        // a zero timeout never yields nil; treat it as a broker fault if it does
        let (key, payload) =
            popped.ok_or_else(|| TransportError::new("BLPOP", "unexpected nil reply"))?;
        Ok(QueueMessage::new(key, payload))
    }

    async fn push(&self, queue: &str, payload: &str) -> Result<(), TransportError> {
        let mut conn = self.conn.clone();
        redis::cmd("RPUSH")
            .arg(queue)
            .arg(payload)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| TransportError::new("RPUSH", e.to_string()))
    }
}
