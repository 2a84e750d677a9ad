//! ConnectionRegistry - the process-wide set of connected handles.
//!
//! Built once during bootstrap, then shared read only (`Arc<ConnectionRegistry>`)
//! by every listener. Nothing in the runtime mutates it after startup.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::domain::{Connection, ConnectionKind, Connections, Driver, QueueError};
use crate::ports::{BrokerClient, BrokerConnector, FailureStore, SharedBroker};

#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionKind, Connection>,
    brokers: HashMap<Driver, Arc<dyn BrokerConnector>>,
    failure_store: Option<Arc<dyn FailureStore>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_connection(mut self, connection: Connection) -> Self {
        self.connections.insert(connection.kind(), connection);
        self
    }

    /// Register the connector that gives each `Driver::Redis` listener its
    /// own broker client.
    pub fn with_redis_connector(mut self, connector: Arc<dyn BrokerConnector>) -> Self {
        self.brokers.insert(Driver::Redis, connector);
        self
    }

    /// Register one client shared by every `Driver::Redis` listener.
    pub fn with_redis_broker(self, broker: Arc<dyn BrokerClient>) -> Self {
        self.with_redis_connector(Arc::new(SharedBroker(broker)))
    }

    pub fn with_failure_store(mut self, store: Arc<dyn FailureStore>) -> Self {
        self.failure_store = Some(store);
        self
    }

    /// Handles for the requested kinds. Kinds that are not configured in this
    /// process are left out; the handler decides whether that is fatal.
    pub fn resolve(&self, kinds: &[ConnectionKind]) -> Connections {
        let mut resolved = Connections::new();
        for kind in kinds {
            match self.connections.get(kind) {
                Some(connection) => resolved.insert(connection.clone()),
                None => tracing::debug!(kind = %kind, "requested connection is not configured"),
            }
        }
        resolved
    }

    /// Open the broker client for one listener of `driver`.
    pub async fn open_broker(&self, driver: &Driver) -> Result<Arc<dyn BrokerClient>, QueueError> {
        if let Driver::Unsupported(name) = driver {
            return Err(QueueError::UnsupportedDriver(name.clone()));
        }
        let connector = self.brokers.get(driver).ok_or_else(|| {
            QueueError::Configuration(format!("no broker configured for driver '{driver}'"))
        })?;
        Ok(connector.connect().await?)
    }

    pub fn failure_store(&self) -> Result<Arc<dyn FailureStore>, QueueError> {
        self.failure_store
            .clone()
            .ok_or_else(|| QueueError::Configuration("no failure store configured".to_string()))
    }

    pub fn configured_kinds(&self) -> Vec<ConnectionKind> {
        let mut kinds: Vec<_> = self.connections.keys().copied().collect();
        kinds.sort();
        kinds
    }
}

impl fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("connections", &self.configured_kinds())
            .field("brokers", &self.brokers.keys().collect::<Vec<_>>())
            .field("failure_store", &self.failure_store.is_some())
            .finish()
    }
}
