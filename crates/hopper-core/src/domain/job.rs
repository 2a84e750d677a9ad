//! JobDefinition - static per-queue configuration.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::connection::ConnectionKind;
use super::errors::QueueError;
use crate::typed::JobHandler;

/// Broker technology a job is polled and requeued through.
///
/// Unknown names are kept (instead of rejected at parse time) so the failure
/// surfaces where the driver is actually used.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Driver {
    Redis,
    Unsupported(String),
}

impl Driver {
    pub fn as_str(&self) -> &str {
        match self {
            Driver::Redis => "redis",
            Driver::Unsupported(name) => name,
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Driver {
    fn from(s: &str) -> Self {
        match s {
            "redis" => Driver::Redis,
            other => Driver::Unsupported(other.to_string()),
        }
    }
}

impl FromStr for Driver {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Driver::from(s))
    }
}

/// One configured queue: where to poll, what to run, how often to retry.
///
/// Immutable after construction; listeners share it through an `Arc`.
#[derive(Clone)]
pub struct JobDefinition {
    queue_name: String,
    driver: Driver,
    handler: Arc<dyn JobHandler>,
    max_attempts: u64,
    required_connections: Vec<ConnectionKind>,
}

impl JobDefinition {
    pub fn new(
        queue_name: impl Into<String>,
        driver: impl Into<Driver>,
        handler: Arc<dyn JobHandler>,
        max_attempts: u64,
        required_connections: Vec<ConnectionKind>,
    ) -> Self {
        // ordered set: keep the first occurrence of each kind
        let mut unique: Vec<ConnectionKind> = Vec::with_capacity(required_connections.len());
        for kind in required_connections {
            if !unique.contains(&kind) {
                unique.push(kind);
            }
        }

        Self {
            queue_name: queue_name.into(),
            driver: driver.into(),
            handler,
            max_attempts,
            required_connections: unique,
        }
    }

    /// Same as `new`, taking connection names as they appear in configuration.
    pub fn from_names(
        queue_name: impl Into<String>,
        driver: &str,
        handler: Arc<dyn JobHandler>,
        max_attempts: u64,
        connection_names: &[&str],
    ) -> Result<Self, QueueError> {
        let kinds = connection_names
            .iter()
            .map(|name| name.parse::<ConnectionKind>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(queue_name, driver, handler, max_attempts, kinds))
    }

    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }

    pub fn driver(&self) -> &Driver {
        &self.driver
    }

    pub fn handler(&self) -> &Arc<dyn JobHandler> {
        &self.handler
    }

    pub fn max_attempts(&self) -> u64 {
        self.max_attempts
    }

    pub fn required_connections(&self) -> &[ConnectionKind] {
        &self.required_connections
    }

    /// Retry decision: `true` while the post-increment attempt count is
    /// still within `max_attempts` (inclusive). A saturated count is
    /// always exhausted.
    pub fn should_requeue(&self, attempts: u64) -> bool {
        attempts != u64::MAX && attempts <= self.max_attempts
    }
}

impl fmt::Debug for JobDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobDefinition")
            .field("queue_name", &self.queue_name)
            .field("driver", &self.driver)
            .field("max_attempts", &self.max_attempts)
            .field("required_connections", &self.required_connections)
            .finish_non_exhaustive()
    }
}
