//! FailureStore port - durable sink for dead-lettered jobs.

use async_trait::async_trait;

use crate::domain::{FailureRecord, TransportError};

/// Conceptually `INSERT INTO failed_jobs (connection, queue, payload, exception, failed_at)`.
///
/// Schema management is the store's own business.
#[async_trait]
pub trait FailureStore: Send + Sync {
    async fn insert_failure(&self, record: &FailureRecord) -> Result<(), TransportError>;
}
