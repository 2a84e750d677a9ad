//! MySqlFailureStore - writes dead-lettered jobs into `failed_jobs`.

use async_trait::async_trait;
use sqlx::MySqlPool;

use crate::domain::{FailureRecord, TransportError};
use crate::ports::FailureStore;

pub const INSERT_FAILED_JOB: &str = "INSERT INTO failed_jobs (connection, queue, payload, exception, failed_at) VALUES (?, ?, ?, ?, ?)";

#[derive(Debug, Clone)]
pub struct MySqlFailureStore {
    pool: MySqlPool,
}

impl MySqlFailureStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

#[async_trait]
impl FailureStore for MySqlFailureStore {
    async fn insert_failure(&self, record: &FailureRecord) -> Result<(), TransportError> {
        sqlx::query(INSERT_FAILED_JOB)
            .bind(&record.connection)
            .bind(&record.queue)
            .bind(&record.payload)
            .bind(&record.exception)
            .bind(&record.failed_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, queue = %record.queue, "failed to insert failed job");
                TransportError::new("insert failed_jobs", e.to_string())
            })?;

        Ok(())
    }
}
