//! FailureRecord - the dead-letter row written when the retry budget is spent.

use chrono::{DateTime, TimeZone};

use super::errors::QueueError;
use super::message::QueueMessage;

/// `failed_at` layout: `YYYYMMDDHHMMSS`.
pub const FAILED_AT_FORMAT: &str = "%Y%m%d%H%M%S";

/// Write-once record for the `failed_jobs` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub connection: String,
    pub queue: String,
    pub payload: String,
    pub exception: String,
    pub failed_at: String,
}

impl FailureRecord {
    pub fn new<Tz>(
        message: &QueueMessage,
        payload: impl Into<String>,
        exception: impl Into<String>,
        failed_at: DateTime<Tz>,
    ) -> Result<Self, QueueError>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let labels = message.labels()?;
        Ok(Self {
            connection: labels.connection,
            queue: labels.queue,
            payload: payload.into(),
            exception: exception.into(),
            failed_at: failed_at.format(FAILED_AT_FORMAT).to_string(),
        })
    }
}
