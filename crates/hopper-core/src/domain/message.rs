//! QueueMessage - one item as produced by a single blocking pop.

use super::errors::QueueError;

/// Separator between the prefix and the name in a queue key (`queues:sample`).
pub const KEY_SEPARATOR: char = ':';

/// The `(key, payload)` pair returned by one pop.
///
/// Both halves always come from the same pop; a retry never mutates a message
/// in place, it pushes a brand-new payload (see `DispatchEngine`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    queue_key: String,
    raw_payload: String,
}

/// Labels written into a failure record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueLabels {
    pub connection: String,
    pub queue: String,
}

impl QueueMessage {
    pub fn new(queue_key: impl Into<String>, raw_payload: impl Into<String>) -> Self {
        Self {
            queue_key: queue_key.into(),
            raw_payload: raw_payload.into(),
        }
    }

    pub fn queue_key(&self) -> &str {
        &self.queue_key
    }

    pub fn raw_payload(&self) -> &str {
        &self.raw_payload
    }

    /// Derive the failure-record labels from the queue key.
    ///
    /// The second `:` segment is used for both labels.
    // NOTE: the connection label duplicating the queue name is the observed
    // behavior of failed_jobs rows; keep it until the consumers of that table
    // agree on a driver-based label.
    pub fn labels(&self) -> Result<QueueLabels, QueueError> {
        let name = self
            .queue_key
            .split(KEY_SEPARATOR)
            .nth(1)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| QueueError::PopDecode(self.queue_key.clone()))?;

        Ok(QueueLabels {
            connection: name.to_string(),
            queue: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_use_second_segment_twice() {
        let msg = QueueMessage::new("queues:sample", "{}");
        let labels = msg.labels().unwrap();
        assert_eq!(labels.connection, "sample");
        assert_eq!(labels.queue, "sample");
    }

    #[test]
    fn labels_ignore_trailing_segments() {
        let msg = QueueMessage::new("a:b:c", "{}");
        assert_eq!(msg.labels().unwrap().queue, "b");
    }

    #[test]
    fn key_without_separator_is_a_decode_error() {
        let msg = QueueMessage::new("sample", "{}");
        assert!(matches!(msg.labels(), Err(QueueError::PopDecode(key)) if key == "sample"));

        let msg = QueueMessage::new("queues:", "{}");
        assert!(matches!(msg.labels(), Err(QueueError::PopDecode(_))));
    }
}
