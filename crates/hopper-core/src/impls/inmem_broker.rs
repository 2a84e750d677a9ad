//! In-memory adapters（開発・テスト用）
//!
//! - `InMemoryBroker`: キーごとの FIFO リスト、`Notify` で blocking pop を起こす
//! - `InMemoryFailureStore`: insert されたレコードを全部保持する
//!
//! # 学習ポイント
//! - `Notify::notified()` を先に enable してから中身を見る（通知の取りこぼし防止）
//! - ロックは await を跨がない

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use crate::domain::{FailureRecord, QueueMessage, TransportError};
use crate::ports::{BrokerClient, FailureStore};

#[derive(Debug, Clone, Default)]
pub struct InMemoryBroker {
    lists: Arc<Mutex<HashMap<String, VecDeque<String>>>>,
    notify: Arc<Notify>,
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the items currently waiting on `queue`, head first.
    pub async fn items(&self, queue: &str) -> Vec<String> {
        let lists = self.lists.lock().await;
        lists
            .get(queue)
            .map(|list| list.iter().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl BrokerClient for InMemoryBroker {
    async fn queue_length(&self, queue: &str) -> Result<u64, TransportError> {
        let lists = self.lists.lock().await;
        Ok(lists.get(queue).map_or(0, |list| list.len() as u64))
    }

    async fn blocking_pop(&self, queue: &str) -> Result<QueueMessage, TransportError> {
        loop {
            // register interest before looking, so a push between the check
            // and the await is not missed
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut lists = self.lists.lock().await;
                if let Some(payload) = lists.get_mut(queue).and_then(VecDeque::pop_front) {
                    return Ok(QueueMessage::new(queue, payload));
                }
            }

            notified.await;
        }
    }

    async fn push(&self, queue: &str, payload: &str) -> Result<(), TransportError> {
        {
            let mut lists = self.lists.lock().await;
            lists
                .entry(queue.to_string())
                .or_default()
                .push_back(payload.to_string());
        }
        self.notify.notify_waiters();
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryFailureStore {
    records: Arc<Mutex<Vec<FailureRecord>>>,
}

impl InMemoryFailureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<FailureRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl FailureStore for InMemoryFailureStore {
    async fn insert_failure(&self, record: &FailureRecord) -> Result<(), TransportError> {
        self.records.lock().await.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn push_then_pop_is_fifo() {
        let broker = InMemoryBroker::new();
        broker.push("queues:a", "1").await.unwrap();
        broker.push("queues:a", "2").await.unwrap();

        assert_eq!(broker.queue_length("queues:a").await.unwrap(), 2);
        let first = broker.blocking_pop("queues:a").await.unwrap();
        assert_eq!(first, QueueMessage::new("queues:a", "1"));
        assert_eq!(broker.items("queues:a").await, vec!["2".to_string()]);
    }

    #[tokio::test]
    async fn unknown_queue_is_empty() {
        let broker = InMemoryBroker::new();
        assert_eq!(broker.queue_length("nope").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn push_wakes_blocked_pop() {
        let broker = InMemoryBroker::new();

        let waiter = tokio::spawn({
            let broker = broker.clone();
            async move { broker.blocking_pop("queues:b").await.unwrap() }
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        broker.push("queues:other", "x").await.unwrap();
        broker.push("queues:b", "y").await.unwrap();

        let popped = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(popped.raw_payload(), "y");
        assert_eq!(broker.items("queues:other").await, vec!["x".to_string()]);
    }

    #[tokio::test]
    async fn failure_store_keeps_records() {
        let store = InMemoryFailureStore::new();
        let record = FailureRecord {
            connection: "a".into(),
            queue: "a".into(),
            payload: "{}".into(),
            exception: "e".into(),
            failed_at: "20240101000000".into(),
        };
        store.insert_failure(&record).await.unwrap();
        assert_eq!(store.records().await, vec![record]);
    }
}
