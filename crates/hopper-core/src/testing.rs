//! Test doubles shared by the unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::domain::{Connections, FailureRecord, HandlerError, QueueMessage, TransportError};
use crate::impls::InMemoryBroker;
use crate::ports::{BrokerClient, BrokerConnector, FailureStore};
use crate::typed::JobHandler;

/// Handler that always fails with the same message.
pub struct FailingHandler {
    message: String,
    calls: AtomicUsize,
}

impl FailingHandler {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobHandler for FailingHandler {
    async fn execute(&self, _payload: &str, _connections: &Connections) -> Result<(), HandlerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(HandlerError::failed(self.message.clone()))
    }
}

/// Handler that succeeds and remembers what it saw.
#[derive(Default)]
pub struct RecordingHandler {
    payloads: Mutex<Vec<String>>,
    connection_counts: Mutex<Vec<usize>>,
}

impl RecordingHandler {
    pub fn payloads(&self) -> Vec<String> {
        self.payloads.lock().unwrap().clone()
    }

    pub fn connection_counts(&self) -> Vec<usize> {
        self.connection_counts.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobHandler for RecordingHandler {
    async fn execute(&self, payload: &str, connections: &Connections) -> Result<(), HandlerError> {
        self.payloads.lock().unwrap().push(payload.to_string());
        self.connection_counts.lock().unwrap().push(connections.len());
        Ok(())
    }
}

pub struct PanickingHandler;

#[async_trait]
impl JobHandler for PanickingHandler {
    async fn execute(&self, _payload: &str, _connections: &Connections) -> Result<(), HandlerError> {
        panic!("handler blew up");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokerCall {
    Length(String),
    Pop(String),
    Push { queue: String, payload: String },
}

/// Broker that replays scripted answers and records every call.
///
/// An exhausted length/pop script answers with a `script exhausted` error,
/// which ends any listener loop driving it.
#[derive(Default)]
pub struct ScriptedBroker {
    lengths: Mutex<VecDeque<Result<u64, TransportError>>>,
    pops: Mutex<VecDeque<Result<QueueMessage, TransportError>>>,
    push_error: Mutex<Option<TransportError>>,
    calls: Mutex<Vec<BrokerCall>>,
}

impl ScriptedBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lengths(self, lengths: Vec<Result<u64, TransportError>>) -> Self {
        *self.lengths.lock().unwrap() = lengths.into();
        self
    }

    pub fn with_pops(self, pops: Vec<Result<QueueMessage, TransportError>>) -> Self {
        *self.pops.lock().unwrap() = pops.into();
        self
    }

    pub fn failing_push(self, error: TransportError) -> Self {
        *self.push_error.lock().unwrap() = Some(error);
        self
    }

    pub fn calls(&self) -> Vec<BrokerCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn pushes(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                BrokerCall::Push { queue, payload } => Some((queue, payload)),
                _ => None,
            })
            .collect()
    }

    pub fn pop_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, BrokerCall::Pop(_)))
            .count()
    }
}

pub fn exhausted(op: &'static str) -> TransportError {
    TransportError::new(op, "script exhausted")
}

#[async_trait]
impl BrokerClient for ScriptedBroker {
    async fn queue_length(&self, queue: &str) -> Result<u64, TransportError> {
        self.calls.lock().unwrap().push(BrokerCall::Length(queue.to_string()));
        self.lengths
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(exhausted("LLEN")))
    }

    async fn blocking_pop(&self, queue: &str) -> Result<QueueMessage, TransportError> {
        self.calls.lock().unwrap().push(BrokerCall::Pop(queue.to_string()));
        self.pops
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(exhausted("BLPOP")))
    }

    async fn push(&self, queue: &str, payload: &str) -> Result<(), TransportError> {
        self.calls.lock().unwrap().push(BrokerCall::Push {
            queue: queue.to_string(),
            payload: payload.to_string(),
        });
        match self.push_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Failure store whose insert always fails.
#[derive(Default)]
pub struct BrokenStore {
    attempts: AtomicUsize,
}

impl BrokenStore {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FailureStore for BrokenStore {
    async fn insert_failure(&self, _record: &FailureRecord) -> Result<(), TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(TransportError::new("insert failed_jobs", "deadlock found"))
    }
}

/// Connector that counts how many listener clients were opened.
pub struct CountingConnector {
    broker: InMemoryBroker,
    opened: AtomicUsize,
    refuse: Option<String>,
}

impl CountingConnector {
    pub fn new(broker: InMemoryBroker) -> Self {
        Self {
            broker,
            opened: AtomicUsize::new(0),
            refuse: None,
        }
    }

    pub fn refusing(mut self, message: impl Into<String>) -> Self {
        self.refuse = Some(message.into());
        self
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrokerConnector for CountingConnector {
    async fn connect(&self) -> Result<Arc<dyn BrokerClient>, TransportError> {
        if let Some(message) = &self.refuse {
            return Err(TransportError::new("redis connect", message.clone()));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(self.broker.clone()))
    }
}

/// Broker that forwards each call to the client registered for its queue.
#[derive(Default)]
pub struct RoutedBroker {
    routes: HashMap<String, Arc<dyn BrokerClient>>,
}

impl RoutedBroker {
    pub fn route(mut self, queue: &str, broker: Arc<dyn BrokerClient>) -> Self {
        self.routes.insert(queue.to_string(), broker);
        self
    }

    fn target(&self, queue: &str) -> Result<&Arc<dyn BrokerClient>, TransportError> {
        self.routes
            .get(queue)
            .ok_or_else(|| TransportError::new("route", format!("no route for {queue}")))
    }
}

#[async_trait]
impl BrokerClient for RoutedBroker {
    async fn queue_length(&self, queue: &str) -> Result<u64, TransportError> {
        self.target(queue)?.queue_length(queue).await
    }

    async fn blocking_pop(&self, queue: &str) -> Result<QueueMessage, TransportError> {
        self.target(queue)?.blocking_pop(queue).await
    }

    async fn push(&self, queue: &str, payload: &str) -> Result<(), TransportError> {
        self.target(queue)?.push(queue, payload).await
    }
}
