//! DispatchEngine - runs one handler attempt per popped message and settles
//! its outcome.
//!
//! # Flow
//! 1. Resolve the job's declared connections
//! 2. Run the handler (returned errors and panics are the same thing: a failed attempt)
//! 3. On failure: decode the envelope, bump `attempts`, then either
//!    - requeue a new payload at the tail of the same queue, or
//!    - write a failure record once `attempts > max_attempts`
//!
//! Each listener owns its own engine; the only shared state is the read-only
//! `ConnectionRegistry`.

use std::any::Any;
use std::sync::Arc;

use tracing::{error, info, warn};

use super::connections::ConnectionRegistry;
use crate::domain::{
    Connections, DispatchOutcome, Driver, FailureRecord, HandlerError, JobDefinition,
    PayloadEnvelope, QueueError, QueueMessage,
};
use crate::ports::{BrokerClient, Clock, SystemClock};

pub struct DispatchEngine {
    job: Arc<JobDefinition>,
    connections: Arc<ConnectionRegistry>,
    broker: Arc<dyn BrokerClient>,
    clock: Arc<dyn Clock>,
}

impl DispatchEngine {
    pub fn new(
        job: Arc<JobDefinition>,
        connections: Arc<ConnectionRegistry>,
        broker: Arc<dyn BrokerClient>,
    ) -> Self {
        Self {
            job,
            connections,
            broker,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn job(&self) -> &JobDefinition {
        &self.job
    }

    pub fn broker(&self) -> &Arc<dyn BrokerClient> {
        &self.broker
    }

    /// Run one dispatch cycle.
    ///
    /// `Ok` means nothing is left to do for this message, including the case
    /// where the handler failed but the failure was requeued or recorded.
    /// `Err` is an I/O or configuration problem and ends the listener.
    pub async fn dispatch(&self, message: QueueMessage) -> Result<DispatchOutcome, QueueError> {
        let queue = self.job.queue_name();
        let connections = self.connections.resolve(self.job.required_connections());

        match self.invoke(&message, connections).await {
            Ok(()) => {
                info!(queue, "processed");
                Ok(DispatchOutcome::Processed)
            }
            Err(err) => {
                warn!(queue, error = %err, "failed");
                self.settle_failure(&message, &err).await
            }
        }
    }

    /// Increment `attempts` in the envelope and decide whether to requeue.
    pub fn check_attempts(&self, envelope: &mut PayloadEnvelope) -> (u64, bool) {
        let attempts = envelope.bump_attempts();
        (attempts, self.job.should_requeue(attempts))
    }

    async fn invoke(
        &self,
        message: &QueueMessage,
        connections: Connections,
    ) -> Result<(), HandlerError> {
        let handler = Arc::clone(self.job.handler());
        let payload = message.raw_payload().to_string();

        // own task, so a panicking handler only fails this attempt
        let attempt = tokio::spawn(async move { handler.execute(&payload, &connections).await });

        match attempt.await {
            Ok(result) => result,
            Err(join_err) if join_err.is_panic() => {
                Err(HandlerError::Panicked(panic_message(join_err.into_panic())))
            }
            Err(join_err) => Err(HandlerError::Panicked(join_err.to_string())),
        }
    }

    async fn settle_failure(
        &self,
        message: &QueueMessage,
        handler_error: &HandlerError,
    ) -> Result<DispatchOutcome, QueueError> {
        let queue = self.job.queue_name();
        let (mut envelope, decoded) = match PayloadEnvelope::try_decode(message.raw_payload()) {
            Ok(envelope) => (envelope, true),
            Err(e) => {
                warn!(queue, error = %e, "failed to decode payload, using empty envelope");
                (PayloadEnvelope::default(), false)
            }
        };

        let (attempts, requeue) = self.check_attempts(&mut envelope);

        if requeue {
            self.requeue(&envelope).await?;
            info!(queue, attempts, job_id = envelope.id().unwrap_or("-"), "requeued");
            return Ok(DispatchOutcome::Requeued { attempts });
        }

        error!(
            queue,
            attempts,
            max_attempts = self.job.max_attempts(),
            job_id = envelope.id().unwrap_or("-"),
            "job failed more times than allowed"
        );

        let payload = if decoded {
            envelope.encode()
        } else {
            message.raw_payload().to_string()
        };
        self.dead_letter(message, payload, handler_error).await?;
        Ok(DispatchOutcome::DeadLettered { attempts })
    }

    async fn requeue(&self, envelope: &PayloadEnvelope) -> Result<(), QueueError> {
        let queue = self.job.queue_name();
        let payload = envelope.encode();

        match self.job.driver() {
            Driver::Redis => self.broker.push(queue, &payload).await.map_err(|source| {
                error!(queue, error = %source, "failed to requeue job");
                QueueError::RequeuePush {
                    queue: queue.to_string(),
                    source,
                }
            }),
            Driver::Unsupported(name) => Err(QueueError::UnsupportedDriver(name.clone())),
        }
    }

    async fn dead_letter(
        &self,
        message: &QueueMessage,
        payload: String,
        handler_error: &HandlerError,
    ) -> Result<(), QueueError> {
        let queue = self.job.queue_name();
        let record = FailureRecord::new(message, payload, handler_error.to_string(), self.clock.now())?;
        let store = self.connections.failure_store()?;

        store.insert_failure(&record).await.map_err(|source| {
            error!(queue, error = %source, "failed to save failed job");
            QueueError::FailureStorePersist {
                queue: queue.to_string(),
                source,
            }
        })
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
