//! ListenerSupervisor - ジョブごとに 1 本の listener タスクを起動・管理
//!
//! # 学習ポイント
//! - `JoinSet` で終了順にタスクを回収する
//! - listener ごとに DispatchEngine を持たせ、共有するのは読み取り専用の
//!   ConnectionRegistry だけ（ロック不要）
//!
//! Every listener is spawned. Each task opens its own broker client, runs its
//! listener, and logs how it ended with the queue name. A listener that fails
//! (at launch or later) does not stop its siblings. Exits are collected in
//! completion order.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::{Id, JoinSet};
use tracing::{error, info};

use super::connections::ConnectionRegistry;
use super::engine::DispatchEngine;
use super::listener::{ListenerConfig, QueueListener};
use super::registry::JobRegistry;
use crate::domain::{JobDefinition, QueueError};
use crate::ports::{Clock, SystemClock};

/// How one listener ended.
#[derive(Debug)]
pub struct ListenerExit {
    pub queue: String,
    pub result: Result<(), QueueError>,
}

pub struct ListenerSupervisor {
    jobs: JobRegistry,
    connections: Arc<ConnectionRegistry>,
    config: ListenerConfig,
    clock: Arc<dyn Clock>,
}

impl ListenerSupervisor {
    pub fn new(jobs: JobRegistry, connections: ConnectionRegistry) -> Self {
        Self {
            jobs,
            connections: Arc::new(connections),
            config: ListenerConfig::default(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_listener_config(mut self, config: ListenerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Launch one listener per job, in registration order.
    pub fn spawn(self) -> SupervisorHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let mut tasks = JoinSet::new();
        let mut queues = Vec::with_capacity(self.jobs.len());
        let mut task_queues = HashMap::with_capacity(self.jobs.len());

        for job in self.jobs.iter() {
            let queue = job.queue_name().to_string();
            info!(
                queue = %queue,
                driver = %job.driver(),
                max_attempts = job.max_attempts(),
                "launching listener"
            );

            let listener = launch(
                Arc::clone(job),
                Arc::clone(&self.connections),
                Arc::clone(&self.clock),
                self.config,
                shutdown_rx.clone(),
            );
            let task_queue = queue.clone();
            let abort = tasks.spawn(async move {
                let result = listener.await;
                match &result {
                    Ok(()) => info!(queue = %task_queue, "listener stopped"),
                    Err(e) => error!(queue = %task_queue, error = %e, "listener stopped"),
                }
                ListenerExit {
                    queue: task_queue,
                    result,
                }
            });

            task_queues.insert(abort.id(), queue.clone());
            queues.push(queue);
        }

        SupervisorHandle {
            shutdown_tx,
            queues,
            tasks,
            task_queues,
        }
    }

    /// Spawn every listener and wait until all of them have exited.
    pub async fn run(self) -> Vec<ListenerExit> {
        self.spawn().join().await
    }
}

/// Everything one listener task does: open its broker, then consume.
async fn launch(
    job: Arc<JobDefinition>,
    connections: Arc<ConnectionRegistry>,
    clock: Arc<dyn Clock>,
    config: ListenerConfig,
    shutdown: watch::Receiver<bool>,
) -> Result<(), QueueError> {
    let broker = connections.open_broker(job.driver()).await?;
    let engine = DispatchEngine::new(job, connections, broker).with_clock(clock);
    QueueListener::new(engine, config)
        .with_shutdown(shutdown)
        .run()
        .await
}

/// Handle to the running listeners.
///
/// Dropping the handle aborts every listener task.
pub struct SupervisorHandle {
    shutdown_tx: watch::Sender<bool>,
    queues: Vec<String>,
    tasks: JoinSet<ListenerExit>,
    task_queues: HashMap<Id, String>,
}

impl SupervisorHandle {
    /// Queues in launch order.
    pub fn queues(&self) -> impl Iterator<Item = &str> {
        self.queues.iter().map(String::as_str)
    }

    /// A sender that can request shutdown from another task.
    pub fn shutdown_sender(&self) -> watch::Sender<bool> {
        self.shutdown_tx.clone()
    }

    /// Ask every listener to stop at its next check point.
    pub fn request_shutdown(&self) {
        // receivers are gone once every listener has exited
        let _ = self.shutdown_tx.send(true);
    }

    /// The next listener to finish, or `None` once all have been collected.
    pub async fn next_exit(&mut self) -> Option<ListenerExit> {
        let exit = match self.tasks.join_next_with_id().await? {
            Ok((_, exit)) => exit,
            Err(join_err) => {
                // the task itself panicked or was cancelled
                let queue = self
                    .task_queues
                    .get(&join_err.id())
                    .cloned()
                    .unwrap_or_default();
                error!(queue = %queue, error = %join_err, "listener task aborted");
                ListenerExit {
                    queue,
                    result: Err(QueueError::ListenerAborted(join_err.to_string())),
                }
            }
        };
        Some(exit)
    }

    /// Wait for every listener; exits arrive in completion order.
    pub async fn join(mut self) -> Vec<ListenerExit> {
        let mut exits = Vec::with_capacity(self.queues.len());
        while let Some(exit) = self.next_exit().await {
            exits.push(exit);
        }
        exits
    }

    pub async fn shutdown_and_join(self) -> Vec<ListenerExit> {
        self.request_shutdown();
        self.join().await
    }
}
