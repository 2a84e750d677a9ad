//! QueueListener - 1 キューを消費し続けるループ
//!
//! ```text
//! CheckLength --len < 1--> Idle (sleep) --> CheckLength
//! CheckLength --len >= 1--> Pop (blocking) --> Dispatch --> CheckLength
//! any error --> Terminated(err)
//! ```
//!
//! Shutdown is cooperative: the flag is looked at before every length check
//! and during the idle sleep. A blocking pop in progress is not interrupted.
//!
//! # 学習ポイント
//! - `watch::Receiver` による協調的 shutdown
//! - `tokio::pin!` + `select!` で sleep と shutdown を競合させる
//! - sender が drop されたら以降は普通に sleep するだけ

use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info};

use super::engine::DispatchEngine;
use crate::domain::QueueError;

/// Sleep between length checks while the queue is empty.
pub const DEFAULT_IDLE_INTERVAL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerConfig {
    pub idle_interval: Duration,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            idle_interval: DEFAULT_IDLE_INTERVAL,
        }
    }
}

pub struct QueueListener {
    engine: DispatchEngine,
    config: ListenerConfig,
    shutdown: Option<watch::Receiver<bool>>,
}

impl QueueListener {
    pub fn new(engine: DispatchEngine, config: ListenerConfig) -> Self {
        Self {
            engine,
            config,
            shutdown: None,
        }
    }

    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn queue_name(&self) -> &str {
        self.engine.job().queue_name()
    }

    /// Consume until an error occurs or shutdown is requested.
    ///
    /// Returns `Ok(())` only on shutdown. Every error is logged here and then
    /// returned to the caller unchanged.
    pub async fn run(mut self) -> Result<(), QueueError> {
        let queue = self.engine.job().queue_name().to_string();
        let broker = self.engine.broker().clone();
        info!(queue = %queue, "listening");

        loop {
            if self.shutdown_requested() {
                info!(queue = %queue, "shutdown requested, listener stopping");
                return Ok(());
            }

            let length = broker.queue_length(&queue).await.map_err(|e| {
                error!(queue = %queue, error = %e, "failed to read queue length");
                QueueError::from(e)
            })?;

            if length < 1 {
                debug!(queue = %queue, "queue empty, idling");
                self.idle().await;
                continue;
            }

            let message = broker.blocking_pop(&queue).await.map_err(|e| {
                error!(queue = %queue, error = %e, "failed to pop job");
                QueueError::from(e)
            })?;

            if let Err(e) = self.engine.dispatch(message).await {
                error!(queue = %queue, error = %e, "dispatch failed, listener stopping");
                return Err(e);
            }
        }
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Sleep for the idle interval, waking early on a shutdown signal.
    async fn idle(&mut self) {
        let sleep = tokio::time::sleep(self.config.idle_interval);
        tokio::pin!(sleep);

        let Some(rx) = self.shutdown.as_mut() else {
            sleep.await;
            return;
        };

        // 変更が入ったら呼び出し側のループで判定
        let sender_gone = tokio::select! {
            _ = &mut sleep => false,
            changed = rx.changed() => changed.is_err(),
        };

        if sender_gone {
            // nobody can request shutdown anymore
            self.shutdown = None;
            sleep.await;
        }
    }
}
