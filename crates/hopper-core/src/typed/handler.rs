//! Handler traits.
//!
//! - `JobHandler`: object safe, receives the raw payload. This is what a
//!   `JobDefinition` stores.
//! - `Handler<T>`: typed surface; `TypedHandler<T, H>` erases it into a
//!   `JobHandler` by decoding the payload with serde_json first.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;

use super::job::Job;
use crate::domain::{Connections, HandlerError};

#[async_trait]
pub trait JobHandler: Send + Sync + 'static {
    async fn execute(&self, payload: &str, connections: &Connections) -> Result<(), HandlerError>;
}

#[async_trait]
pub trait Handler<T: Job>: Send + Sync + 'static {
    async fn handle(&self, job: T, connections: &Connections) -> Result<(), HandlerError>;
}

pub struct TypedHandler<T: Job, H: Handler<T>> {
    handler: H,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Job, H: Handler<T>> TypedHandler<T, H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            _marker: PhantomData,
        }
    }

    /// Wrap and erase in one go, ready for `JobDefinition::new`.
    pub fn shared(handler: H) -> Arc<dyn JobHandler> {
        Arc::new(Self::new(handler))
    }
}

#[async_trait]
impl<T: Job, H: Handler<T>> JobHandler for TypedHandler<T, H> {
    async fn execute(&self, payload: &str, connections: &Connections) -> Result<(), HandlerError> {
        let job: T = serde_json::from_str(payload)
            .map_err(|e| HandlerError::Decode(format!("{}: {e}", T::NAME)))?;
        self.handler.handle(job, connections).await
    }
}
