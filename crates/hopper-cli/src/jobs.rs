//! Job providers: the static list of queues this binary consumes.
//!
//! Add a job by appending a `JobDefinition` to `registry()`.

use async_trait::async_trait;
use hopper_core::app::JobRegistry;
use hopper_core::domain::{ConnectionKind, HandlerError, JobDefinition};
use hopper_core::typed::{Handler, Job, TypedHandler};
use hopper_core::Connections;
use mongodb::bson::doc;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;

pub fn registry() -> anyhow::Result<JobRegistry> {
    let jobs = JobRegistry::builder()
        .job(JobDefinition::new(
            "queues:sample",
            "redis",
            TypedHandler::shared(SampleHandler),
            3,
            vec![ConnectionKind::Mongo],
        ))
        .build()?;
    Ok(jobs)
}

#[derive(Debug, Deserialize)]
pub struct SampleJob {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub fail: bool,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl Job for SampleJob {
    const NAME: &'static str = "sample";
}

/// Logs the job after checking that mongo answers a ping.
///
/// A payload with `"fail": true` fails on purpose, which exercises the
/// requeue and failed_jobs paths end to end.
pub struct SampleHandler;

#[async_trait]
impl Handler<SampleJob> for SampleHandler {
    async fn handle(&self, job: SampleJob, connections: &Connections) -> Result<(), HandlerError> {
        let mongo = connections.mongo()?;
        mongo
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| HandlerError::failed(format!("mongo ping: {e}")))?;

        if job.fail {
            return Err(HandlerError::failed("sample job asked to fail"));
        }

        info!(
            job_id = job.id.as_deref().unwrap_or("-"),
            fields = job.data.len(),
            "sample job handled"
        );
        Ok(())
    }
}
