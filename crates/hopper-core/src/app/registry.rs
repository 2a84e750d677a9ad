//! JobRegistry - 起動時に組み立てる、キューごとのジョブ定義

use std::sync::Arc;

use crate::domain::JobDefinition;

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("a job for queue '{0}' is already registered")]
    DuplicateQueue(String),
}

#[derive(Debug, Clone, Default)]
pub struct JobRegistry {
    jobs: Vec<Arc<JobDefinition>>,
}

impl JobRegistry {
    pub fn builder() -> JobRegistryBuilder {
        JobRegistryBuilder::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<JobDefinition>> {
        self.jobs.iter()
    }

    pub fn get(&self, queue_name: &str) -> Option<&Arc<JobDefinition>> {
        self.jobs.iter().find(|job| job.queue_name() == queue_name)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

/// Collects job definitions in registration order.
#[derive(Debug, Default)]
pub struct JobRegistryBuilder {
    jobs: Vec<JobDefinition>,
}

impl JobRegistryBuilder {
    pub fn job(mut self, definition: JobDefinition) -> Self {
        self.jobs.push(definition);
        self
    }

    /// Two listeners on the same list would compete for its items, so a queue
    /// may be registered only once.
    pub fn build(self) -> Result<JobRegistry, BuildError> {
        let mut jobs: Vec<Arc<JobDefinition>> = Vec::with_capacity(self.jobs.len());
        for definition in self.jobs {
            if jobs.iter().any(|j| j.queue_name() == definition.queue_name()) {
                return Err(BuildError::DuplicateQueue(definition.queue_name().to_string()));
            }
            jobs.push(Arc::new(definition));
        }
        Ok(JobRegistry { jobs })
    }
}
