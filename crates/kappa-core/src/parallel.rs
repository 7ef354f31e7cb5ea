//! Concurrent batch processing.
//!
//! Tasks are independent, so [`BatchRunner`] fetches and scores them on a
//! Tokio `JoinSet`, bounded by a semaphore. Each worker builds all of its
//! rows locally and appends them to the shared summary under a single lock,
//! so one task's rows are never interleaved with another's.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tracing::debug;

use crate::domain::{KappaError, RaterSubmission, Result, TaskId, TaskInput};
use crate::engine::Engine;
use crate::obs;
use crate::summary::BatchSummary;

/// Injectable provider of rater submissions.
///
/// Implement this to plug in an issue tracker, a local directory or a test
/// stub. A rater whose file cannot be read should be returned as
/// [`RaterSubmission::unreadable`], not as an error; `Err` means the whole
/// task could not be listed.
#[async_trait]
pub trait SubmissionSource: Send + Sync {
    async fn fetch_submissions(&self, task_id: &str) -> Result<Vec<RaterSubmission>>;
}

/// Default number of tasks processed at once.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Fetches and scores many tasks concurrently.
pub struct BatchRunner {
    engine: Arc<Engine>,
    source: Arc<dyn SubmissionSource>,
    max_concurrency: usize,
}

impl BatchRunner {
    pub fn new(engine: Arc<Engine>, source: Arc<dyn SubmissionSource>) -> Self {
        Self {
            engine,
            source,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max.max(1);
        self
    }

    /// Score every task in `task_ids`.
    ///
    /// A task whose source fails contributes no rows. The returned summary is
    /// ordered like `task_ids`, whatever order the workers finished in.
    pub async fn run(&self, task_ids: &[TaskId]) -> Result<BatchSummary> {
        let started = Instant::now();
        let summary = Arc::new(Mutex::new(BatchSummary::new()));
        let permits = Arc::new(Semaphore::new(self.max_concurrency));
        let mut join_set = JoinSet::new();

        for task_id in task_ids.iter().cloned() {
            let engine = Arc::clone(&self.engine);
            let source = Arc::clone(&self.source);
            let summary = Arc::clone(&summary);
            let permits = Arc::clone(&permits);

            join_set.spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| KappaError::Worker(e.to_string()))?;

                let submissions = match source.fetch_submissions(&task_id).await {
                    Ok(submissions) => submissions,
                    Err(err) => {
                        obs::emit_source_error(&task_id, &err);
                        return Ok::<usize, KappaError>(0);
                    }
                };

                let outcome = engine.process_task(&TaskInput::new(task_id.clone(), submissions));
                let rows = outcome.rows();
                let appended = rows.len();
                summary.lock().await.extend_task(rows);
                debug!(task_id = %task_id, rows = appended, "task rows appended");
                Ok::<usize, KappaError>(appended)
            });
        }

        while let Some(joined) = join_set.join_next().await {
            joined.map_err(|e| KappaError::Worker(e.to_string()))??;
        }

        let mut summary = Arc::try_unwrap(summary)
            .map_err(|_| KappaError::Worker("summary still shared after join".to_string()))?
            .into_inner();
        summary.sort_by_task_order(task_ids);

        obs::emit_batch_finished(
            task_ids.len(),
            summary.len(),
            started.elapsed().as_millis() as u64,
        );
        Ok(summary)
    }
}
