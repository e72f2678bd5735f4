// task_executor.rs
// Runs the work function on a single chunk task, applying the optional timeout
// and turning failures into TaskFailure errors that name the chunk.
use crate::error::{Error, FailureCause, Result};
use crate::task::ChunkTask;
use crate::workload::ChunkWork;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskExecutor {
    pub timeout: Option<Duration>,
}

impl TaskExecutor {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    /// Executes `work` on the task's chunk. No retries.
    pub async fn execute<W: ChunkWork>(&self, task: ChunkTask, work: &W) -> Result<W::Output> {
        let ChunkTask {
            task_id,
            span,
            chunk,
        } = task;
        let start_time = Instant::now();
        tracing::debug!("Task {task_id} started on chunk #{} ({span})", span.index);

        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, work.compute(chunk)).await {
                Ok(outcome) => outcome.map_err(FailureCause::Failed),
                Err(_) => Err(FailureCause::TimedOut(limit)),
            },
            None => work.compute(chunk).await.map_err(FailureCause::Failed),
        };

        match outcome {
            Ok(output) => {
                tracing::debug!("Task {task_id} completed in {:?}", start_time.elapsed());
                Ok(output)
            }
            Err(cause) => {
                tracing::warn!("Task {task_id} failed after {:?}: {cause}", start_time.elapsed());
                Err(Error::TaskFailure {
                    index: span.index,
                    span,
                    cause,
                })
            }
        }
    }
}
