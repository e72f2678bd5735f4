// scheduler.rs
// Fan-out runner: one Tokio task per chunk, results gathered back in chunk order.
use crate::error::{Error, FailureCause, Result};
use crate::task::ChunkTask;
use crate::task_executor::TaskExecutor;
use crate::types::{Chunk, ChunkSpan};
use crate::workload::ChunkWork;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{Id, JoinError, JoinSet};
use uuid::Uuid;

/// When the per-chunk tasks start running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StartMode {
    /// Every task is spawned as soon as the batch is launched.
    #[default]
    Eager,
    /// Tasks are spawned only once the caller starts waiting on the batch.
    Lazy,
}

/// Fan-out runner settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunnerConfig {
    pub start: StartMode,
    /// Per-task limit. `None` lets every task run as long as it needs.
    pub task_timeout: Option<Duration>,
}

/// Launches one independent task per chunk and waits for all of them.
#[derive(Debug, Clone, Default)]
pub struct FanOutRunner {
    config: RunnerConfig,
}

impl FanOutRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Runs `work` on every chunk concurrently and returns the outputs in the
    /// order of `chunks`, whatever order the tasks finish in.
    ///
    /// # Errors
    ///
    /// [`Error::TaskFailure`] for the first task observed to fail. The other
    /// tasks are aborted and no partial result is returned.
    pub async fn run_all<W: ChunkWork>(&self, chunks: Vec<Chunk>, work: Arc<W>) -> Result<Vec<W::Output>> {
        self.launch(chunks, work).join_all().await
    }

    /// Starts the batch without waiting on it. Under [`StartMode::Eager`] the
    /// tasks are already running when this returns.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn launch<W: ChunkWork>(&self, chunks: Vec<Chunk>, work: Arc<W>) -> LaunchedBatch<W::Output> {
        let batch_id = Uuid::new_v4();
        let executor = TaskExecutor::new(self.config.task_timeout);
        tracing::info!("Launching {} tasks (batch {batch_id})...", chunks.len());

        let mut batch = LaunchedBatch {
            batch_id,
            spans: Vec::with_capacity(chunks.len()),
            deferred: Vec::new(),
            set: JoinSet::new(),
            slots: HashMap::new(),
        };

        for (slot, chunk) in chunks.into_iter().enumerate() {
            let task = ChunkTask::new(batch_id, chunk);
            batch.spans.push(task.span);
            let work = Arc::clone(&work);
            let fut: BoxFuture<'static, Result<W::Output>> =
                Box::pin(async move { executor.execute(task, work.as_ref()).await });
            match self.config.start {
                StartMode::Eager => batch.spawn(slot, fut),
                StartMode::Lazy => batch.deferred.push((slot, fut)),
            }
        }

        tracing::info!("Launched...");
        batch
    }
}

/// Tasks started by [`FanOutRunner::launch`].
///
/// Dropping the batch aborts every task that has not finished yet.
pub struct LaunchedBatch<R> {
    batch_id: Uuid,
    spans: Vec<ChunkSpan>,
    deferred: Vec<(usize, BoxFuture<'static, Result<R>>)>,
    set: JoinSet<Result<R>>,
    slots: HashMap<Id, usize>,
}

impl<R: Send + 'static> LaunchedBatch<R> {
    pub fn batch_id(&self) -> Uuid {
        self.batch_id
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Chunks of this batch, in input order.
    pub fn spans(&self) -> &[ChunkSpan] {
        &self.spans
    }

    /// Number of tasks not spawned yet (lazy start).
    pub fn deferred(&self) -> usize {
        self.deferred.len()
    }

    fn spawn(&mut self, slot: usize, fut: BoxFuture<'static, Result<R>>) {
        let handle = self.set.spawn(fut);
        self.slots.insert(handle.id(), slot);
    }

    /// Waits until every task has completed and returns the outputs in input
    /// order. Lazily started tasks are spawned first.
    pub async fn join_all(mut self) -> Result<Vec<R>> {
        for (slot, fut) in std::mem::take(&mut self.deferred) {
            self.spawn(slot, fut);
        }

        let mut outputs: Vec<Option<R>> = std::iter::repeat_with(|| None).take(self.spans.len()).collect();
        while let Some(joined) = self.set.join_next_with_id().await {
            match joined {
                Ok((id, Ok(output))) => {
                    let slot = self.slot_of(id)?;
                    outputs[slot] = Some(output);
                }
                Ok((_, Err(e))) => {
                    self.set.abort_all();
                    return Err(e);
                }
                Err(join_err) => {
                    self.set.abort_all();
                    return Err(self.join_failure(join_err));
                }
            }
        }

        let outputs = collect_slots(outputs)?;
        tracing::info!("Received {} result chunks (batch {})", outputs.len(), self.batch_id);
        Ok(outputs)
    }

    /// Like [`join_all`](Self::join_all), but gives up as soon as `cancel`
    /// resolves: every outstanding task is aborted and [`Error::Cancelled`] is
    /// returned instead of partial results.
    pub async fn join_all_or_cancel<C>(self, cancel: C) -> Result<Vec<R>>
    where
        C: Future<Output = ()>,
    {
        let batch_id = self.batch_id;
        tokio::select! {
            joined = self.join_all() => joined,
            () = cancel => {
                tracing::warn!("Batch {batch_id} cancelled, aborting outstanding tasks");
                Err(Error::Cancelled)
            }
        }
    }

    fn slot_of(&self, id: Id) -> Result<usize> {
        self.slots.get(&id).copied().ok_or(Error::ResultMismatch {
            expected: self.spans.len(),
            actual: self.slots.len(),
        })
    }

    fn join_failure(&self, join_err: JoinError) -> Error {
        if join_err.is_cancelled() {
            return Error::Cancelled;
        }
        let slot = self.slots.get(&join_err.id()).copied().unwrap_or_default();
        let span = self.spans[slot];
        let message = panic_message(join_err.into_panic());
        tracing::warn!("Task for chunk #{slot} panicked: {message}");
        Error::TaskFailure {
            index: span.index,
            span,
            cause: FailureCause::Panicked(message),
        }
    }
}

/// Unwraps every slot, or reports how many were filled if any is missing.
fn collect_slots<R>(slots: Vec<Option<R>>) -> Result<Vec<R>> {
    let expected = slots.len();
    let filled = slots.iter().filter(|slot| slot.is_some()).count();
    if filled != expected {
        return Err(Error::ResultMismatch {
            expected,
            actual: filled,
        });
    }
    Ok(slots.into_iter().flatten().collect())
}

fn panic_message(payload: Box<dyn Any + Send + 'static>) -> String {
    match payload.downcast::<String>() {
        Ok(msg) => *msg,
        Err(payload) => match payload.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic payload".to_string(),
        },
    }
}
