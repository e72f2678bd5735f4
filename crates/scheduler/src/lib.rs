// lib.rs
// Crate entry point: splits an integer range into chunks under a remainder
// policy and fans work out over those chunks.
pub mod config;
pub mod error;
pub mod result_merger;
pub mod scheduler;
pub mod summary;
pub mod task;
pub mod task_executor;
pub mod task_splitter;
pub mod types;
pub mod workload;

pub use config::SchedulerConfig;
pub use error::{BoxError, Error, FailureCause, Result};
pub use result_merger::{ChunkReport, ResultMerger, RunReport};
pub use scheduler::{FanOutRunner, LaunchedBatch, RunnerConfig, StartMode};
pub use task_splitter::{partition, ChunkSplitter, MAX_CHUNKS, PartitionResult, RemainderPolicy};
pub use types::{Chunk, ChunkSpan, ChunkSpec};
pub use workload::{work_fn, ChunkWork, FnWork, SquareWorkload};
