// task.rs
// A chunk handed to one fan-out task, together with the id used in its log lines.
use crate::types::{Chunk, ChunkSpan};
use uuid::Uuid;

/// One unit of fan-out work: a chunk and the id of the task processing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkTask {
    /// `<batch id>_chunk_<index>`
    pub task_id: String,
    pub span: ChunkSpan,
    pub chunk: Chunk,
}

impl ChunkTask {
    pub fn new(batch_id: Uuid, chunk: Chunk) -> Self {
        Self {
            task_id: generate_task_id(batch_id, chunk.index()),
            span: chunk.span(),
            chunk,
        }
    }

    pub fn index(&self) -> usize {
        self.span.index
    }
}

fn generate_task_id(batch_id: Uuid, index: usize) -> String {
    format!("{}_chunk_{}", batch_id, index)
}
