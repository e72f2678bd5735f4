// types.rs
// Value types produced by the partitioner and consumed by the runner and merger.
use std::fmt;
use std::ops::RangeInclusive;

/// Size and starting offset of one chunk inside the range `1..=max`.
///
/// `offset` is zero based, so the chunk holds `offset + 1 ..= offset + size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpec {
    pub offset: u64,
    pub size: u64,
}

impl ChunkSpec {
    /// Values covered by this spec.
    pub fn values(&self) -> RangeInclusive<u64> {
        (self.offset + 1)..=(self.offset + self.size)
    }
}

/// A contiguous, ordered slice of the input range, tagged with its emission index.
///
/// Only the bounds are stored; values are produced on demand, so a chunk of
/// any size costs the same to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    index: usize,
    values: RangeInclusive<u64>,
}

impl Chunk {
    pub(crate) fn from_spec(index: usize, spec: ChunkSpec) -> Self {
        Self {
            index,
            values: spec.values(),
        }
    }

    /// Position of this chunk in emission order.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        if self.values.is_empty() {
            return 0;
        }
        let len = self.values.end() - self.values.start() + 1;
        usize::try_from(len).unwrap_or(usize::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first(&self) -> Option<u64> {
        (!self.values.is_empty()).then(|| *self.values.start())
    }

    pub fn last(&self) -> Option<u64> {
        (!self.values.is_empty()).then(|| *self.values.end())
    }

    pub fn values(&self) -> RangeInclusive<u64> {
        self.values.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> {
        self.values.clone()
    }

    /// Materializes the chunk. Allocates one `u64` per element.
    pub fn into_values(self) -> Vec<u64> {
        self.values.collect()
    }

    /// Copyable description of this chunk that outlives it.
    pub fn span(&self) -> ChunkSpan {
        ChunkSpan {
            index: self.index,
            first: self.first().unwrap_or_default(),
            last: self.last().unwrap_or_default(),
            len: self.len(),
        }
    }
}

/// Lightweight description of a chunk, kept after the chunk moved into a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpan {
    pub index: usize,
    pub first: u64,
    pub last: u64,
    pub len: usize,
}

impl fmt::Display for ChunkSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}, {} elements", self.first, self.last, self.len)
    }
}
