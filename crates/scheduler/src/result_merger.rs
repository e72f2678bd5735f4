// result_merger.rs
// Pairs every chunk with the numeric results computed for it and renders the
// per-chunk summaries.
use crate::error::{Error, Result};
use crate::types::ChunkSpan;
use prettytable::{row, Table};

/// Summary of one chunk's results.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkReport {
    pub span: ChunkSpan,
    pub result_len: usize,
    pub first_result: Option<f64>,
    pub last_result: Option<f64>,
}

/// Per-chunk summaries of a whole run, in chunk order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunReport {
    pub chunks: Vec<ChunkReport>,
}

impl RunReport {
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Total number of results across all chunks.
    pub fn total_results(&self) -> usize {
        self.chunks.iter().map(|c| c.result_len).sum()
    }

    /// One `"First square: x - last square: y"` line per chunk.
    pub fn lines(&self) -> Vec<String> {
        self.chunks
            .iter()
            .map(|c| {
                format!(
                    "First square: {} - last square: {}",
                    fmt_result(c.first_result),
                    fmt_result(c.last_result)
                )
            })
            .collect()
    }

    pub fn log(&self) {
        for line in self.lines() {
            tracing::info!("{line}");
        }
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.set_titles(row!["Chunk", "Size", "Range", "First result", "Last result"]);
        for c in &self.chunks {
            table.add_row(row![
                c.span.index,
                c.span.len,
                format!("{}..={}", c.span.first, c.span.last),
                fmt_result(c.first_result),
                fmt_result(c.last_result)
            ]);
        }
        table
    }
}

fn fmt_result(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Builds [`RunReport`]s from runner output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultMerger;

impl ResultMerger {
    pub fn new() -> Self {
        Self
    }

    /// Zips `spans` with `results`; both must be in chunk order.
    pub fn merge(&self, spans: &[ChunkSpan], results: &[Vec<f64>]) -> Result<RunReport> {
        if spans.len() != results.len() {
            return Err(Error::ResultMismatch {
                expected: spans.len(),
                actual: results.len(),
            });
        }
        let chunks = spans
            .iter()
            .zip(results)
            .map(|(span, values)| ChunkReport {
                span: *span,
                result_len: values.len(),
                first_result: values.first().copied(),
                last_result: values.last().copied(),
            })
            .collect();
        Ok(RunReport { chunks })
    }

    /// Concatenates the results of every chunk, in chunk order.
    pub fn concatenate(&self, results: &[Vec<f64>]) -> Vec<f64> {
        results.concat()
    }
}
