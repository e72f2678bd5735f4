// task_splitter.rs
// Chunk splitter: partitions the range 1..=max into ordered chunks, placing the
// remainder according to a RemainderPolicy.
use crate::error::{Error, Result};
use crate::summary::describe_distribution;
use crate::types::{Chunk, ChunkSpan, ChunkSpec};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the remainder `max % requested_chunks` is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RemainderPolicy {
    /// One extra element on each of the first `remainder` chunks.
    #[default]
    #[serde(alias = "EVEN")]
    Even,
    /// The whole remainder goes to the first chunk.
    #[serde(alias = "ALL_IN_FIRST")]
    AllInFirst,
    /// The whole remainder goes to the last chunk.
    #[serde(alias = "ALL_IN_LAST")]
    AllInLast,
    /// The remainder becomes one extra trailing chunk, so one more chunk than
    /// requested is emitted.
    #[serde(alias = "ADDITIONAL_CHUNK")]
    AdditionalChunk,
    /// The trailing `remainder` elements are dropped. This is the only policy
    /// whose chunks do not cover the whole range.
    #[serde(alias = "IGNORED")]
    Ignored,
}

impl RemainderPolicy {
    pub const ALL: [RemainderPolicy; 5] = [
        RemainderPolicy::Even,
        RemainderPolicy::AllInFirst,
        RemainderPolicy::AllInLast,
        RemainderPolicy::AdditionalChunk,
        RemainderPolicy::Ignored,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RemainderPolicy::Even => "even",
            RemainderPolicy::AllInFirst => "all-in-first",
            RemainderPolicy::AllInLast => "all-in-last",
            RemainderPolicy::AdditionalChunk => "additional-chunk",
            RemainderPolicy::Ignored => "ignored",
        }
    }

    /// Number of chunks emitted for `requested` chunks and the given remainder.
    pub fn emitted_chunks(self, requested: u64, remainder: u64) -> u64 {
        match self {
            RemainderPolicy::AdditionalChunk if remainder > 0 => requested + 1,
            _ => requested,
        }
    }

    /// Size of the chunk at `index`.
    fn chunk_size(self, index: u64, requested: u64, base: u64, remainder: u64) -> u64 {
        match self {
            RemainderPolicy::Even => base + u64::from(index < remainder),
            RemainderPolicy::AllInFirst if index == 0 => base + remainder,
            RemainderPolicy::AllInLast if index == requested - 1 => base + remainder,
            RemainderPolicy::AdditionalChunk if index == requested => remainder,
            RemainderPolicy::AllInFirst
            | RemainderPolicy::AllInLast
            | RemainderPolicy::AdditionalChunk
            | RemainderPolicy::Ignored => base,
        }
    }

    /// Size layout for `max` elements in `requested_chunks` chunks, without
    /// materializing the chunks. Arguments are validated like [`partition`].
    pub fn chunk_specs(self, max: i64, requested_chunks: i64) -> Result<Vec<ChunkSpec>> {
        let (max, requested) = validate(max, requested_chunks)?;
        Ok(self.layout(max, requested))
    }

    fn layout(self, max: u64, requested: u64) -> Vec<ChunkSpec> {
        let base = max / requested;
        let remainder = max % requested;
        let mut cursor = 0;
        (0..self.emitted_chunks(requested, remainder))
            .map(|index| {
                let size = self.chunk_size(index, requested, base, remainder);
                let spec = ChunkSpec {
                    offset: cursor,
                    size,
                };
                cursor += size;
                spec
            })
            .collect()
    }
}

impl fmt::Display for RemainderPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RemainderPolicy {
    type Err = Error;

    /// Accepts `even`, `all-in-first`, `ALL_IN_FIRST`, ... (case-insensitive,
    /// `-` and `_` interchangeable).
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        RemainderPolicy::ALL
            .into_iter()
            .find(|policy| policy.name() == normalized)
            .ok_or_else(|| {
                Error::invalid_argument(format!(
                    "unknown remainder policy '{s}', expected one of: even, all-in-first, \
                     all-in-last, additional-chunk, ignored"
                ))
            })
    }
}

/// Ordered chunks produced by [`partition`], plus a summary of their sizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionResult {
    chunks: Vec<Chunk>,
    summary: String,
    policy: RemainderPolicy,
    max: u64,
    requested_chunks: u64,
    base: u64,
    remainder: u64,
}

impl PartitionResult {
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn into_chunks(self) -> Vec<Chunk> {
        self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// e.g. `"3 chunks of 11 elements and 2 chunks of 10 elements"`.
    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn policy(&self) -> RemainderPolicy {
        self.policy
    }

    pub fn max(&self) -> u64 {
        self.max
    }

    pub fn requested_chunks(&self) -> u64 {
        self.requested_chunks
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    pub fn remainder(&self) -> u64 {
        self.remainder
    }

    /// Number of trailing elements left out of every chunk. Non-zero only
    /// under [`RemainderPolicy::Ignored`] with a remainder.
    pub fn dropped(&self) -> u64 {
        match self.policy {
            RemainderPolicy::Ignored => self.remainder,
            _ => 0,
        }
    }

    pub fn sizes(&self) -> Vec<usize> {
        self.chunks.iter().map(Chunk::len).collect()
    }

    pub fn spans(&self) -> Vec<ChunkSpan> {
        self.chunks.iter().map(Chunk::span).collect()
    }
}

/// Reusable splitter bound to one remainder policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkSplitter {
    pub policy: RemainderPolicy,
}

impl ChunkSplitter {
    pub fn new(policy: RemainderPolicy) -> Self {
        Self { policy }
    }

    pub fn split(&self, max: i64, requested_chunks: i64) -> Result<PartitionResult> {
        partition(max, requested_chunks, self.policy)
    }
}

/// Upper bound on `requested_chunks`. Every chunk becomes its own task.
pub const MAX_CHUNKS: i64 = 1 << 20;

/// Splits `1..=max` into `requested_chunks` ordered, disjoint chunks.
///
/// Chunk `i` takes the next `size(i)` integers from a cursor walking the range,
/// so concatenating the chunks in order gives back `1..=max`. The one
/// exception is [`RemainderPolicy::Ignored`], which silently leaves out the
/// last `max % requested_chunks` integers; see [`PartitionResult::dropped`].
///
/// # Errors
///
/// [`Error::InvalidArgument`] when `requested_chunks < 1`, `max < 1`,
/// `requested_chunks > max` or `requested_chunks > MAX_CHUNKS`. No chunk is
/// produced in that case.
pub fn partition(
    max: i64,
    requested_chunks: i64,
    policy: RemainderPolicy,
) -> Result<PartitionResult> {
    let (max, requested) = validate(max, requested_chunks)?;
    tracing::info!(
        "Going to prepare {max} elements in {requested} chunks; possible remainder treatment: {policy}"
    );

    let base = max / requested;
    let remainder = max % requested;
    tracing::debug!("Chunk size: {base}");
    tracing::debug!("Remainder: {remainder}");

    let chunks: Vec<Chunk> = policy
        .layout(max, requested)
        .into_iter()
        .enumerate()
        .map(|(index, spec)| {
            tracing::debug!(
                "Chunk size: {} - slicing from {} to {} excluded",
                spec.size,
                spec.offset,
                spec.offset + spec.size
            );
            let chunk = Chunk::from_spec(index, spec);
            tracing::debug!(
                "Chunk's first element: {} ; last: {}",
                chunk.first().unwrap_or_default(),
                chunk.last().unwrap_or_default()
            );
            tracing::debug!("Next slice start: {}", spec.offset + spec.size);
            chunk
        })
        .collect();

    let summary = describe_distribution(chunks.iter().map(Chunk::len));
    tracing::info!("Data prepared in {summary}");

    let result = PartitionResult {
        chunks,
        summary,
        policy,
        max,
        requested_chunks: requested,
        base,
        remainder,
    };
    if result.dropped() > 0 {
        tracing::warn!(
            "Remainder policy {policy} dropped the last {} elements ({}..={max})",
            result.dropped(),
            max - result.dropped() + 1
        );
    }
    Ok(result)
}

/// Checks the partition preconditions and returns `(max, requested)` as unsigned.
fn validate(max: i64, requested_chunks: i64) -> Result<(u64, u64)> {
    if requested_chunks < 1 {
        return Err(Error::invalid_argument(format!(
            "at least 1 chunk is required, got requested_chunks = {requested_chunks}"
        )));
    }
    if max < 1 {
        return Err(Error::invalid_argument(format!(
            "at least one element is required, got max = {max}"
        )));
    }
    if requested_chunks > max {
        return Err(Error::invalid_argument(format!(
            "can't request more chunks than elements: requested_chunks = {requested_chunks} > max = {max}"
        )));
    }
    if requested_chunks > MAX_CHUNKS {
        return Err(Error::invalid_argument(format!(
            "at most {MAX_CHUNKS} chunks are supported, got requested_chunks = {requested_chunks}"
        )));
    }
    Ok((max as u64, requested_chunks as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flatten(result: &PartitionResult) -> Vec<u64> {
        result.chunks().iter().flat_map(Chunk::iter).collect()
    }

    fn sample_inputs() -> Vec<(i64, i64)> {
        let mut inputs = vec![(53, 5), (33, 2), (73, 4), (87, 9), (101, 6), (50, 5), (55, 55)];
        for max in 1..=40 {
            for chunks in 1..=max {
                inputs.push((max, chunks));
            }
        }
        inputs
    }

    #[test]
    fn covers_range_exactly_once() {
        for (max, n) in sample_inputs() {
            for policy in RemainderPolicy::ALL {
                if policy == RemainderPolicy::Ignored {
                    continue;
                }
                let result = partition(max, n, policy).unwrap();
                let expected: Vec<u64> = (1..=max as u64).collect();
                assert_eq!(flatten(&result), expected, "{policy} max={max} n={n}");
            }
        }
    }

    #[test]
    fn ignored_drops_trailing_remainder() {
        for (max, n) in sample_inputs() {
            let result = partition(max, n, RemainderPolicy::Ignored).unwrap();
            let rem = (max % n) as u64;
            let covered = max as u64 - rem;
            assert_eq!(flatten(&result), (1..=covered).collect::<Vec<_>>());
            assert_eq!(result.dropped(), rem);
            assert!(flatten(&result).iter().all(|v| *v <= covered));
        }
    }

    #[test]
    fn chunk_count_follows_policy() {
        for (max, n) in sample_inputs() {
            let rem = max % n;
            for policy in RemainderPolicy::ALL {
                let result = partition(max, n, policy).unwrap();
                let expected = match policy {
                    RemainderPolicy::AdditionalChunk if rem > 0 => n + 1,
                    _ => n,
                };
                assert_eq!(result.len() as i64, expected, "{policy} max={max} n={n}");
            }
        }
    }

    #[test]
    fn sizes_sum_to_covered_elements() {
        for (max, n) in sample_inputs() {
            for policy in RemainderPolicy::ALL {
                let result = partition(max, n, policy).unwrap();
                let total: usize = result.sizes().iter().sum();
                let expected = match policy {
                    RemainderPolicy::Ignored => max - max % n,
                    _ => max,
                };
                assert_eq!(total as i64, expected, "{policy} max={max} n={n}");
                assert!(result.sizes().iter().all(|s| *s > 0));
            }
        }
    }

    #[test]
    fn policies_converge_without_remainder() {
        for (max, n) in [(50, 5), (55, 55), (60, 12), (7, 1)] {
            let reference = partition(max, n, RemainderPolicy::Even).unwrap();
            assert!(reference.sizes().iter().all(|s| *s as i64 == max / n));
            for policy in RemainderPolicy::ALL {
                let result = partition(max, n, policy).unwrap();
                assert_eq!(result.chunks(), reference.chunks(), "{policy}");
                assert_eq!(result.summary(), reference.summary());
            }
        }
    }

    #[test]
    fn one_element_per_chunk_when_counts_match() {
        let result = partition(55, 55, RemainderPolicy::Even).unwrap();
        assert_eq!(result.len(), 55);
        assert!(result.sizes().iter().all(|s| *s == 1));
        assert_eq!(result.summary(), "55 chunks of 1 elements");
    }

    #[test]
    fn rejects_invalid_arguments() {
        for (max, n) in [(6, 7), (55, 0), (0, 55), (99, -12), (-99, 12)] {
            for policy in RemainderPolicy::ALL {
                let err = partition(max, n, policy).unwrap_err();
                assert!(
                    matches!(err, Error::InvalidArgument { .. }),
                    "max={max} n={n}: {err}"
                );
            }
        }
    }

    #[test]
    fn rejection_message_names_constraint_and_values() {
        let msg = partition(6, 7, RemainderPolicy::Even).unwrap_err().to_string();
        assert!(msg.contains("more chunks than elements"), "{msg}");
        assert!(msg.contains("requested_chunks = 7") && msg.contains("max = 6"), "{msg}");

        let msg = partition(55, 0, RemainderPolicy::Even).unwrap_err().to_string();
        assert!(msg.contains("requested_chunks = 0"), "{msg}");

        let msg = partition(-99, 12, RemainderPolicy::Even).unwrap_err().to_string();
        assert!(msg.contains("max = -99"), "{msg}");
    }

    #[test]
    fn even_spreads_remainder_over_first_chunks() {
        let result = partition(53, 5, RemainderPolicy::Even).unwrap();
        assert_eq!(result.sizes(), vec![11, 11, 11, 10, 10]);
        assert_eq!(result.chunks()[0].values(), 1..=11);
        assert_eq!(result.chunks()[3].first(), Some(34));
        assert_eq!(
            result.summary(),
            "3 chunks of 11 elements and 2 chunks of 10 elements"
        );
    }

    #[test]
    fn all_in_first_puts_remainder_on_first_chunk() {
        let result = partition(53, 5, RemainderPolicy::AllInFirst).unwrap();
        assert_eq!(result.sizes(), vec![13, 10, 10, 10, 10]);
        assert_eq!(result.chunks()[0].values(), 1..=13);
        assert_eq!(result.chunks()[1].first(), Some(14));
        assert_eq!(
            result.summary(),
            "1 chunks of 13 elements and 4 chunks of 10 elements"
        );
    }

    #[test]
    fn all_in_last_puts_remainder_on_last_chunk() {
        let result = partition(53, 5, RemainderPolicy::AllInLast).unwrap();
        assert_eq!(result.sizes(), vec![10, 10, 10, 10, 13]);
        assert_eq!(result.chunks()[4].values(), 41..=53);
        assert_eq!(
            result.summary(),
            "4 chunks of 10 elements and 1 chunks of 13 elements"
        );
    }

    #[test]
    fn additional_chunk_holds_remainder() {
        let result = partition(53, 5, RemainderPolicy::AdditionalChunk).unwrap();
        assert_eq!(result.sizes(), vec![10, 10, 10, 10, 10, 3]);
        assert_eq!(result.chunks()[5].clone().into_values(), vec![51, 52, 53]);
        assert_eq!(
            result.summary(),
            "5 chunks of 10 elements and 1 chunks of 3 elements"
        );

        let result = partition(73, 4, RemainderPolicy::AdditionalChunk).unwrap();
        assert_eq!(result.sizes(), vec![18, 18, 18, 18, 1]);
    }

    #[test]
    fn ignored_reports_single_group() {
        let result = partition(53, 5, RemainderPolicy::Ignored).unwrap();
        assert_eq!(result.sizes(), vec![10; 5]);
        assert_eq!(result.chunks()[4].last(), Some(50));
        assert_eq!(result.summary(), "5 chunks of 10 elements");
        assert_eq!(result.dropped(), 3);
    }

    #[test]
    fn chunk_indices_follow_emission_order() {
        let result = partition(53, 5, RemainderPolicy::AdditionalChunk).unwrap();
        let indices: Vec<usize> = result.chunks().iter().map(Chunk::index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn chunk_specs_match_partition() {
        for policy in RemainderPolicy::ALL {
            let specs = policy.chunk_specs(87, 9).unwrap();
            let result = partition(87, 9, policy).unwrap();
            let sizes: Vec<usize> = specs.iter().map(|s| s.size as usize).collect();
            assert_eq!(sizes, result.sizes());
            assert_eq!(specs[0].offset, 0);
        }
        assert!(RemainderPolicy::Even.chunk_specs(6, 7).is_err());
    }

    #[derive(Clone, Default)]
    struct Capture(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn debug_log_traces_every_slice() {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            partition(53, 5, RemainderPolicy::AllInLast).unwrap();
        });

        let logged = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert!(logged.contains("Chunk's first element: 41 ; last: 53"), "{logged}");
        assert!(logged.contains("Next slice start: 10"), "{logged}");
        assert!(logged.contains("Next slice start: 53"), "{logged}");
        assert!(logged.contains("Data prepared in 4 chunks of 10 elements and 1 chunks of 13 elements"));
    }

    #[test]
    fn chunk_count_is_capped() {
        let err = partition(i64::MAX, i64::MAX, RemainderPolicy::Even).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
        assert!(err.to_string().contains("at most 1048576 chunks"), "{err}");
        assert_eq!(partition(MAX_CHUNKS, MAX_CHUNKS, RemainderPolicy::Even).unwrap().len(), 1 << 20);
    }

    #[test]
    fn largest_max_partitions_without_allocating_values() {
        let result = partition(i64::MAX, 1, RemainderPolicy::Even).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.chunks()[0].values(), 1..=i64::MAX as u64);

        for policy in RemainderPolicy::ALL {
            let result = partition(i64::MAX, 10, policy).unwrap();
            let covered = match policy {
                RemainderPolicy::Ignored => i64::MAX as u64 - result.dropped(),
                _ => i64::MAX as u64,
            };
            assert_eq!(result.chunks().last().and_then(Chunk::last), Some(covered), "{policy}");
            let spans = result.spans();
            for pair in spans.windows(2) {
                assert_eq!(pair[0].last + 1, pair[1].first, "{policy}");
            }
        }
    }

    #[test]
    fn splitter_uses_its_policy() {
        let splitter = ChunkSplitter::new(RemainderPolicy::AllInLast);
        let result = splitter.split(101, 6).unwrap();
        assert_eq!(result.policy(), RemainderPolicy::AllInLast);
        assert_eq!(result.sizes(), vec![16, 16, 16, 16, 16, 21]);
        assert_eq!((result.base(), result.remainder()), (16, 5));
    }

    #[test]
    fn parses_policy_names() {
        assert_eq!("even".parse::<RemainderPolicy>().unwrap(), RemainderPolicy::Even);
        assert_eq!(
            "ALL_IN_FIRST".parse::<RemainderPolicy>().unwrap(),
            RemainderPolicy::AllInFirst
        );
        assert_eq!(
            " all-in-last ".parse::<RemainderPolicy>().unwrap(),
            RemainderPolicy::AllInLast
        );
        assert_eq!(
            "Additional_Chunk".parse::<RemainderPolicy>().unwrap(),
            RemainderPolicy::AdditionalChunk
        );
        assert!(matches!(
            "sideways".parse::<RemainderPolicy>(),
            Err(Error::InvalidArgument { .. })
        ));
        for policy in RemainderPolicy::ALL {
            assert_eq!(policy.to_string().parse::<RemainderPolicy>().unwrap(), policy);
        }
    }

    #[test]
    fn policy_serde_uses_kebab_case() {
        let json = serde_json::to_string(&RemainderPolicy::AdditionalChunk).unwrap();
        assert_eq!(json, "\"additional-chunk\"");
        let policy: RemainderPolicy = serde_json::from_str("\"ALL_IN_LAST\"").unwrap();
        assert_eq!(policy, RemainderPolicy::AllInLast);
    }
}
