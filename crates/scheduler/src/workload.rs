// workload.rs
// The work applied to each chunk: the ChunkWork trait, a closure adapter, and
// the square-computing demo workload.
use crate::error::{BoxError, Error, Result};
use crate::types::Chunk;
use futures::future::BoxFuture;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Computation run once per chunk by the fan-out runner.
///
/// Implementations must not share mutable state between chunks; each call
/// owns its chunk outright.
pub trait ChunkWork: Send + Sync + 'static {
    type Output: Send + 'static;

    fn compute(&self, chunk: Chunk) -> BoxFuture<'_, std::result::Result<Self::Output, BoxError>>;
}

/// [`ChunkWork`] backed by an async closure. Build with [`work_fn`].
pub struct FnWork<F>(F);

/// Wraps `f` so it can be handed to the runner.
///
/// ```ignore
/// let work = work_fn(|chunk: Chunk| async move { Ok::<_, BoxError>(chunk.len()) });
/// ```
pub fn work_fn<F, Fut, R>(f: F) -> FnWork<F>
where
    F: Fn(Chunk) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<R, BoxError>> + Send + 'static,
    R: Send + 'static,
{
    FnWork(f)
}

impl<F, Fut, R> ChunkWork for FnWork<F>
where
    F: Fn(Chunk) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<R, BoxError>> + Send + 'static,
    R: Send + 'static,
{
    type Output = R;

    fn compute(&self, chunk: Chunk) -> BoxFuture<'_, std::result::Result<R, BoxError>> {
        Box::pin((self.0)(chunk))
    }
}

/// Squares every element of a chunk after a random delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SquareWorkload {
    min_delay: Duration,
    max_delay: Duration,
}

impl SquareWorkload {
    pub const DEFAULT_MIN_DELAY: Duration = Duration::from_millis(500);
    pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(2500);
    /// Largest chunk this workload will square; its output holds one `f64` per element.
    pub const MAX_CHUNK_LEN: usize = 1 << 24;

    pub fn new(min_delay: Duration, max_delay: Duration) -> Result<Self> {
        if min_delay > max_delay {
            return Err(Error::Config(format!(
                "workload min delay {min_delay:?} is greater than max delay {max_delay:?}"
            )));
        }
        Ok(Self {
            min_delay,
            max_delay,
        })
    }

    /// No delay at all; useful in tests.
    pub fn instant() -> Self {
        Self {
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    fn pick_delay(&self) -> Duration {
        if self.min_delay == self.max_delay {
            return self.min_delay;
        }
        rand::thread_rng().gen_range(self.min_delay..=self.max_delay)
    }
}

impl Default for SquareWorkload {
    fn default() -> Self {
        Self {
            min_delay: Self::DEFAULT_MIN_DELAY,
            max_delay: Self::DEFAULT_MAX_DELAY,
        }
    }
}

impl ChunkWork for SquareWorkload {
    type Output = Vec<f64>;

    fn compute(&self, chunk: Chunk) -> BoxFuture<'_, std::result::Result<Vec<f64>, BoxError>> {
        let delay = self.pick_delay();
        Box::pin(async move {
            if chunk.len() > Self::MAX_CHUNK_LEN {
                return Err(format!(
                    "chunk of {} elements exceeds the {} element limit of the square workload",
                    chunk.len(),
                    Self::MAX_CHUNK_LEN
                )
                .into());
            }
            tracing::info!(
                "Computing on {} elements {} .. {}",
                chunk.len(),
                chunk.first().unwrap_or_default(),
                chunk.last().unwrap_or_default()
            );
            tracing::info!("Lots of work, gonna take me {} milliseconds!", delay.as_millis());
            tokio::time::sleep(delay).await;

            let squares: Vec<f64> = chunk.iter().map(|v| (v as f64) * (v as f64)).collect();
            if let Some(last) = squares.last() {
                tracing::info!("Compute finished - last square: {last}");
            }
            Ok(squares)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChunkSpec;

    #[tokio::test]
    async fn squares_chunk_values() {
        let chunk = Chunk::from_spec(0, ChunkSpec { offset: 0, size: 4 });
        let squares = SquareWorkload::instant().compute(chunk).await.unwrap();
        assert_eq!(squares, vec![1.0, 4.0, 9.0, 16.0]);
    }

    #[tokio::test]
    async fn oversized_chunk_is_refused() {
        let chunk = crate::task_splitter::partition(i64::MAX, 1, crate::RemainderPolicy::Even)
            .unwrap()
            .into_chunks()
            .remove(0);
        let err = SquareWorkload::instant().compute(chunk).await.unwrap_err();
        assert!(err.to_string().contains("element limit"), "{err}");
    }

    #[test]
    fn rejects_inverted_delay_bounds() {
        let err = SquareWorkload::new(Duration::from_millis(10), Duration::from_millis(5));
        assert!(matches!(err, Err(Error::Config(_))));
    }

    #[test]
    fn delay_stays_within_bounds() {
        let workload =
            SquareWorkload::new(Duration::from_millis(5), Duration::from_millis(15)).unwrap();
        for _ in 0..100 {
            let delay = workload.pick_delay();
            assert!(delay >= Duration::from_millis(5) && delay <= Duration::from_millis(15));
        }
    }

    #[tokio::test]
    async fn closure_work_sees_its_chunk() {
        let work = work_fn(|chunk: Chunk| async move { Ok::<_, BoxError>(chunk.index()) });
        let chunk = Chunk::from_spec(3, ChunkSpec { offset: 9, size: 1 });
        assert_eq!(work.compute(chunk).await.unwrap(), 3);
    }
}
