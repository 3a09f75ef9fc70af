//! Pipeline executor: drains a source through a stage chain into an
//! accumulator.
//!
//! Every terminal operation is expressed as three functions over an
//! accumulator `A`: an identity producing an empty accumulator, a fold step
//! absorbing one element, and a merge step combining two accumulators.
//!
//! - **Sequential**: one accumulator, source order, each element pushed
//!   through the whole chain before the next one is produced. The merge step
//!   is never called.
//! - **Parallel**: fork-join over the source index space. Rayon splits the
//!   indices into chunks of at least `min_chunk_len`, each worker folds its
//!   chunk into its own accumulator, and partial accumulators are merged
//!   pairwise back up the split tree. Adjacent chunks are merged left before
//!   right, so order-sensitive accumulators (vectors) keep encounter order.
//!
//! The first error from a fold or merge step short-circuits the drain.

use crate::config::PipelineConfig;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::source::Source;
use crate::pipeline::stage::Stage;
use crate::types::EvaluationMode;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Decides how a pipeline is drained.
#[derive(Clone)]
pub struct Executor {
    mode: EvaluationMode,
    /// Dedicated pool for parallel drains. `None` uses the global rayon pool.
    pool: Option<Arc<ThreadPool>>,
    min_chunk_len: usize,
}

impl Executor {
    pub fn sequential() -> Self {
        Self {
            mode: EvaluationMode::Sequential,
            pool: None,
            min_chunk_len: 1,
        }
    }

    pub fn parallel() -> Self {
        Self {
            mode: EvaluationMode::Parallel,
            ..Self::sequential()
        }
    }

    /// Build an executor from config, creating a dedicated pool when
    /// `workers` is set.
    pub fn from_config(config: &PipelineConfig) -> PipelineResult<Self> {
        if let Some(problem) = config.scheduling_problem() {
            return Err(PipelineError::InvalidConfig(problem));
        }
        let pool = match config.workers {
            Some(workers) => {
                let pool = ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .thread_name(|i| format!("pipeline-worker-{}", i))
                    .build()?;
                Some(Arc::new(pool))
            }
            None => None,
        };

        Ok(Self {
            mode: config.mode,
            pool,
            min_chunk_len: config.min_chunk_len.max(1),
        })
    }

    /// Same pool and chunking, different mode.
    pub fn with_mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_min_chunk_len(mut self, min_chunk_len: usize) -> Self {
        self.min_chunk_len = min_chunk_len.max(1);
        self
    }

    pub fn mode(&self) -> EvaluationMode {
        self.mode
    }

    pub fn min_chunk_len(&self) -> usize {
        self.min_chunk_len
    }

    /// Number of workers a parallel drain may use.
    pub fn worker_count(&self) -> usize {
        match (&self.pool, self.mode) {
            (_, EvaluationMode::Sequential) => 1,
            (Some(pool), EvaluationMode::Parallel) => pool.current_num_threads(),
            (None, EvaluationMode::Parallel) => rayon::current_num_threads(),
        }
    }

    /// Drain `source` through `stage`, folding survivors into an accumulator.
    pub fn drain<S, A, ID, F, M>(
        &self,
        source: Source<S::In>,
        stage: &S,
        identity: ID,
        fold: F,
        merge: M,
    ) -> PipelineResult<A>
    where
        S: Stage,
        A: Send,
        ID: Fn() -> A + Send + Sync,
        F: Fn(A, usize, S::Out) -> PipelineResult<A> + Send + Sync,
        M: Fn(A, A) -> PipelineResult<A> + Send + Sync,
    {
        let len = source.len();
        let started = Instant::now();
        tracing::debug!(
            "Draining {} elements ({} mode, chunk >= {})",
            len,
            self.mode,
            self.min_chunk_len
        );

        let result = match self.mode {
            EvaluationMode::Sequential => Self::drain_sequential(source, stage, &identity, &fold),
            EvaluationMode::Parallel => {
                let run = || self.drain_parallel(source, stage, &identity, &fold, &merge);
                match &self.pool {
                    Some(pool) => pool.install(run),
                    None => run(),
                }
            }
        };

        match &result {
            Ok(_) => tracing::debug!(
                "Drain of {} elements finished in {:?}",
                len,
                started.elapsed()
            ),
            Err(e) => tracing::warn!("Drain aborted: {}", e),
        }

        result
    }

    fn drain_sequential<S, A, ID, F>(
        source: Source<S::In>,
        stage: &S,
        identity: &ID,
        fold: &F,
    ) -> PipelineResult<A>
    where
        S: Stage,
        ID: Fn() -> A,
        F: Fn(A, usize, S::Out) -> PipelineResult<A>,
    {
        let mut acc = identity();
        for (index, item) in source.into_indexed_iter() {
            if let Some(out) = stage.process(index, item)? {
                acc = fold(acc, index, out)?;
            }
        }
        Ok(acc)
    }

    fn drain_parallel<S, A, ID, F, M>(
        &self,
        source: Source<S::In>,
        stage: &S,
        identity: &ID,
        fold: &F,
        merge: &M,
    ) -> PipelineResult<A>
    where
        S: Stage,
        A: Send,
        ID: Fn() -> A + Send + Sync,
        F: Fn(A, usize, S::Out) -> PipelineResult<A> + Send + Sync,
        M: Fn(A, A) -> PipelineResult<A> + Send + Sync,
    {
        let step = |acc: A, index: usize, item: S::In| match stage.process(index, item)? {
            Some(out) => fold(acc, index, out),
            None => Ok(acc),
        };
        let combine = |left: A, right: A| {
            tracing::trace!("Merging partial results");
            merge(left, right)
        };

        match source {
            Source::List(items) => items
                .into_par_iter()
                .enumerate()
                .with_min_len(self.min_chunk_len)
                .try_fold(identity, |acc, (index, item)| step(acc, index, item))
                .try_reduce(identity, combine),
            Source::Generated { len, generator } => (0..len)
                .into_par_iter()
                .with_min_len(self.min_chunk_len)
                .try_fold(identity, |acc, index| step(acc, index, generator(index)))
                .try_reduce(identity, combine),
        }
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::sequential()
    }
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("mode", &self.mode)
            .field("dedicated_pool", &self.pool.is_some())
            .field("min_chunk_len", &self.min_chunk_len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_WORKERS;
    use crate::pipeline::id::{StageId, StageKind};
    use crate::pipeline::stage::{Filter, Identity};
    use std::convert::Infallible;

    fn sum_drain(executor: &Executor, source: Source<i64>) -> PipelineResult<i64> {
        let stage = Identity::<i64>::new();
        executor.drain(
            source,
            &stage,
            || 0,
            |acc, _, item| Ok(acc + item),
            |a, b| Ok(a + b),
        )
    }

    #[test]
    fn test_sequential_sum() {
        let total = sum_drain(&Executor::sequential(), Source::range_closed(1, 100).unwrap());
        assert_eq!(total.unwrap(), 5050);
    }

    #[test]
    fn test_parallel_sum_matches_sequential() {
        let source = Source::range_closed(1, 10_000).unwrap();
        let seq = sum_drain(&Executor::sequential(), source.clone()).unwrap();
        let par = sum_drain(&Executor::parallel().with_min_chunk_len(64), source).unwrap();
        assert_eq!(seq, par);
    }

    #[test]
    fn test_empty_source_returns_identity() {
        let total = sum_drain(&Executor::parallel(), Source::empty()).unwrap();
        assert_eq!(total, 0);
    }

    #[test]
    fn test_parallel_vec_keeps_encounter_order() {
        let stage = Filter::new(
            Identity::<i64>::new(),
            |i: &i64| Ok::<_, Infallible>(i % 3 == 0),
            StageId(1),
        );
        let collected = Executor::parallel()
            .drain(
                Source::range_closed(0, 999).unwrap(),
                &stage,
                Vec::new,
                |mut acc, _, item| {
                    acc.push(item);
                    Ok(acc)
                },
                |mut left, mut right| {
                    left.append(&mut right);
                    Ok(left)
                },
            )
            .unwrap();

        let expected: Vec<i64> = (0..1000).filter(|i| i % 3 == 0).collect();
        assert_eq!(collected, expected);
    }

    #[test]
    fn test_dedicated_pool_from_config() {
        let config = PipelineConfig::parallel().with_workers(2).with_min_chunk_len(4);
        let executor = Executor::from_config(&config).unwrap();
        assert_eq!(executor.mode(), EvaluationMode::Parallel);
        assert_eq!(executor.worker_count(), 2);
        assert_eq!(executor.min_chunk_len(), 4);

        let total = sum_drain(&executor, Source::range_closed(1, 10).unwrap()).unwrap();
        assert_eq!(total, 55);
    }

    #[test]
    fn test_from_config_rejects_unschedulable_settings() {
        let configs = [
            PipelineConfig::parallel().with_workers(0),
            PipelineConfig::parallel().with_workers(MAX_WORKERS + 1),
            PipelineConfig::parallel().with_min_chunk_len(0),
        ];
        for config in &configs {
            let err = Executor::from_config(config).unwrap_err();
            assert!(matches!(err, PipelineError::InvalidConfig(_)), "{:?}", err);
        }
    }

    #[test]
    fn test_merge_error_reported_without_element_index() {
        let executor = Executor::from_config(&PipelineConfig::parallel().with_workers(4)).unwrap();
        let stage = Identity::<i64>::new();
        let err = executor
            .drain(
                Source::range_closed(1, 1000).unwrap(),
                &stage,
                || 0i64,
                |acc, _, item| Ok(acc + item),
                |_, _| {
                    Err(PipelineError::evaluation(
                        StageId(1),
                        StageKind::Reduce,
                        None,
                        "merge refused",
                    ))
                },
            )
            .unwrap_err();

        assert_eq!(err.element_index(), None);
        assert!(err.to_string().contains("while merging partial results"));
    }

    #[test]
    fn test_fold_error_aborts_drain() {
        let stage = Identity::<i64>::new();
        for executor in [Executor::sequential(), Executor::parallel()] {
            let result = executor.drain(
                Source::range_closed(1, 50).unwrap(),
                &stage,
                || 0i64,
                |acc, index, item| {
                    if item == 25 {
                        Err(PipelineError::evaluation(
                            StageId(1),
                            StageKind::Reduce,
                            Some(index),
                            "unlucky element",
                        ))
                    } else {
                        Ok(acc + item)
                    }
                },
                |a, b| Ok(a + b),
            );
            let err = result.unwrap_err();
            assert_eq!(err.element_index(), Some(24));
        }
    }

    #[test]
    fn test_sequential_worker_count() {
        assert_eq!(Executor::sequential().worker_count(), 1);
        assert!(Executor::parallel().worker_count() >= 1);
    }
}
