//! `Sequence`: the lazy pipeline builder and its terminal operations.
//!
//! Building a sequence only records the source and wraps closures into
//! stages. Nothing is evaluated until a terminal operation consumes the
//! sequence and hands it to the [`Executor`].
//!
//! ```
//! use lazy_pipeline::Sequence;
//!
//! let sum_of_even_squares = Sequence::range_closed(0, 10)?
//!     .filter(|i| i % 2 == 0)
//!     .map(|i| i * i)
//!     .reduce(0, |a, b| a + b)?;
//! assert_eq!(sum_of_even_squares, 220);
//! # Ok::<(), lazy_pipeline::PipelineError>(())
//! ```

use crate::config::PipelineConfig;
use crate::pipeline::collector::{Collector, ToVec};
use crate::pipeline::error::{BoxError, PipelineError, PipelineResult};
use crate::pipeline::executor::Executor;
use crate::pipeline::id::{StageId, StageKind};
use crate::pipeline::source::Source;
use crate::pipeline::stage::{Filter, Identity, Inspect, Map, Stage};
use crate::types::{EvaluationMode, Partitioned};
use std::collections::HashMap;
use std::convert::Infallible;
use std::hash::Hash;

/// A lazy pipeline: a source plus a chain of not-yet-evaluated stages.
pub struct Sequence<S: Stage> {
    source: Source<S::In>,
    stage: S,
    executor: Executor,
    /// Id the next appended stage (or terminal) will take.
    next_id: StageId,
}

// ── Construction ──

impl<T: Send> Sequence<Identity<T>> {
    pub fn from_source(source: Source<T>) -> Self {
        Self {
            source,
            stage: Identity::new(),
            executor: Executor::default(),
            next_id: StageId::SOURCE.next(),
        }
    }

    /// Explicit ordered list of elements.
    pub fn of(items: impl IntoIterator<Item = T>) -> Self {
        Self::from_source(Source::list(items.into_iter().collect()))
    }

    pub fn from_vec(items: Vec<T>) -> Self {
        Self::from_source(Source::list(items))
    }

    pub fn empty() -> Self {
        Self::from_source(Source::empty())
    }

    /// `len` elements produced on demand from their index.
    pub fn generate<F>(len: usize, generator: F) -> Self
    where
        F: Fn(usize) -> T + Send + Sync + 'static,
    {
        Self::from_source(Source::generated(len, generator))
    }
}

impl Sequence<Identity<i64>> {
    /// Closed range `[lo, hi]`. Fails with `InvalidRange` if `lo > hi`.
    pub fn range_closed(lo: i64, hi: i64) -> PipelineResult<Self> {
        Ok(Self::from_source(Source::range_closed(lo, hi)?))
    }

    /// Half-open range `[lo, hi)`. Empty when `lo == hi`.
    pub fn range(lo: i64, hi: i64) -> PipelineResult<Self> {
        Ok(Self::from_source(Source::range(lo, hi)?))
    }
}

impl<T: Send> FromIterator<T> for Sequence<Identity<T>> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::of(iter)
    }
}

// ── Evaluation mode ──

impl<S: Stage> Sequence<S> {
    pub fn sequential(mut self) -> Self {
        self.executor = self.executor.with_mode(EvaluationMode::Sequential);
        self
    }

    pub fn parallel(mut self) -> Self {
        self.executor = self.executor.with_mode(EvaluationMode::Parallel);
        self
    }

    pub fn is_parallel(&self) -> bool {
        self.executor.mode().is_parallel()
    }

    /// Apply mode, worker pool and chunking from `config`.
    pub fn with_config(mut self, config: &PipelineConfig) -> PipelineResult<Self> {
        self.executor = Executor::from_config(config)?;
        Ok(self)
    }

    pub fn with_executor(mut self, executor: Executor) -> Self {
        self.executor = executor;
        self
    }

    /// Number of source elements a drain will pull.
    pub fn source_len(&self) -> usize {
        self.source.len()
    }

    /// Number of intermediate stages appended so far.
    pub fn stage_count(&self) -> usize {
        self.next_id.index() - 1
    }

    fn chain<N>(self, wrap: impl FnOnce(S, StageId) -> N) -> Sequence<N>
    where
        N: Stage<In = S::In>,
    {
        let id = self.next_id;
        Sequence {
            source: self.source,
            stage: wrap(self.stage, id),
            executor: self.executor,
            next_id: id.next(),
        }
    }
}

// ── Intermediate operations ──

impl<S: Stage> Sequence<S> {
    pub fn filter<P>(
        self,
        predicate: P,
    ) -> Sequence<Filter<S, impl Fn(&S::Out) -> Result<bool, Infallible> + Send + Sync>>
    where
        P: Fn(&S::Out) -> bool + Send + Sync,
    {
        self.try_filter(move |item: &S::Out| Ok::<bool, Infallible>(predicate(item)))
    }

    /// Filter with a predicate that may fail; an error aborts the drain.
    pub fn try_filter<P, E>(self, predicate: P) -> Sequence<Filter<S, P>>
    where
        P: Fn(&S::Out) -> Result<bool, E> + Send + Sync,
        E: Into<BoxError>,
    {
        self.chain(|upstream, id| Filter::new(upstream, predicate, id))
    }

    pub fn map<U, F>(
        self,
        transform: F,
    ) -> Sequence<Map<S, impl Fn(S::Out) -> Result<U, Infallible> + Send + Sync>>
    where
        F: Fn(S::Out) -> U + Send + Sync,
        U: Send,
    {
        self.try_map(move |item: S::Out| Ok::<U, Infallible>(transform(item)))
    }

    /// Map with a transform that may fail; an error aborts the drain.
    pub fn try_map<U, F, E>(self, transform: F) -> Sequence<Map<S, F>>
    where
        F: Fn(S::Out) -> Result<U, E> + Send + Sync,
        U: Send,
        E: Into<BoxError>,
    {
        self.chain(|upstream, id| Map::new(upstream, transform, id))
    }

    /// Observe each element reaching this point.
    pub fn inspect<F>(self, observer: F) -> Sequence<Inspect<S, F>>
    where
        F: Fn(&S::Out) + Send + Sync,
    {
        self.chain(|upstream, id| Inspect::new(upstream, observer, id))
    }
}

// ── Terminal operations ──

impl<S: Stage> Sequence<S> {
    /// Hand the sequence to the executor with one terminal's fold and merge.
    fn drain<A, ID, F, M>(self, identity: ID, fold: F, merge: M) -> PipelineResult<A>
    where
        A: Send,
        ID: Fn() -> A + Send + Sync,
        F: Fn(A, usize, S::Out) -> PipelineResult<A> + Send + Sync,
        M: Fn(A, A) -> PipelineResult<A> + Send + Sync,
    {
        let Sequence {
            source,
            stage,
            executor,
            ..
        } = self;
        executor.drain(source, &stage, identity, fold, merge)
    }

    /// Fold every element into `identity` with `combiner`.
    ///
    /// Both modes return `identity` unchanged for an empty sequence.
    /// Sequential drains apply `combiner(acc, element)` left to right.
    /// Parallel drains reduce each chunk without `identity`, merge the
    /// partial results with `combiner` and finish with
    /// `combiner(identity, total)`, so `combiner` must be associative for
    /// the result to match the sequential one.
    pub fn reduce<F>(self, identity: S::Out, combiner: F) -> PipelineResult<S::Out>
    where
        S::Out: Clone + Sync,
        F: Fn(S::Out, S::Out) -> S::Out + Send + Sync,
    {
        self.try_reduce(identity, move |a, b| Ok::<_, Infallible>(combiner(a, b)))
    }

    pub fn try_reduce<F, E>(self, identity: S::Out, combiner: F) -> PipelineResult<S::Out>
    where
        S::Out: Clone + Sync,
        F: Fn(S::Out, S::Out) -> Result<S::Out, E> + Send + Sync,
        E: Into<BoxError>,
    {
        let id = self.next_id;
        let at_element = move |index: usize| {
            move |e: E| PipelineError::evaluation(id, StageKind::Reduce, Some(index), e)
        };
        let merging = move |e: E| PipelineError::evaluation(id, StageKind::Reduce, None, e);

        if !self.is_parallel() {
            return self.drain(
                || identity.clone(),
                |acc, index, item| combiner(acc, item).map_err(at_element(index)),
                |left, right| combiner(left, right).map_err(merging),
            );
        }

        // Workers start empty so `identity` enters the result exactly once.
        let total = self.drain(
            || None,
            |acc: Option<S::Out>, index, item| match acc {
                None => Ok(Some(item)),
                Some(left) => combiner(left, item).map(Some).map_err(at_element(index)),
            },
            |left, right| match (left, right) {
                (Some(left), Some(right)) => combiner(left, right).map(Some).map_err(merging),
                (partial, None) | (None, partial) => Ok(partial),
            },
        )?;

        match total {
            None => Ok(identity),
            Some(total) => combiner(identity, total).map_err(merging),
        }
    }

    /// Reduce into an accumulator of a different type.
    ///
    /// `accumulator` absorbs one element; `combiner` merges two accumulators
    /// built by different workers and is unused in sequential mode. An empty
    /// sequence returns `identity` unchanged. In parallel mode every worker
    /// that receives elements starts from a clone of `identity`, so it must
    /// be neutral for `combiner`.
    pub fn fold<A, F, C>(self, identity: A, accumulator: F, combiner: C) -> PipelineResult<A>
    where
        A: Clone + Send + Sync,
        F: Fn(A, S::Out) -> A + Send + Sync,
        C: Fn(A, A) -> A + Send + Sync,
    {
        let merged = self.drain(
            || None,
            |acc: Option<A>, _, item| {
                let acc = acc.unwrap_or_else(|| identity.clone());
                Ok(Some(accumulator(acc, item)))
            },
            |left, right| {
                Ok(match (left, right) {
                    (Some(left), Some(right)) => Some(combiner(left, right)),
                    (partial, None) | (None, partial) => partial,
                })
            },
        )?;
        Ok(merged.unwrap_or(identity))
    }

    /// Every surviving element, in encounter order (both modes).
    pub fn collect(self) -> PipelineResult<Vec<S::Out>> {
        self.collect_with(ToVec)
    }

    pub fn count(self) -> PipelineResult<usize> {
        self.drain(|| 0usize, |acc, _, _| Ok(acc + 1), |a, b| Ok(a + b))
    }

    /// Run a single collector over every surviving element.
    pub fn collect_with<C>(self, collector: C) -> PipelineResult<C::Output>
    where
        C: Collector<S::Out>,
    {
        let acc = self.drain(
            || collector.init(),
            |mut acc, _, item| {
                collector.accumulate(&mut acc, item);
                Ok(acc)
            },
            |left, right| Ok(collector.merge(left, right)),
        )?;
        Ok(collector.finish(acc))
    }

    /// Group elements by key and run `collector` over each group.
    ///
    /// The returned map has one entry per distinct key; an empty sequence
    /// yields an empty map. Key order is unspecified.
    pub fn group_by<K, KF, C>(self, key_fn: KF, collector: C) -> PipelineResult<HashMap<K, C::Output>>
    where
        K: Eq + Hash + Send,
        KF: Fn(&S::Out) -> K + Send + Sync,
        C: Collector<S::Out>,
    {
        self.try_group_by(move |item: &S::Out| Ok::<_, Infallible>(key_fn(item)), collector)
    }

    pub fn try_group_by<K, KF, C, E>(
        self,
        key_fn: KF,
        collector: C,
    ) -> PipelineResult<HashMap<K, C::Output>>
    where
        K: Eq + Hash + Send,
        KF: Fn(&S::Out) -> Result<K, E> + Send + Sync,
        C: Collector<S::Out>,
        E: Into<BoxError>,
    {
        let id = self.next_id;
        let groups = self.drain(
            HashMap::new,
            |mut groups: HashMap<K, C::Acc>, index, item| {
                let key = key_fn(&item).map_err(|e| {
                    PipelineError::evaluation(id, StageKind::GroupBy, Some(index), e)
                })?;
                let acc = groups.entry(key).or_insert_with(|| collector.init());
                collector.accumulate(acc, item);
                Ok(groups)
            },
            |mut left, right| {
                for (key, acc) in right {
                    let merged = match left.remove(&key) {
                        Some(existing) => collector.merge(existing, acc),
                        None => acc,
                    };
                    left.insert(key, merged);
                }
                Ok(left)
            },
        )?;

        Ok(groups
            .into_iter()
            .map(|(key, acc)| (key, collector.finish(acc)))
            .collect())
    }

    /// Split elements by predicate outcome. Both groups are always present
    /// and each keeps encounter order.
    pub fn partition_by<P>(self, predicate: P) -> PipelineResult<Partitioned<S::Out>>
    where
        P: Fn(&S::Out) -> bool + Send + Sync,
    {
        self.try_partition_by(move |item: &S::Out| Ok::<_, Infallible>(predicate(item)))
    }

    pub fn try_partition_by<P, E>(self, predicate: P) -> PipelineResult<Partitioned<S::Out>>
    where
        P: Fn(&S::Out) -> Result<bool, E> + Send + Sync,
        E: Into<BoxError>,
    {
        let id = self.next_id;
        self.drain(
            Partitioned::new,
            |mut parts, index, item| {
                let outcome = predicate(&item).map_err(|e| {
                    PipelineError::evaluation(id, StageKind::Partition, Some(index), e)
                })?;
                parts.push(outcome, item);
                Ok(parts)
            },
            |mut left, mut right| {
                left.append(&mut right);
                Ok(left)
            },
        )
    }
}

impl<S: Stage> std::fmt::Debug for Sequence<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequence")
            .field("source", &self.source)
            .field("stages", &self.stage_count())
            .field("executor", &self.executor)
            .finish()
    }
}
