//! Intermediate pipeline stages.
//!
//! Stages form a singly-linked chain: every stage owns its upstream stage by
//! value, and the chain bottoms out in [`Identity`], which passes source
//! elements through untouched. Pushing one element through the chain is a
//! single call to [`Stage::process`] on the outermost stage, which recurses
//! down to the source first. That gives depth-first evaluation per element.
//!
//! Stages only hold the closures captured at construction time. They carry no
//! per-drain state, so the same chain shape drained twice yields the same
//! result, and `&self` access lets parallel workers share one chain.

use crate::pipeline::error::{BoxError, PipelineError, PipelineResult};
use crate::pipeline::id::{StageId, StageKind};
use std::marker::PhantomData;

/// One link in a pipeline chain.
pub trait Stage: Send + Sync {
    /// Element type entering the chain at the source.
    type In: Send;
    /// Element type leaving this stage.
    type Out: Send;

    /// Push one source element through this stage and everything upstream
    /// of it. `Ok(None)` means a filter dropped the element.
    fn process(&self, index: usize, item: Self::In) -> PipelineResult<Option<Self::Out>>;

    /// Position of this stage in the chain.
    fn id(&self) -> StageId;
}

/// Root of every chain: hands source elements downstream unchanged.
pub struct Identity<T> {
    _marker: PhantomData<fn(T) -> T>,
}

impl<T> Identity<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for Identity<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send> Stage for Identity<T> {
    type In = T;
    type Out = T;

    #[inline]
    fn process(&self, _index: usize, item: T) -> PipelineResult<Option<T>> {
        Ok(Some(item))
    }

    fn id(&self) -> StageId {
        StageId::SOURCE
    }
}

/// Passes an element downstream only when the predicate holds.
pub struct Filter<S, P> {
    upstream: S,
    predicate: P,
    id: StageId,
}

impl<S, P> Filter<S, P> {
    pub fn new(upstream: S, predicate: P, id: StageId) -> Self {
        Self {
            upstream,
            predicate,
            id,
        }
    }
}

impl<S, P, E> Stage for Filter<S, P>
where
    S: Stage,
    P: Fn(&S::Out) -> Result<bool, E> + Send + Sync,
    E: Into<BoxError>,
{
    type In = S::In;
    type Out = S::Out;

    fn process(&self, index: usize, item: S::In) -> PipelineResult<Option<S::Out>> {
        let Some(item) = self.upstream.process(index, item)? else {
            return Ok(None);
        };
        let keep = (self.predicate)(&item).map_err(|e| {
            PipelineError::evaluation(self.id, StageKind::Filter, Some(index), e)
        })?;
        Ok(keep.then_some(item))
    }

    fn id(&self) -> StageId {
        self.id
    }
}

/// Replaces each element with the transform's result.
pub struct Map<S, F> {
    upstream: S,
    transform: F,
    id: StageId,
}

impl<S, F> Map<S, F> {
    pub fn new(upstream: S, transform: F, id: StageId) -> Self {
        Self {
            upstream,
            transform,
            id,
        }
    }
}

impl<S, F, U, E> Stage for Map<S, F>
where
    S: Stage,
    F: Fn(S::Out) -> Result<U, E> + Send + Sync,
    U: Send,
    E: Into<BoxError>,
{
    type In = S::In;
    type Out = U;

    fn process(&self, index: usize, item: S::In) -> PipelineResult<Option<U>> {
        let Some(item) = self.upstream.process(index, item)? else {
            return Ok(None);
        };
        (self.transform)(item)
            .map(Some)
            .map_err(|e| PipelineError::evaluation(self.id, StageKind::Map, Some(index), e))
    }

    fn id(&self) -> StageId {
        self.id
    }
}

/// Observes each element passing this point without changing it.
pub struct Inspect<S, F> {
    upstream: S,
    observer: F,
    id: StageId,
}

impl<S, F> Inspect<S, F> {
    pub fn new(upstream: S, observer: F, id: StageId) -> Self {
        Self {
            upstream,
            observer,
            id,
        }
    }
}

impl<S, F> Stage for Inspect<S, F>
where
    S: Stage,
    F: Fn(&S::Out) + Send + Sync,
{
    type In = S::In;
    type Out = S::Out;

    fn process(&self, index: usize, item: S::In) -> PipelineResult<Option<S::Out>> {
        let out = self.upstream.process(index, item)?;
        if let Some(item) = &out {
            (self.observer)(item);
        }
        Ok(out)
    }

    fn id(&self) -> StageId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::sync::Mutex;

    fn is_even(i: &i64) -> Result<bool, Infallible> {
        Ok(i % 2 == 0)
    }

    #[test]
    fn test_identity_passes_through() {
        let stage = Identity::<i64>::new();
        assert_eq!(stage.process(0, 42).unwrap(), Some(42));
        assert!(stage.id().is_source());
    }

    #[test]
    fn test_filter_drops_rejected_elements() {
        let stage = Filter::new(Identity::<i64>::new(), is_even, StageId(1));
        assert_eq!(stage.process(0, 2).unwrap(), Some(2));
        assert_eq!(stage.process(1, 3).unwrap(), None);
    }

    #[test]
    fn test_map_runs_after_filter() {
        let filter = Filter::new(Identity::<i64>::new(), is_even, StageId(1));
        let map = Map::new(filter, |i: i64| Ok::<_, Infallible>(i * i), StageId(2));
        assert_eq!(map.process(0, 4).unwrap(), Some(16));
        assert_eq!(map.process(1, 5).unwrap(), None);
        assert_eq!(map.id(), StageId(2));
    }

    #[test]
    fn test_depth_first_call_order() {
        let log = Mutex::new(Vec::new());
        let filter = Filter::new(
            Identity::<i64>::new(),
            |i: &i64| {
                log.lock().unwrap().push(format!("filter:{}", i));
                Ok::<_, Infallible>(i % 2 == 0)
            },
            StageId(1),
        );
        let map = Map::new(
            filter,
            |i: i64| {
                log.lock().unwrap().push(format!("map:{}", i));
                Ok::<_, Infallible>(i * i)
            },
            StageId(2),
        );

        for (index, item) in [1, 2].into_iter().enumerate() {
            map.process(index, item).unwrap();
        }

        assert_eq!(
            *log.lock().unwrap(),
            vec!["filter:1", "filter:2", "map:2"]
        );
    }

    #[test]
    fn test_filter_error_carries_stage_and_index() {
        let stage = Filter::new(
            Identity::<i64>::new(),
            |i: &i64| {
                if *i < 0 {
                    Err(format!("negative value {}", i))
                } else {
                    Ok(true)
                }
            },
            StageId(1),
        );

        let err = stage.process(7, -3).unwrap_err();
        assert_eq!(err.element_index(), Some(7));
        assert_eq!(err.stage_kind(), Some(StageKind::Filter));
        assert!(err.to_string().contains("negative value -3"));
    }

    #[test]
    fn test_map_error_skipped_for_filtered_elements() {
        let filter = Filter::new(Identity::<i64>::new(), is_even, StageId(1));
        let map = Map::new(
            filter,
            |_: i64| Err::<i64, _>("never reached for odd input"),
            StageId(2),
        );
        assert_eq!(map.process(0, 3).unwrap(), None);
        assert!(map.process(1, 4).is_err());
    }

    #[test]
    fn test_inspect_sees_only_surviving_elements() {
        let seen = Mutex::new(Vec::new());
        let filter = Filter::new(Identity::<i64>::new(), is_even, StageId(1));
        let inspect = Inspect::new(filter, |i: &i64| seen.lock().unwrap().push(*i), StageId(2));

        for (index, item) in (1..=4).enumerate() {
            inspect.process(index, item).unwrap();
        }
        assert_eq!(*seen.lock().unwrap(), vec![2, 4]);
    }
}
