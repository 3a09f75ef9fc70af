//! Teaching scenarios built on [`Sequence`].
//!
//! An aggregate operation works on a sequence of items and results in a
//! single value. A collection is an in-memory structure that already holds
//! all its elements; a sequence has no storage and pulls elements from its
//! source on demand, passing them through a pipeline of operations.
//!
//! Each lesson returns its terminal result so tests can assert on it, and
//! writes its trace to the given [`Trace`] so the call order can be read.

use crate::config::PipelineConfig;
use crate::pipeline::{counting, Identity, PipelineResult, Sequence, Trace};
use crate::types::Partitioned;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// `n!` as a product reduction over `[1, n]`. `0! = 1` via the empty range.
pub fn factorial(n: i64) -> PipelineResult<i64> {
    Sequence::range(1, n.saturating_add(1))?.try_reduce(1, |a: i64, b: i64| {
        a.checked_mul(b)
            .ok_or_else(|| format!("{}! overflows i64", n))
    })
}

/// Left fold of strings from `seed`, tracing every combiner call.
///
/// `["a", "b", "c"]` from `"x"` gives `"x_a_b_c"`.
pub fn reduce_walkthrough(items: &[&str], seed: &str, trace: &Trace) -> PipelineResult<String> {
    Sequence::of(items.iter().map(|s| s.to_string())).reduce(
        seed.to_string(),
        trace.combiner("reduce", |acc: String, e: String| format!("{}_{}", acc, e)),
    )
}

/// Both results of [`lazy_vs_eager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeComparison {
    pub sequential: i64,
    pub parallel: i64,
}

impl ModeComparison {
    pub fn agrees(&self) -> bool {
        self.sequential == self.parallel
    }
}

/// Sum of even squares over `[lo, hi]`, drained once sequentially and once
/// in parallel.
///
/// The sequential trace interleaves `filter`, `map` and `reduce` per element.
/// The parallel trace has no fixed order, but the sum is the same because
/// addition is associative and commutative and `0` is its identity.
pub fn lazy_vs_eager(lo: i64, hi: i64, trace: &Trace) -> PipelineResult<ModeComparison> {
    let drain = |sequence: Sequence<Identity<i64>>| {
        sequence
            .filter(trace.predicate("filter", |i: &i64| i % 2 == 0))
            .map(trace.transform("map   ", |i: i64| i * i))
            .reduce(0, trace.combiner("reduce", |a: i64, d: i64| a + d))
    };

    trace.line("NON-PARALLEL");
    let sequential = drain(Sequence::range_closed(lo, hi)?.sequential())?;
    trace.line("PARALLEL");
    let parallel = drain(Sequence::range_closed(lo, hi)?.parallel())?;

    Ok(ModeComparison {
        sequential,
        parallel,
    })
}

/// Sum of even squares over `[lo, hi]` with mode, pool and chunking taken
/// from `config`.
pub fn configured_sum(lo: i64, hi: i64, config: &PipelineConfig) -> PipelineResult<i64> {
    Sequence::range_closed(lo, hi)?
        .with_config(config)?
        .filter(|i| i % 2 == 0)
        .map(|i| i * i)
        .reduce(0, |a, b| a + b)
}

/// Count of `i % 3` over `[1, 10]`, keyed by remainder.
pub fn simple_grouping(trace: &Trace) -> PipelineResult<HashMap<i64, usize>> {
    let groups = Sequence::range_closed(1, 10)?
        .map(|i| i % 3)
        .group_by(|k| *k, counting())?;
    trace.line(format_groups(&groups));
    Ok(groups)
}

/// `[1, 10]` split by `i * i < 30`.
pub fn simple_partition(trace: &Trace) -> PipelineResult<Partitioned<i64>> {
    let parts = Sequence::range_closed(1, 10)?.partition_by(|i| i * i < 30)?;
    trace.line(parts.to_string());
    Ok(parts)
}

/// Predicate call counts observed by [`laziness_probe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LazinessReport {
    /// Calls made by building the lazy pipeline.
    pub lazy_after_build: usize,
    /// Calls made once the lazy pipeline was drained.
    pub lazy_after_drain: usize,
    /// Calls made by building an eager collection of the same elements.
    pub eager_after_build: usize,
}

/// Count predicate calls for a lazy pipeline and an eager collection over
/// `[lo, hi]`.
pub fn laziness_probe(lo: i64, hi: i64) -> PipelineResult<LazinessReport> {
    let lazy_calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&lazy_calls);
    let pipeline = Sequence::range_closed(lo, hi)?.filter(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        true
    });
    let lazy_after_build = lazy_calls.load(Ordering::SeqCst);
    pipeline.count()?;
    let lazy_after_drain = lazy_calls.load(Ordering::SeqCst);

    let eager_calls = AtomicUsize::new(0);
    let eager: Vec<i64> = (lo..=hi)
        .filter(|_| {
            eager_calls.fetch_add(1, Ordering::SeqCst);
            true
        })
        .collect();
    debug_assert_eq!(eager.len(), eager_calls.load(Ordering::SeqCst));

    Ok(LazinessReport {
        lazy_after_build,
        lazy_after_drain,
        eager_after_build: eager_calls.load(Ordering::SeqCst),
    })
}

/// Render groups as `{0=3, 1=4, 2=3}` with keys in ascending order.
pub fn format_groups<K, V>(groups: &HashMap<K, V>) -> String
where
    K: Ord + std::fmt::Display,
    V: std::fmt::Display,
{
    let mut entries: Vec<_> = groups.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    let body: Vec<String> = entries
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect();
    format!("{{{}}}", body.join(", "))
}
