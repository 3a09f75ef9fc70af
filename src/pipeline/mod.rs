//! Lazy sequence pipelines.
//!
//! Elements flow from a source through a chain of stages into a terminal
//! operation: Source (range, list, generator) → Stages (filter, map, inspect)
//! → Terminal (reduce, fold, collect, group_by, partition_by).
//!
//! # Architecture
//!
//! ```text
//! [Source] ──► [Filter] ──► [Map] ──► terminal fold ──► result
//!                                         ▲
//!                     Executor: sequential loop or rayon fork-join
//! ```
//!
//! # Design
//!
//! - **Static dispatch**: stages nest as generic types, closures are stored
//!   by value, no boxing on the per-element path.
//! - **Lazy**: building a [`Sequence`] evaluates nothing; terminals consume it.
//! - **Depth-first**: one element passes the whole chain before the next
//!   one is produced.
//! - **Fork-join**: parallel drains fold chunks independently and merge the
//!   partial accumulators pairwise, never through shared counters.

pub mod collector;
pub mod error;
pub mod executor;
pub mod id;
pub mod sequence;
pub mod source;
pub mod stage;
pub mod trace;

pub use collector::{counting, mapping, summing, to_vec, Collector, Counting, Summing, ToVec};
pub use error::{BoxError, PipelineError, PipelineResult};
pub use executor::Executor;
pub use id::{StageId, StageKind};
pub use sequence::Sequence;
pub use source::Source;
pub use stage::{Filter, Identity, Inspect, Map, Stage};
pub use trace::{ChannelTrace, ConsoleTrace, LogTrace, NullTrace, Trace, TraceLine, TraceSink};
