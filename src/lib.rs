//! # lazy-pipeline: Lazy aggregation pipelines
//!
//! Functional-style pipelines over ranges and lists: filter, map, reduce,
//! group and partition, evaluated lazily either sequentially or as a
//! fork-join over a rayon worker pool.
//!
//! ## Architecture
//!
//! - **Pipeline**: `Sequence` records a source and a chain of stages; nothing
//!   runs until a terminal operation drains it
//! - **Executor**: sequential depth-first loop or rayon fork-join with
//!   pairwise merging of partial results
//! - **Trace**: pluggable sink for the per-call teaching trace
//! - **Lessons**: the teaching scenarios, shared by tests and the demo binary
//!
//! ## Configuration
//!
//! Evaluation mode, worker count, chunk size and trace target can be loaded
//! from a JSON file (see [`config::PipelineConfig`]). The demo binary reads
//! `pipeline.json` from the working directory, or the path given as its
//! first argument.
//!
//! ## Example
//!
//! ```
//! use lazy_pipeline::{counting, Sequence};
//!
//! let factorial = Sequence::range_closed(1, 6)?.reduce(1, |a, b| a * b)?;
//! assert_eq!(factorial, 720);
//!
//! let by_remainder = Sequence::range_closed(1, 10)?
//!     .parallel()
//!     .group_by(|i| i % 3, counting())?;
//! assert_eq!(by_remainder.values().sum::<usize>(), 10);
//! # Ok::<(), lazy_pipeline::PipelineError>(())
//! ```

pub mod config;
pub mod error;
pub mod lessons;
pub mod pipeline;
pub mod types;

// Re-export commonly used types
pub use config::{PipelineConfig, TraceTarget};
pub use error::{LabError, Result, ResultExt};
pub use pipeline::{
    counting, summing, to_vec, Collector, Executor, PipelineError, PipelineResult, Sequence,
    Source, StageId, StageKind, Trace,
};
pub use types::{EvaluationMode, Partitioned};
