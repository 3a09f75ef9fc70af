//! Pipeline-specific error types.

use crate::pipeline::id::{StageId, StageKind};
use thiserror::Error;

/// Error type accepted from user-supplied predicates, transforms and combiners.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while building or draining a pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid range [{lo}, {hi}]: lower bound is greater than upper bound")]
    InvalidRange { lo: i64, hi: i64 },

    #[error("Range [{lo}, {hi}] has more elements than can be addressed")]
    RangeOverflow { lo: i64, hi: i64 },

    #[error("{kind} stage {stage} failed{}: {source}", element_suffix(.index))]
    Evaluation {
        stage: StageId,
        kind: StageKind,
        /// Source index of the element being processed, `None` while merging
        /// partial results.
        index: Option<usize>,
        #[source]
        source: BoxError,
    },

    #[error("Invalid pipeline config: {0}")]
    InvalidConfig(String),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl PipelineError {
    pub fn evaluation(
        stage: StageId,
        kind: StageKind,
        index: Option<usize>,
        source: impl Into<BoxError>,
    ) -> Self {
        PipelineError::Evaluation {
            stage,
            kind,
            index,
            source: source.into(),
        }
    }

    /// Source index of the failing element, if the error came from a drain.
    pub fn element_index(&self) -> Option<usize> {
        match self {
            PipelineError::Evaluation { index, .. } => *index,
            _ => None,
        }
    }

    /// Kind of the stage that raised the error, if the error came from a drain.
    pub fn stage_kind(&self) -> Option<StageKind> {
        match self {
            PipelineError::Evaluation { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

fn element_suffix(index: &Option<usize>) -> String {
    match index {
        Some(i) => format!(" at element {}", i),
        None => " while merging partial results".to_string(),
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
