//! Error handling for the crate
//!
//! Pipeline failures live in [`crate::pipeline::PipelineError`]. This module
//! wraps them together with configuration and IO failures for callers that
//! deal with more than a single drain, such as the demo binary.

use crate::pipeline::PipelineError;
use thiserror::Error;

/// Main error type for crate-level operations
#[derive(Error, Debug)]
pub enum LabError {
    /// Errors raised while building or draining a pipeline
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<LabError>,
    },
}

impl LabError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        LabError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The underlying pipeline error, looking through any context layers
    pub fn pipeline_error(&self) -> Option<&PipelineError> {
        match self {
            LabError::Pipeline(e) => Some(e),
            LabError::WithContext { source, .. } => source.pipeline_error(),
            _ => None,
        }
    }
}

/// Result type alias for crate-level operations
pub type Result<T> = std::result::Result<T, LabError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, PipelineError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| LabError::from(e).with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| LabError::from(e).with_context(f()))
    }
}
