//! Configuration for pipeline evaluation.
//!
//! A [`PipelineConfig`] selects the evaluation mode, the worker pool used for
//! parallel drains, the minimum chunk size handed to a worker, and where
//! teaching trace lines are written. None of it changes what a pipeline
//! computes, only how it is scheduled and observed.
//!
//! Configs are stored as pretty-printed JSON:
//!
//! ```json
//! {
//!   "mode": "parallel",
//!   "workers": 4,
//!   "min_chunk_len": 16,
//!   "trace": "console"
//! }
//! ```
//!
//! # Example
//!
//! ```ignore
//! use lazy_pipeline::{config::PipelineConfig, Sequence};
//!
//! let config = PipelineConfig::load_or_default("pipeline.json");
//! let total = Sequence::range_closed(0, 10)?
//!     .with_config(&config)?
//!     .reduce(0, |a, b| a + b)?;
//! ```

use crate::error::{LabError, Result, ResultExt};
use crate::types::EvaluationMode;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config filename looked up by the demo binary
pub const DEFAULT_CONFIG_FILE: &str = "pipeline.json";

/// Default lower bound on elements per parallel chunk
pub const DEFAULT_MIN_CHUNK_LEN: usize = 1;

/// Upper bound on a dedicated worker pool
pub const MAX_WORKERS: usize = 1024;

/// Where teaching trace lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceTarget {
    /// Standard output, one line per call.
    #[default]
    Console,
    /// Forwarded to `tracing` at info level.
    Log,
    /// Discarded.
    Off,
}

/// Evaluation settings for pipelines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Version for future migration support
    #[serde(default = "default_config_version")]
    pub version: u32,

    /// Evaluation mode applied by `Sequence::with_config`
    #[serde(default)]
    pub mode: EvaluationMode,

    /// Size of a dedicated worker pool. `None` uses the global rayon pool.
    #[serde(default)]
    pub workers: Option<usize>,

    /// Lower bound on elements per parallel chunk
    #[serde(default = "default_min_chunk_len")]
    pub min_chunk_len: usize,

    /// Trace output target
    #[serde(default)]
    pub trace: TraceTarget,
}

fn default_config_version() -> u32 {
    1
}

fn default_min_chunk_len() -> usize {
    DEFAULT_MIN_CHUNK_LEN
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            version: 1,
            mode: EvaluationMode::Sequential,
            workers: None,
            min_chunk_len: DEFAULT_MIN_CHUNK_LEN,
            trace: TraceTarget::Console,
        }
    }
}

impl PipelineConfig {
    /// Sequential evaluation with default settings.
    pub fn sequential() -> Self {
        Self::default()
    }

    /// Parallel evaluation on the global pool.
    pub fn parallel() -> Self {
        Self {
            mode: EvaluationMode::Parallel,
            ..Self::default()
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn with_min_chunk_len(mut self, min_chunk_len: usize) -> Self {
        self.min_chunk_len = min_chunk_len;
        self
    }

    pub fn with_trace(mut self, trace: TraceTarget) -> Self {
        self.trace = trace;
        self
    }

    /// Reject settings that cannot be scheduled.
    pub fn validate(&self) -> Result<()> {
        self.scheduling_problem().map_or(Ok(()), |problem| Err(LabError::Config(problem)))
    }

    /// Description of the first setting that cannot be scheduled, if any.
    pub fn scheduling_problem(&self) -> Option<String> {
        if let Some(workers) = self.workers {
            if workers == 0 || workers > MAX_WORKERS {
                return Some(format!(
                    "workers must be between 1 and {}, got {}",
                    MAX_WORKERS, workers
                ));
            }
        }
        if self.min_chunk_len == 0 {
            return Some("min_chunk_len must be at least 1".to_string());
        }
        None
    }

    /// Parse and validate a config from JSON text
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| LabError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(LabError::from)
            .with_context(|| format!("Failed to read config file {:?}", path))?;

        Self::from_json(&content)
    }

    /// Load a config file, returning defaults if any error occurs
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load pipeline config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save config to disk as JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(LabError::from)
                    .with_context(|| format!("Failed to create config directory {:?}", parent))?;
            }
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| LabError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(LabError::from)
            .with_context(|| format!("Failed to write config file {:?}", path))
    }
}
