//! Test data builders for creating test pipelines

use lazy_pipeline::pipeline::Identity;
use lazy_pipeline::{EvaluationMode, PipelineConfig, Sequence};

/// Builder for closed-range pipelines with a chosen evaluation setup
pub struct RangeCase {
    lo: i64,
    hi: i64,
    mode: EvaluationMode,
    workers: Option<usize>,
    min_chunk_len: usize,
}

impl RangeCase {
    pub fn new(lo: i64, hi: i64) -> Self {
        Self {
            lo,
            hi,
            mode: EvaluationMode::Sequential,
            workers: None,
            min_chunk_len: 1,
        }
    }

    pub fn parallel(mut self) -> Self {
        self.mode = EvaluationMode::Parallel;
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn min_chunk_len(mut self, min_chunk_len: usize) -> Self {
        self.min_chunk_len = min_chunk_len;
        self
    }

    pub fn config(&self) -> PipelineConfig {
        let mut config = match self.mode {
            EvaluationMode::Sequential => PipelineConfig::sequential(),
            EvaluationMode::Parallel => PipelineConfig::parallel(),
        }
        .with_min_chunk_len(self.min_chunk_len);
        config.workers = self.workers;
        config
    }

    pub fn build(&self) -> Sequence<Identity<i64>> {
        Sequence::range_closed(self.lo, self.hi)
            .expect("test range should be valid")
            .with_config(&self.config())
            .expect("test config should build")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_case_builder() {
        let case = RangeCase::new(1, 10).parallel().workers(2).min_chunk_len(4);
        let config = case.config();

        assert_eq!(config.mode, EvaluationMode::Parallel);
        assert_eq!(config.workers, Some(2));
        assert_eq!(config.min_chunk_len, 4);

        let seq = case.build();
        assert!(seq.is_parallel());
        assert_eq!(seq.source_len(), 10);
    }
}
