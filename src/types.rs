//! Core data types shared across the crate.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// How a pipeline is drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationMode {
    /// One element at a time, in source order, on the calling thread.
    #[default]
    Sequential,
    /// Chunks of the source folded by concurrent workers, then merged.
    Parallel,
}

impl EvaluationMode {
    pub fn is_parallel(self) -> bool {
        self == EvaluationMode::Parallel
    }

    pub fn display_name(self) -> &'static str {
        match self {
            EvaluationMode::Sequential => "sequential",
            EvaluationMode::Parallel => "parallel",
        }
    }
}

impl fmt::Display for EvaluationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Result of a partitioning terminal: both groups are always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partitioned<T> {
    /// Elements for which the predicate held, in encounter order.
    pub matched: Vec<T>,
    /// Elements for which the predicate failed, in encounter order.
    pub unmatched: Vec<T>,
}

impl<T> Partitioned<T> {
    pub fn new() -> Self {
        Self {
            matched: Vec::new(),
            unmatched: Vec::new(),
        }
    }

    /// The group for a predicate outcome.
    pub fn get(&self, outcome: bool) -> &[T] {
        if outcome {
            &self.matched
        } else {
            &self.unmatched
        }
    }

    pub fn push(&mut self, outcome: bool, item: T) {
        if outcome {
            self.matched.push(item);
        } else {
            self.unmatched.push(item);
        }
    }

    /// Append another partition's groups after this one's.
    pub fn append(&mut self, other: &mut Partitioned<T>) {
        self.matched.append(&mut other.matched);
        self.unmatched.append(&mut other.unmatched);
    }

    pub fn len(&self) -> usize {
        self.matched.len() + self.unmatched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keyed view with both `false` and `true` present.
    pub fn into_map(self) -> BTreeMap<bool, Vec<T>> {
        BTreeMap::from([(false, self.unmatched), (true, self.matched)])
    }
}

impl<T> Default for Partitioned<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Display> fmt::Display for Partitioned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn group<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
            write!(f, "[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", item)?;
            }
            write!(f, "]")
        }

        write!(f, "{{false=")?;
        group(f, &self.unmatched)?;
        write!(f, ", true=")?;
        group(f, &self.matched)?;
        write!(f, "}}")
    }
}
