//! Pipeline sources.
//!
//! A source is either an explicit list of elements or a generator over the
//! index space `0..len`. Ranges are generators, so a range is never
//! materialised: sequential drains produce one element at a time and parallel
//! drains split the index space across workers.

use crate::pipeline::error::{PipelineError, PipelineResult};
use std::fmt;
use std::sync::Arc;

/// Produces the element at a given source index.
pub type Generator<T> = Arc<dyn Fn(usize) -> T + Send + Sync>;

/// Where a pipeline's elements come from.
pub enum Source<T> {
    /// An explicit ordered list.
    List(Vec<T>),
    /// `len` elements produced on demand from their index.
    Generated { len: usize, generator: Generator<T> },
}

impl<T> Source<T> {
    pub fn list(items: Vec<T>) -> Self {
        Source::List(items)
    }

    pub fn generated<F>(len: usize, generator: F) -> Self
    where
        F: Fn(usize) -> T + Send + Sync + 'static,
    {
        Source::Generated {
            len,
            generator: Arc::new(generator),
        }
    }

    pub fn empty() -> Self {
        Source::List(Vec::new())
    }

    /// Number of elements the source will yield.
    pub fn len(&self) -> usize {
        match self {
            Source::List(items) => items.len(),
            Source::Generated { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate `(index, element)` pairs in source order.
    pub fn into_indexed_iter(self) -> SourceIter<T> {
        match self {
            Source::List(items) => SourceIter::List(items.into_iter().enumerate()),
            Source::Generated { len, generator } => SourceIter::Generated {
                next: 0,
                len,
                generator,
            },
        }
    }
}

impl Source<i64> {
    /// Closed range `[lo, hi]`. Fails if `lo > hi`.
    pub fn range_closed(lo: i64, hi: i64) -> PipelineResult<Self> {
        if lo > hi {
            return Err(PipelineError::InvalidRange { lo, hi });
        }
        let len = span(lo, hi)
            .and_then(|d| d.checked_add(1))
            .ok_or(PipelineError::RangeOverflow { lo, hi })?;
        Ok(Self::counting_from(lo, len))
    }

    /// Half-open range `[lo, hi)`. Empty when `lo == hi`, fails if `lo > hi`.
    pub fn range(lo: i64, hi: i64) -> PipelineResult<Self> {
        if lo > hi {
            return Err(PipelineError::InvalidRange { lo, hi });
        }
        let len = span(lo, hi).ok_or(PipelineError::RangeOverflow { lo, hi })?;
        Ok(Self::counting_from(lo, len))
    }

    fn counting_from(start: i64, len: usize) -> Self {
        // len was derived from an i64 span, so the offset always fits
        Source::generated(len, move |offset| start + offset as i64)
    }
}

fn span(lo: i64, hi: i64) -> Option<usize> {
    hi.checked_sub(lo).and_then(|d| usize::try_from(d).ok())
}

impl<T> From<Vec<T>> for Source<T> {
    fn from(items: Vec<T>) -> Self {
        Source::List(items)
    }
}

impl<T: Clone> Clone for Source<T> {
    fn clone(&self) -> Self {
        match self {
            Source::List(items) => Source::List(items.clone()),
            Source::Generated { len, generator } => Source::Generated {
                len: *len,
                generator: Arc::clone(generator),
            },
        }
    }
}

impl<T> fmt::Debug for Source<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::List(items) => f.debug_struct("List").field("len", &items.len()).finish(),
            Source::Generated { len, .. } => {
                f.debug_struct("Generated").field("len", len).finish()
            }
        }
    }
}

/// Sequential iterator over a source's `(index, element)` pairs.
pub enum SourceIter<T> {
    List(std::iter::Enumerate<std::vec::IntoIter<T>>),
    Generated {
        next: usize,
        len: usize,
        generator: Generator<T>,
    },
}

impl<T> Iterator for SourceIter<T> {
    type Item = (usize, T);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            SourceIter::List(iter) => iter.next(),
            SourceIter::Generated {
                next,
                len,
                generator,
            } => {
                if *next >= *len {
                    return None;
                }
                let index = *next;
                *next += 1;
                Some((index, generator(index)))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match self {
            SourceIter::List(iter) => iter.len(),
            SourceIter::Generated { next, len, .. } => len.saturating_sub(*next),
        };
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for SourceIter<T> {}
