//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;

use lazy_pipeline::pipeline::trace::{drain_lines, TraceLine};
use lazy_pipeline::Trace;
use crossbeam_channel::Receiver;

/// Trace handle whose lines can be read back
pub fn capture_trace() -> (Trace, Receiver<TraceLine>) {
    Trace::capture()
}

/// Lines captured so far, in arrival order
pub fn captured(rx: &Receiver<TraceLine>) -> Vec<String> {
    drain_lines(rx)
}

/// Assert two slices hold the same elements regardless of order
pub fn assert_same_elements<T: Ord + Clone + std::fmt::Debug>(a: &[T], b: &[T]) {
    let mut left = a.to_vec();
    let mut right = b.to_vec();
    left.sort();
    right.sort();
    assert_eq!(
        left, right,
        "Expected {:?} and {:?} to contain the same elements",
        a, b
    );
}
