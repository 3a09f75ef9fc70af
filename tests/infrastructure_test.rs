//! Test to verify test infrastructure works correctly

mod common;

use common::builders::RangeCase;
use lazy_pipeline::EvaluationMode;

#[test]
fn test_infrastructure_setup() {
    // Test that builders work
    let case = RangeCase::new(0, 4).parallel().min_chunk_len(2);
    assert_eq!(case.config().mode, EvaluationMode::Parallel);
    assert_eq!(case.build().collect().unwrap(), vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_trace_capture() {
    let (trace, rx) = common::capture_trace();
    trace.line("hello");
    assert_eq!(common::captured(&rx), vec!["hello"]);
}

#[test]
fn test_same_elements_ignores_order() {
    common::assert_same_elements(&[3, 1, 2], &[1, 2, 3]);
}

#[test]
#[should_panic]
fn test_same_elements_fails() {
    common::assert_same_elements(&[1, 2], &[1, 3]);
}
