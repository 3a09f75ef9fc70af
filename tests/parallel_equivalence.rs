//! Property tests: for associative, commutative operations with a true
//! identity, sequential and parallel drains agree.

mod common;

use lazy_pipeline::{counting, lessons, Sequence};
use proptest::prelude::*;

fn both_modes(items: &[i64]) -> [Sequence<lazy_pipeline::pipeline::Identity<i64>>; 2] {
    [
        Sequence::from_vec(items.to_vec()),
        Sequence::from_vec(items.to_vec()).parallel(),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_sum_matches(items in prop::collection::vec(-1000i64..1000, 0..300)) {
        let expected: i64 = items.iter().filter(|i| *i % 2 == 0).map(|i| i * i).sum();
        for seq in both_modes(&items) {
            let sum = seq
                .filter(|i| i % 2 == 0)
                .map(|i| i * i)
                .reduce(0, |a, b| a + b)
                .unwrap();
            prop_assert_eq!(sum, expected);
        }
    }

    #[test]
    fn prop_collect_keeps_encounter_order(items in prop::collection::vec(any::<i64>(), 0..300)) {
        let expected: Vec<i64> = items.iter().copied().filter(|i| i % 3 != 0).collect();
        for seq in both_modes(&items) {
            prop_assert_eq!(seq.filter(|i| i % 3 != 0).collect().unwrap(), expected.clone());
        }
    }

    #[test]
    fn prop_group_counts_match(items in prop::collection::vec(0i64..50, 0..300)) {
        let [sequential, parallel] = both_modes(&items);
        let left = sequential.group_by(|i| i % 7, counting()).unwrap();
        let right = parallel.group_by(|i| i % 7, counting()).unwrap();
        prop_assert_eq!(&left, &right);
        prop_assert_eq!(left.values().sum::<usize>(), items.len());
    }

    #[test]
    fn prop_partition_matches(items in prop::collection::vec(any::<i32>(), 0..300)) {
        let items: Vec<i64> = items.into_iter().map(i64::from).collect();
        let [sequential, parallel] = both_modes(&items);
        let left = sequential.partition_by(|i| *i >= 0).unwrap();
        let right = parallel.partition_by(|i| *i >= 0).unwrap();
        prop_assert_eq!(&left, &right);
        prop_assert_eq!(left.len(), items.len());
    }

    #[test]
    fn prop_range_sum_is_closed_form(lo in -500i64..500, span in 0i64..500) {
        let hi = lo + span;
        let expected = (lo..=hi).sum::<i64>();
        let sequential = Sequence::range_closed(lo, hi).unwrap().reduce(0, |a, b| a + b).unwrap();
        let parallel = Sequence::range_closed(lo, hi).unwrap().parallel().reduce(0, |a, b| a + b).unwrap();
        prop_assert_eq!(sequential, expected);
        prop_assert_eq!(parallel, expected);
    }

    #[test]
    fn prop_drain_is_repeatable(items in prop::collection::vec(-100i64..100, 0..100)) {
        let build = || Sequence::from_vec(items.clone()).parallel().map(|i| i + 1);
        let first = build().collect().unwrap();
        let second = build().collect().unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_factorial_matches_iterative(n in 0i64..=20) {
        let expected: i64 = (1..=n).product();
        prop_assert_eq!(lessons::factorial(n).unwrap(), expected);
    }
}

#[test]
fn test_non_neutral_identity_enters_parallel_result_once() {
    // Joining with a separator is associative but "x" is not its identity.
    let build = || Sequence::range_closed(1, 300).unwrap().map(|i| i.to_string());
    let join = |acc: String, e: String| format!("{}_{}", acc, e);

    let sequential = build().reduce("x".to_string(), join).unwrap();
    let parallel = build()
        .parallel()
        .reduce("x".to_string(), join)
        .unwrap();

    assert_eq!(parallel, sequential);
    assert_eq!(parallel.matches('x').count(), 1);
}

#[test]
fn test_parallel_reduce_of_empty_input_is_identity_for_any_combiner() {
    let result = Sequence::range_closed(1, 10)
        .unwrap()
        .parallel()
        .filter(|i| *i > 100)
        .reduce(7, |a, b| a * 1000 + b)
        .unwrap();
    assert_eq!(result, 7);
}

#[test]
fn test_parallel_collect_is_same_multiset_as_input() {
    let items: Vec<i64> = (0..1000).rev().collect();
    let out = Sequence::from_vec(items.clone()).parallel().collect().unwrap();
    common::assert_same_elements(&out, &items);
}
