//! Downstream collectors for grouping terminals.
//!
//! A collector builds a per-group accumulator, folds elements into it, merges
//! two accumulators built by different workers, and finally turns the
//! accumulator into the group's result.

use std::marker::PhantomData;
use std::ops::Add;

/// Mutable reduction applied to each group of a grouping terminal.
pub trait Collector<T>: Send + Sync {
    type Acc: Send;
    type Output;

    fn init(&self) -> Self::Acc;

    fn accumulate(&self, acc: &mut Self::Acc, item: T);

    /// Combine two accumulators. `left` holds earlier elements than `right`.
    fn merge(&self, left: Self::Acc, right: Self::Acc) -> Self::Acc;

    fn finish(&self, acc: Self::Acc) -> Self::Output;
}

/// Counts the elements in each group.
#[derive(Debug, Clone, Copy, Default)]
pub struct Counting;

impl<T> Collector<T> for Counting {
    type Acc = usize;
    type Output = usize;

    fn init(&self) -> usize {
        0
    }

    fn accumulate(&self, acc: &mut usize, _item: T) {
        *acc += 1;
    }

    fn merge(&self, left: usize, right: usize) -> usize {
        left + right
    }

    fn finish(&self, acc: usize) -> usize {
        acc
    }
}

/// Collects each group's elements in encounter order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToVec;

impl<T: Send> Collector<T> for ToVec {
    type Acc = Vec<T>;
    type Output = Vec<T>;

    fn init(&self) -> Vec<T> {
        Vec::new()
    }

    fn accumulate(&self, acc: &mut Vec<T>, item: T) {
        acc.push(item);
    }

    fn merge(&self, mut left: Vec<T>, mut right: Vec<T>) -> Vec<T> {
        left.append(&mut right);
        left
    }

    fn finish(&self, acc: Vec<T>) -> Vec<T> {
        acc
    }
}

/// Sums each group's elements, starting from `T::default()`.
pub struct Summing<T> {
    _marker: PhantomData<fn(T) -> T>,
}

impl<T> Default for Summing<T> {
    fn default() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Collector<T> for Summing<T>
where
    T: Add<Output = T> + Default + Send,
{
    type Acc = T;
    type Output = T;

    fn init(&self) -> T {
        T::default()
    }

    fn accumulate(&self, acc: &mut T, item: T) {
        let current = std::mem::take(acc);
        *acc = current + item;
    }

    fn merge(&self, left: T, right: T) -> T {
        left + right
    }

    fn finish(&self, acc: T) -> T {
        acc
    }
}

/// Maps each element before handing it to a downstream collector.
pub struct Mapping<F, C> {
    mapper: F,
    downstream: C,
}

impl<T, U, F, C> Collector<T> for Mapping<F, C>
where
    F: Fn(T) -> U + Send + Sync,
    C: Collector<U>,
{
    type Acc = C::Acc;
    type Output = C::Output;

    fn init(&self) -> C::Acc {
        self.downstream.init()
    }

    fn accumulate(&self, acc: &mut C::Acc, item: T) {
        self.downstream.accumulate(acc, (self.mapper)(item));
    }

    fn merge(&self, left: C::Acc, right: C::Acc) -> C::Acc {
        self.downstream.merge(left, right)
    }

    fn finish(&self, acc: C::Acc) -> C::Output {
        self.downstream.finish(acc)
    }
}

pub fn counting() -> Counting {
    Counting
}

pub fn to_vec() -> ToVec {
    ToVec
}

pub fn summing<T>() -> Summing<T> {
    Summing::default()
}

pub fn mapping<F, C>(mapper: F, downstream: C) -> Mapping<F, C> {
    Mapping { mapper, downstream }
}
