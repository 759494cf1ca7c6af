use std::cmp::Ordering;
use std::iter::once;

#[cfg(feature = "rayon")]
use rayon::join;

use crate::normalize::normalize;
use crate::{Domain, Error, ITree, Interval, Node, RangeInput};

impl<K, I> ITree<K, I>
where
    K: Domain,
    I: Interval<K>,
{
    /// Construct a new tree from the given half-open `items`
    ///
    /// Fails if any item does not satisfy `start < end`.
    pub fn new<T>(items: T) -> Result<Self, Error>
    where
        T: IntoIterator<Item = I>,
    {
        let items = items.into_iter().collect::<Vec<_>>();

        validate(&items)?;

        Ok(Self::new_unchecked(items))
    }

    /// Construct a new tree from the given half-open `items` without validating them
    ///
    /// Supplying empty or reversed intervals is safe but will lead to incorrect results.
    pub fn new_unchecked<T>(items: T) -> Self
    where
        T: IntoIterator<Item = I>,
    {
        let items = items.into_iter().collect::<Vec<_>>();
        let len = items.len();

        let tree = Self {
            root: build(items),
            len,
        };

        tree.log_built();

        tree
    }

    /// Construct a new tree from range-like inputs, creating each interval by calling `factory` with its start and exclusive end
    ///
    /// Closed ranges like `1..=4` reach the factory as `(1, 5)`.
    pub fn with_factory<R, T, F>(ranges: T, factory: F) -> Result<Self, Error>
    where
        R: RangeInput<K>,
        T: IntoIterator<Item = R>,
        F: FnMut(K, K) -> I,
    {
        Self::new(normalize(ranges, factory)?)
    }

    #[cfg(feature = "rayon")]
    /// Construct a new tree from the given half-open `items`, building subtrees in parallel
    ///
    /// Requires the `rayon` feature and dispatches tasks into the current [thread pool][rayon::ThreadPool].
    pub fn par_new<T>(items: T) -> Result<Self, Error>
    where
        T: IntoIterator<Item = I>,
        K: Send,
        I: Send,
    {
        let items = items.into_iter().collect::<Vec<_>>();

        validate(&items)?;

        let len = items.len();

        let tree = Self {
            root: par_build(items),
            len,
        };

        tree.log_built();

        Ok(tree)
    }

    fn log_built(&self) {
        if log::log_enabled!(log::Level::Debug) {
            log::debug!(
                "Built interval tree from {} intervals with height {}",
                self.len,
                self.height()
            );
        }
    }
}

impl<K> ITree<K>
where
    K: Domain,
{
    /// Construct a new tree of plain [`Range`][std::ops::Range]s from range-like inputs
    pub fn from_ranges<R, T>(ranges: T) -> Result<Self, Error>
    where
        R: RangeInput<K>,
        T: IntoIterator<Item = R>,
    {
        Self::with_factory(ranges, |start, end| start..end)
    }

    /// Construct a new tree holding a single range
    pub fn from_range<R>(range: R) -> Result<Self, Error>
    where
        R: RangeInput<K>,
    {
        Self::from_ranges(once(range))
    }
}

/// The value around which `intervals` would be partitioned, i.e. the midpoint between the smallest start and the largest end
///
/// Returns `None` for an empty slice.
pub fn center_of<K, I>(intervals: &[I]) -> Option<K>
where
    K: Domain,
    I: Interval<K>,
{
    let (first, rest) = intervals.split_first()?;

    let mut lo = first.start();
    let mut hi = first.end();

    for interval in rest {
        if interval.start() < lo {
            lo = interval.start();
        }

        if interval.end() > hi {
            hi = interval.end();
        }
    }

    // only reachable with reversed intervals
    if hi < lo {
        hi = lo;
    }

    Some(K::midpoint(lo, hi))
}

fn validate<K, I>(items: &[I]) -> Result<(), Error>
where
    K: PartialOrd,
    I: Interval<K>,
{
    let malformed = items
        .iter()
        .position(|item| item.start().partial_cmp(item.end()) != Some(Ordering::Less));

    match malformed {
        Some(index) => Err(Error::EmptyInterval { index }),
        None => Ok(()),
    }
}

type Buckets<I> = (Vec<I>, Vec<I>, Vec<I>);

fn partition<K, I>(intervals: Vec<I>, center: &K) -> Buckets<I>
where
    K: PartialOrd,
    I: Interval<K>,
{
    let len = intervals.len();

    let mut left = Vec::new();
    let mut overlapping = Vec::new();
    let mut right = Vec::new();

    for interval in intervals {
        if interval.end() < center {
            left.push(interval);
        } else if interval.start() > center {
            right.push(interval);
        } else {
            overlapping.push(interval);
        }
    }

    // Well-formed input always leaves the interval with the smallest start out of `right`
    // and the one with the largest end out of `left`, so this only guards unchecked trees.
    if left.len() == len {
        overlapping = left;
        left = Vec::new();
    } else if right.len() == len {
        overlapping = right;
        right = Vec::new();
    }

    log::trace!(
        "Partitioned {} intervals into {} left, {} overlapping and {} right",
        len,
        left.len(),
        overlapping.len(),
        right.len()
    );

    (left, overlapping, right)
}

fn build<K, I>(intervals: Vec<I>) -> Option<Box<Node<K, I>>>
where
    K: Domain,
    I: Interval<K>,
{
    let center = center_of(&intervals)?;

    let (left, overlapping, right) = partition(intervals, &center);

    Some(Box::new(Node {
        center,
        overlapping,
        left: build(left),
        right: build(right),
    }))
}

#[cfg(feature = "rayon")]
fn par_build<K, I>(intervals: Vec<I>) -> Option<Box<Node<K, I>>>
where
    K: Domain + Send,
    I: Interval<K> + Send,
{
    let center = center_of(&intervals)?;

    let (left, overlapping, right) = partition(intervals, &center);

    let (left, right) = join(|| par_build(left), || par_build(right));

    Some(Box::new(Node {
        center,
        overlapping,
        left,
        right,
    }))
}
