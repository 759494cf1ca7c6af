use std::cmp::Ordering;
use std::convert::Infallible;
use std::ops::{ControlFlow, Range};

#[cfg(feature = "rayon")]
use rayon::join;

use crate::{ITree, Interval, Node};

/// Options controlling how [`ITree::search`] and [`ITree::search_range`] assemble their results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchOptions {
    /// Collapse results sharing the same `(start, end)`, keeping the first one found
    pub unique: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self { unique: true }
    }
}

impl<K, I> ITree<K, I>
where
    K: PartialOrd,
    I: Interval<K>,
{
    /// Find all intervals containing `point`, sorted by `(start, end)`
    ///
    /// Returns `None` if the tree is empty, as opposed to `Some` empty vector if it has no matches.
    pub fn search(&self, point: &K, options: SearchOptions) -> Option<Vec<&I>> {
        self.root.as_ref()?;

        let mut result = Vec::new();

        let _: ControlFlow<Infallible> = self.query_point(point, |interval| {
            result.push(interval);
            ControlFlow::Continue(())
        });

        Some(finish(result, options))
    }

    /// Find all intervals overlapping `range`, sorted by `(start, end)`
    ///
    /// For integral boundaries, this yields the same intervals as calling [`search`][Self::search] for every point in `range`.
    /// Returns `None` if the tree is empty, as opposed to `Some` empty vector if it has no matches.
    pub fn search_range(&self, range: Range<K>, options: SearchOptions) -> Option<Vec<&I>> {
        self.root.as_ref()?;

        let mut result = Vec::new();

        let _: ControlFlow<Infallible> = self.query(range, |interval| {
            result.push(interval);
            ControlFlow::Continue(())
        });

        Some(finish(result, options))
    }

    /// Visit all intervals containing `point`, in tree order and including duplicates
    pub fn query_point<'a, H, R>(&'a self, point: &K, mut handler: H) -> ControlFlow<R>
    where
        H: FnMut(&'a I) -> ControlFlow<R>,
    {
        let Some(mut node) = self.root.as_deref() else {
            return ControlFlow::Continue(());
        };

        loop {
            for interval in &node.overlapping {
                if interval.contains_point(point) {
                    handler(interval)?;
                }
            }

            let next = if point < &node.center {
                node.left.as_deref()
            } else {
                node.right.as_deref()
            };

            match next {
                Some(next) => node = next,
                None => return ControlFlow::Continue(()),
            }
        }
    }

    /// Visit all intervals overlapping `range`, in tree order and including duplicates
    pub fn query<'a, H, R>(&'a self, range: Range<K>, mut handler: H) -> ControlFlow<R>
    where
        H: FnMut(&'a I) -> ControlFlow<R>,
    {
        if range.start.partial_cmp(&range.end) != Some(Ordering::Less) {
            return ControlFlow::Continue(());
        }

        let mut stack = Vec::from_iter(self.root.as_deref());

        while let Some(node) = stack.pop() {
            for interval in &node.overlapping {
                if interval.overlaps(&range) {
                    handler(interval)?;
                }
            }

            let (left, right) = children(node, &range);

            stack.extend(right);
            stack.extend(left);
        }

        ControlFlow::Continue(())
    }

    #[cfg(feature = "rayon")]
    /// Visit all intervals overlapping `range`, in parallel
    pub fn par_query<'a, H, R>(&'a self, range: Range<K>, handler: H) -> ControlFlow<R>
    where
        K: Sync,
        I: Sync,
        H: Fn(&'a I) -> ControlFlow<R> + Sync,
        R: Send,
    {
        if range.start.partial_cmp(&range.end) != Some(Ordering::Less) {
            return ControlFlow::Continue(());
        }

        if let Some(root) = self.root.as_deref() {
            par_query(&range, &handler, root)?;
        }

        ControlFlow::Continue(())
    }
}

/// The subtrees of `node` which may hold intervals overlapping `range`
fn children<'a, K, I>(
    node: &'a Node<K, I>,
    range: &Range<K>,
) -> (Option<&'a Node<K, I>>, Option<&'a Node<K, I>>)
where
    K: PartialOrd,
{
    let left = node.left.as_deref().filter(|_| range.start < node.center);
    let right = node.right.as_deref().filter(|_| range.end > node.center);

    (left, right)
}

#[cfg(feature = "rayon")]
fn par_query<'a, K, I, H, R>(range: &Range<K>, handler: &H, mut node: &'a Node<K, I>) -> ControlFlow<R>
where
    K: PartialOrd + Sync,
    I: Interval<K> + Sync,
    H: Fn(&'a I) -> ControlFlow<R> + Sync,
    R: Send,
{
    loop {
        for interval in &node.overlapping {
            if interval.overlaps(range) {
                handler(interval)?;
            }
        }

        match children(node, range) {
            (Some(left), Some(right)) => {
                let (left, right) = join(
                    || par_query(range, handler, left),
                    || par_query(range, handler, right),
                );

                left?;
                right?;

                return ControlFlow::Continue(());
            }
            (Some(next), None) | (None, Some(next)) => node = next,
            (None, None) => return ControlFlow::Continue(()),
        }
    }
}

fn cmp_bounds<K, I>(lhs: &I, rhs: &I) -> Ordering
where
    K: PartialOrd,
    I: Interval<K>,
{
    let start = lhs.start().partial_cmp(rhs.start()).unwrap_or(Ordering::Equal);
    let end = || lhs.end().partial_cmp(rhs.end()).unwrap_or(Ordering::Equal);

    start.then_with(end)
}

fn finish<K, I>(mut result: Vec<&I>, options: SearchOptions) -> Vec<&I>
where
    K: PartialOrd,
    I: Interval<K>,
{
    // stable, so duplicates stay in the order they were found
    result.sort_by(|lhs, rhs| cmp_bounds(*lhs, *rhs));

    if options.unique {
        result.dedup_by(|next, prev| cmp_bounds(*next, *prev) == Ordering::Equal);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "rayon")]
    use std::sync::Mutex;

    use proptest::{collection::vec, test_runner::TestRunner};

    const UNIQUE: SearchOptions = SearchOptions { unique: true };
    const ALL: SearchOptions = SearchOptions { unique: false };

    #[test]
    fn empty_tree_has_no_results() {
        let tree = ITree::<i32>::from_ranges(Vec::<Range<i32>>::new()).unwrap();

        assert_eq!(tree.search(&5, UNIQUE), None);
        assert_eq!(tree.search_range(1..2, UNIQUE), None);
        assert_eq!(tree.search_range(1..3, ALL), None);
        assert!(tree.query_point(&5, |_| ControlFlow::Break(())).is_continue());
    }

    #[test]
    fn point_at_bounds() {
        let tree = ITree::from_ranges([1..5]).unwrap();

        assert_eq!(tree.search(&3, UNIQUE).unwrap(), [&(1..5)]);
        assert_eq!(tree.search(&5, UNIQUE).unwrap(), Vec::<&Range<i32>>::new());
        assert_eq!(tree.search(&1, UNIQUE).unwrap(), [&(1..5)]);
        assert_eq!(tree.search(&0, UNIQUE).unwrap(), Vec::<&Range<i32>>::new());
    }

    #[test]
    fn closed_range_includes_its_end() {
        let tree = ITree::from_range(1..=4).unwrap();

        assert_eq!(tree.search(&4, UNIQUE).unwrap(), [&(1..5)]);
        assert_eq!(tree.search(&5, UNIQUE).unwrap(), Vec::<&Range<i32>>::new());
        assert_eq!(tree.search(&1, UNIQUE).unwrap(), [&(1..5)]);
    }

    #[test]
    fn results_are_sorted() {
        let tree = ITree::from_ranges([2..6, 1..5]).unwrap();
        assert_eq!(tree.search(&3, UNIQUE).unwrap(), [&(1..5), &(2..6)]);

        let tree = ITree::from_ranges([0..8, 2..6, 1..5, 0..4]).unwrap();
        assert_eq!(
            tree.search(&3, UNIQUE).unwrap(),
            [&(0..4), &(0..8), &(1..5), &(2..6)]
        );
    }

    #[test]
    fn range_overlap() {
        let tree = ITree::from_ranges([0..8, 1..5, 2..6]).unwrap();
        assert_eq!(
            tree.search_range(1..4, UNIQUE).unwrap(),
            [&(0..8), &(1..5), &(2..6)]
        );

        let tree = ITree::from_ranges([1..3, 3..5]).unwrap();
        assert_eq!(tree.search_range(3..9, UNIQUE).unwrap(), [&(3..5)]);
        assert_eq!(tree.search_range(0..1, UNIQUE).unwrap(), Vec::<&Range<i32>>::new());
        assert_eq!(tree.search_range(2..2, UNIQUE).unwrap(), Vec::<&Range<i32>>::new());
        assert_eq!(tree.search_range(4..2, UNIQUE).unwrap(), Vec::<&Range<i32>>::new());
    }

    #[test]
    fn duplicates() {
        let tree = ITree::from_ranges([1..3, 1..3, 2..4, 1..3]).unwrap();

        assert_eq!(tree.search(&1, ALL).unwrap(), [&(1..3), &(1..3), &(1..3)]);
        assert_eq!(tree.search(&1, UNIQUE).unwrap(), [&(1..3)]);
        assert_eq!(
            tree.search_range(0..3, ALL).unwrap(),
            [&(1..3), &(1..3), &(1..3), &(2..4)]
        );
        assert_eq!(tree.search_range(0..3, UNIQUE).unwrap(), [&(1..3), &(2..4)]);
    }

    #[test]
    fn first_duplicate_keeps_its_payload() {
        let tree = ITree::new([(1..3, "first"), (0..9, "wide"), (1..3, "second")]).unwrap();

        assert_eq!(
            tree.search(&2, SearchOptions::default()).unwrap(),
            [&(0..9, "wide"), &(1..3, "first")]
        );
        assert_eq!(
            tree.search(&2, ALL).unwrap(),
            [&(0..9, "wide"), &(1..3, "first"), &(1..3, "second")]
        );
    }

    #[test]
    fn factory_payload_survives_search() {
        let tree = ITree::with_factory([1..=5], |start, end| (start..end, 15)).unwrap();

        let found = tree.search(&2, UNIQUE).unwrap();
        assert_eq!(found, [&(1..6, 15)]);
        assert_eq!(found[0].1, 15);
    }

    #[test]
    fn continuous_domain() {
        let tree = ITree::from_ranges([0.0..0.5, 0.25..1.0, 2.0..2.5]).unwrap();

        assert_eq!(tree.search(&0.3, UNIQUE).unwrap(), [&(0.0..0.5), &(0.25..1.0)]);
        assert_eq!(tree.search(&1.0, UNIQUE).unwrap(), Vec::<&Range<f64>>::new());
        assert_eq!(
            tree.search_range(0.9..2.1, UNIQUE).unwrap(),
            [&(0.25..1.0), &(2.0..2.5)]
        );
        assert_eq!(tree.search_range(1.0..2.0, UNIQUE).unwrap(), Vec::<&Range<f64>>::new());
    }

    #[test]
    fn query_stops_on_break() {
        let tree = ITree::from_ranges((0..100).map(|start| start..start + 10)).unwrap();

        let mut visited = 0;
        let flow = tree.query(0..100, |range| {
            visited += 1;
            if range.start == 42 {
                ControlFlow::Break(range.end)
            } else {
                ControlFlow::Continue(())
            }
        });

        assert_eq!(flow, ControlFlow::Break(52));
        assert!(visited <= 100);
    }

    #[test]
    fn many_unit_intervals() {
        let tree = ITree::from_ranges((0..10_000).map(|start| start..start + 1)).unwrap();

        assert_eq!(tree.search(&9_999, UNIQUE).unwrap(), [&(9_999..10_000)]);
        assert_eq!(tree.search_range(0..10_000, UNIQUE).unwrap().len(), 10_000);
    }

    #[test]
    fn search_random() {
        const DOM: Range<i32> = -1000..1000;
        const LEN: usize = 1000_usize;

        TestRunner::default()
            .run(
                &(vec(DOM, LEN), vec(1..200, LEN), DOM),
                |(start, len, point)| {
                    let tree = ITree::from_ranges(
                        start.iter().zip(&len).map(|(&start, &len)| start..start + len),
                    )
                    .unwrap();

                    let result1 = tree.search(&point, ALL).unwrap();

                    let mut result2 = tree
                        .iter()
                        .filter(|range| range.start <= point && point < range.end)
                        .collect::<Vec<_>>();
                    result2.sort_by_key(|range| (range.start, range.end));
                    assert_eq!(result1, result2);

                    let result1 = tree.search(&point, UNIQUE).unwrap();
                    result2.dedup();
                    assert_eq!(result1, result2);

                    Ok(())
                },
            )
            .unwrap()
    }

    #[test]
    fn search_range_random() {
        const DOM: Range<i32> = -100..100;
        const LEN: usize = 100_usize;

        TestRunner::default()
            .run(
                &(vec(DOM, LEN), vec(1..20, LEN), DOM, 1..40),
                |(start, len, query_start, query_len)| {
                    let tree = ITree::from_ranges(
                        start.iter().zip(&len).map(|(&start, &len)| start..start + len),
                    )
                    .unwrap();

                    let query_end = query_start + query_len;

                    for options in [UNIQUE, ALL] {
                        let result1 = tree.search_range(query_start..query_end, options).unwrap();

                        let mut result2 = tree
                            .iter()
                            .filter(|range| query_end > range.start && query_start < range.end)
                            .collect::<Vec<_>>();
                        result2.sort_by_key(|range| (range.start, range.end));
                        if options.unique {
                            result2.dedup();
                        }
                        assert_eq!(result1, result2);
                    }

                    let mut result3 = (query_start..query_end)
                        .flat_map(|point| tree.search(&point, UNIQUE).unwrap())
                        .collect::<Vec<_>>();
                    result3.sort_by_key(|range| (range.start, range.end));
                    result3.dedup();
                    assert_eq!(tree.search_range(query_start..query_end, UNIQUE).unwrap(), result3);

                    Ok(())
                },
            )
            .unwrap()
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn par_query_random() {
        const DOM: Range<i32> = -1000..1000;
        const LEN: usize = 1000_usize;

        TestRunner::default()
            .run(
                &(vec(DOM, LEN), vec(1..200, LEN), DOM, DOM),
                |(start, len, query_start, query_end)| {
                    let tree = ITree::par_new(
                        start.iter().zip(&len).map(|(&start, &len)| start..start + len),
                    )
                    .unwrap();

                    let result1 = Mutex::new(Vec::new());
                    tree.par_query(query_start..query_end, |range| {
                        result1.lock().unwrap().push(range);
                        ControlFlow::<()>::Continue(())
                    })
                    .continue_value()
                    .unwrap();
                    let mut result1 = result1.into_inner().unwrap();

                    let mut result2 = Vec::new();
                    tree.query(query_start..query_end, |range| {
                        result2.push(range);
                        ControlFlow::<()>::Continue(())
                    })
                    .continue_value()
                    .unwrap();

                    result1.sort_unstable_by_key(|range| (range.start, range.end));
                    result2.sort_unstable_by_key(|range| (range.start, range.end));
                    assert_eq!(result1, result2);

                    Ok(())
                },
            )
            .unwrap()
    }
}
