#![forbid(unsafe_code)]
#![deny(missing_docs, missing_debug_implementations)]

//! A simple library implementing an immutable [centered interval tree](https://en.wikipedia.org/wiki/Interval_tree#Centered_interval_tree)
//!
//! The tree is built once from a collection of half-open intervals and then answers point-containment ("which intervals contain `v`?")
//! and range-overlap queries. Closed ranges like `1..=4` are normalized into their half-open counterpart `1..5` on construction.
//!
//! ```
//! use centered_itree::{ITree, SearchOptions};
//!
//! let tree = ITree::from_ranges([0..8, 1..5, 2..6]).unwrap();
//!
//! let found = tree.search(&3, SearchOptions::default()).unwrap();
//! assert_eq!(found, [&(0..8), &(1..5), &(2..6)]);
//!
//! let found = tree.search_range(5..7, SearchOptions::default()).unwrap();
//! assert_eq!(found, [&(0..8), &(2..6)]);
//! ```

mod build;
mod domain;
mod error;
mod normalize;
mod query;

use std::ops::Range;

pub use crate::build::center_of;
pub use crate::domain::{Discrete, Domain};
pub use crate::error::Error;
pub use crate::normalize::{RangeInput, Span};
pub use crate::query::SearchOptions;

/// Half-open interval `[start, end)` with boundaries of type `K`
///
/// Any payload carried by the implementing type is ignored by the tree: equality and ordering only ever look at `(start, end)`.
pub trait Interval<K> {
    /// The inclusive lower bound
    fn start(&self) -> &K;

    /// The exclusive upper bound
    fn end(&self) -> &K;

    /// Whether `point` lies within `[start, end)`
    fn contains_point(&self, point: &K) -> bool
    where
        K: PartialOrd,
    {
        self.start() <= point && point < self.end()
    }

    /// Whether `[start, end)` shares at least one point with `range`
    fn overlaps(&self, range: &Range<K>) -> bool
    where
        K: PartialOrd,
    {
        range.start < range.end && self.start() < &range.end && &range.start < self.end()
    }
}

impl<K> Interval<K> for Range<K> {
    fn start(&self) -> &K {
        &self.start
    }

    fn end(&self) -> &K {
        &self.end
    }
}

impl<K, V> Interval<K> for (Range<K>, V) {
    fn start(&self) -> &K {
        &self.0.start
    }

    fn end(&self) -> &K {
        &self.0.end
    }
}

/// A node of the tree consisting of a center value, the intervals overlapping it and the subtrees to either side
#[derive(Debug, Clone)]
pub struct Node<K, I> {
    center: K,
    overlapping: Vec<I>,
    left: Option<Box<Node<K, I>>>,
    right: Option<Box<Node<K, I>>>,
}

impl<K, I> Node<K, I> {
    /// The value around which this node partitions its intervals
    pub fn center(&self) -> &K {
        &self.center
    }

    /// Intervals neither entirely below nor entirely above the center, in insertion order
    pub fn overlapping(&self) -> &[I] {
        &self.overlapping
    }

    /// Subtree of intervals ending before the center
    pub fn left(&self) -> Option<&Node<K, I>> {
        self.left.as_deref()
    }

    /// Subtree of intervals starting after the center
    pub fn right(&self) -> Option<&Node<K, I>> {
        self.right.as_deref()
    }

    fn height(&self) -> usize {
        let left = self.left.as_ref().map_or(0, |left| left.height());
        let right = self.right.as_ref().map_or(0, |right| right.height());

        1 + left.max(right)
    }
}

/// Interval tree indexing half-open intervals of type `I` with boundaries of type `K`
///
/// `I` defaults to a plain [`Range`]; use `(Range<K>, V)` or a custom [`Interval`] implementation to attach values.
#[derive(Debug, Clone)]
pub struct ITree<K, I = Range<K>> {
    root: Option<Box<Node<K, I>>>,
    len: usize,
}

impl<K, I> Default for ITree<K, I> {
    fn default() -> Self {
        Self { root: None, len: 0 }
    }
}

impl<K, I> ITree<K, I> {
    /// The root node, absent if the tree was built from zero intervals
    pub fn root(&self) -> Option<&Node<K, I>> {
        self.root.as_deref()
    }

    /// Number of stored intervals, duplicates included
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree was built from zero intervals
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of nodes on the longest path from the root to a leaf
    pub fn height(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.height())
    }

    /// Iterate over all intervals in pre-order, i.e. a node's overlapping set before its left and right subtrees
    pub fn iter(&self) -> impl Iterator<Item = &I> {
        let mut stack = Vec::from_iter(self.root.as_deref());

        std::iter::from_fn(move || {
            let node = stack.pop()?;

            stack.extend(node.right.as_deref());
            stack.extend(node.left.as_deref());

            Some(node.overlapping.iter())
        })
        .flatten()
    }
}
