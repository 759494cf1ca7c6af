use std::ops::{Range, RangeInclusive};

use crate::{Discrete, Error};

/// Range-like inputs accepted by [`ITree::from_ranges`][crate::ITree::from_ranges] and [`ITree::with_factory`][crate::ITree::with_factory]
pub trait RangeInput<K> {
    /// The equivalent half-open bounds `(start, exclusive_end)`, `None` if they are not representable in `K`
    fn into_bounds(self) -> Option<(K, K)>;
}

impl<K> RangeInput<K> for Range<K> {
    fn into_bounds(self) -> Option<(K, K)> {
        Some((self.start, self.end))
    }
}

impl<K> RangeInput<K> for RangeInclusive<K>
where
    K: Discrete,
{
    fn into_bounds(self) -> Option<(K, K)> {
        let (start, end) = self.into_inner();
        let end = end.successor()?;

        Some((start, end))
    }
}

/// Either kind of range, for mixing half-open and closed inputs in one collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span<K> {
    /// `start..end`, passed through as is
    HalfOpen(Range<K>),
    /// `start..=end`, turned into `start..end + 1`
    Closed(RangeInclusive<K>),
}

impl<K> From<Range<K>> for Span<K> {
    fn from(range: Range<K>) -> Self {
        Self::HalfOpen(range)
    }
}

impl<K> From<RangeInclusive<K>> for Span<K> {
    fn from(range: RangeInclusive<K>) -> Self {
        Self::Closed(range)
    }
}

impl<K> RangeInput<K> for Span<K>
where
    K: Discrete,
{
    fn into_bounds(self) -> Option<(K, K)> {
        match self {
            Self::HalfOpen(range) => range.into_bounds(),
            Self::Closed(range) => range.into_bounds(),
        }
    }
}

pub(crate) fn normalize<K, I, R, F>(
    ranges: impl IntoIterator<Item = R>,
    mut factory: F,
) -> Result<Vec<I>, Error>
where
    R: RangeInput<K>,
    F: FnMut(K, K) -> I,
{
    ranges
        .into_iter()
        .enumerate()
        .map(|(index, range)| {
            let (start, end) = range
                .into_bounds()
                .ok_or(Error::Unrepresentable { index })?;

            Ok(factory(start, end))
        })
        .collect()
}
