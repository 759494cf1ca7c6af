use thiserror::Error;

/// Reasons why a tree could not be built from the given intervals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// The interval at `index` does not satisfy `start < end`
    #[error("Interval at position {index} is empty or reversed")]
    EmptyInterval {
        /// Position of the offending interval in the input
        index: usize,
    },
    /// The closed range at `index` ends at the largest value of its domain and has no half-open equivalent
    #[error("Closed range at position {index} cannot be made half-open without overflow")]
    Unrepresentable {
        /// Position of the offending range in the input
        index: usize,
    },
}
