use num_traits::PrimInt;

/// Boundary types the tree can partition
///
/// Implemented for the primitive integers, using floor division, and for floating point numbers, using the natural midpoint.
pub trait Domain: PartialOrd + Clone {
    /// The value halfway between `lo` and `hi`, i.e. `lo + (hi - lo) / 2`
    fn midpoint(lo: &Self, hi: &Self) -> Self;
}

// floor((lo + hi) / 2) without the intermediate sum or difference overflowing
fn int_midpoint<K>(lo: K, hi: K) -> K
where
    K: PrimInt,
{
    (lo & hi) + ((lo ^ hi) >> 1)
}

macro_rules! impl_int_domain {
    ($($ty:ty),*) => {
        $(
            impl Domain for $ty {
                fn midpoint(lo: &Self, hi: &Self) -> Self {
                    int_midpoint(*lo, *hi)
                }
            }
        )*
    };
}

impl_int_domain!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! impl_float_domain {
    ($($ty:ty),*) => {
        $(
            impl Domain for $ty {
                fn midpoint(lo: &Self, hi: &Self) -> Self {
                    lo + (hi - lo) / 2.0
                }
            }
        )*
    };
}

impl_float_domain!(f32, f64);

/// Boundary types with a unit step, required to turn closed ranges into half-open ones
pub trait Discrete: Domain {
    /// The next value of the domain, `None` on overflow
    fn successor(&self) -> Option<Self>;
}

impl<K> Discrete for K
where
    K: PrimInt + Domain,
{
    fn successor(&self) -> Option<Self> {
        self.checked_add(&K::one())
    }
}
