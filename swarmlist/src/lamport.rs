use std::ops::{Add, Sub};

/// Unsigned clock widths the circular comparator is defined over.
pub trait LamportValue:
    Copy + PartialOrd + Add<Output = Self> + Sub<Output = Self>
{
    /// Largest representable clock value.
    const MAX: Self;

    /// Addition on the clock ring, wrapping at the width.
    fn wrapping_add(self, rhs: Self) -> Self;
}

macro_rules! impl_lamport_value {
    ($($ty:ty),*) => {
        $(
            impl LamportValue for $ty {
                const MAX: Self = <$ty>::MAX;

                fn wrapping_add(self, rhs: Self) -> Self {
                    <$ty>::wrapping_add(self, rhs)
                }
            }
        )*
    };
}

impl_lamport_value!(u8, u16, u32);

/// Returns whether `new` is a strictly newer clock value than `old` on a
/// circular clock (for u8, 0 == 255 + 1).
///
/// A clock is newer iff it lies at most `threshold` ticks ahead of `old`;
/// ties are not newer. Values further ahead than `threshold` are treated as
/// stale survivors of a wraparound rather than fresh updates, which bounds
/// the window in which a replayed value can masquerade as new.
///
/// The window is what makes the comparison lossy: a clock that advances more
/// than `threshold` ticks between two observations becomes unrecoverably
/// ambiguous to the observer. With the 8-bit clock and the default threshold
/// of 50 that happens after ~206 ticks of isolation.
///
/// lamport_newer_than(2u8, 1, 50) will return true
/// lamport_newer_than(1u8, 2, 50) will return false
/// lamport_newer_than(1u8, 1, 50) will return false
/// lamport_newer_than(3u8, 250, 50) will return true
pub fn lamport_newer_than<C: LamportValue>(new: C, old: C, threshold: C) -> bool {
    let wraps = C::MAX - old < threshold;
    if wraps {
        new > old || new <= old.wrapping_add(threshold)
    } else {
        // old + threshold cannot overflow: MAX - old >= threshold
        new > old && new <= old + threshold
    }
}
