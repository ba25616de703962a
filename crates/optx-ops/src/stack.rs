//! Stack growth for the recursive tree walkers.
//!
//! [`RECURSION_LIMIT`](crate::RECURSION_LIMIT) bounds how deep a tree can be,
//! but not how much stack one level of a walk costs: that depends on the
//! walker and on the build profile. Every recursive step over an [`Expr`]
//! therefore runs through [`maybe_grow`], which switches to a fresh segment
//! when the remaining stack drops below the red zone.
//!
//! [`Expr`]: crate::Expr

/// Remaining stack below which a new segment is allocated.
pub const STACK_RED_ZONE: usize = 64 << 10;

/// Size of each newly allocated segment.
pub const STACK_SIZE: usize = 2 << 20;

/// Run `f`, first growing the stack if less than [`STACK_RED_ZONE`] remains.
#[inline(always)]
pub fn maybe_grow<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    stacker::maybe_grow(STACK_RED_ZONE, STACK_SIZE, f)
}
