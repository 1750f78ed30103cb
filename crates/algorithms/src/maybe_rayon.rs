//! Order-preserving map that runs on rayon when the `parallel` feature is
//! on and as a plain loop otherwise.
//!
//! Used for the per-fold map in [`cross_validate_with`], the per-time-scale
//! map in [`build_radius_table`] and the per-location map in
//! [`BatchInterpolator::interpolate`]. Output is always in input order, so
//! callers reduce over it deterministically.
//!
//! [`cross_validate_with`]: crate::validation::cross_validate_with
//! [`build_radius_table`]: crate::radius::build_radius_table
//! [`BatchInterpolator::interpolate`]: crate::interpolation::BatchInterpolator::interpolate

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[cfg(feature = "parallel")]
pub(crate) fn map_ordered<I, T, F>(items: I, f: F) -> Vec<T>
where
    I: IntoParallelIterator,
    T: Send,
    F: Fn(I::Item) -> T + Sync + Send,
{
    items.into_par_iter().map(f).collect()
}

#[cfg(not(feature = "parallel"))]
pub(crate) fn map_ordered<I, T, F>(items: I, f: F) -> Vec<T>
where
    I: IntoIterator,
    F: Fn(I::Item) -> T,
{
    items.into_iter().map(f).collect()
}
