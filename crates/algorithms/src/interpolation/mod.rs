//! Spatiotemporal neighbor search and interpolation
//!
//! - KD-tree: k-nearest-neighbor queries in (x, y, scaled time)
//! - Brute force: exhaustive oracle with identical ordering
//! - Filter: prefix-truncating exclusion of far neighbors
//! - IDW: Inverse Distance Weighting estimate from a neighbor set
//! - Batch: daily estimates at unmeasured locations over all measurements

pub mod batch;
mod brute_force;
pub mod filter;
mod idw;
pub mod kdtree;

use std::cmp::Ordering;

use stkfold_core::{Error, Result, ScaledPoint};

pub use batch::{BatchInterpolator, Estimate, QueryLocation, DAYS_PER_YEAR};
pub use brute_force::BruteForceIndex;
pub use filter::ExclusionFilter;
pub use idw::idw_estimate;
pub use kdtree::KdTree;

/// One query result: a training point and its distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub point: ScaledPoint,
    /// 3-D Euclidean distance to the query point
    pub distance: f64,
    /// Position of `point` in the slice the index was built from
    pub index: usize,
}

/// A read-only index answering k-nearest-neighbor queries.
///
/// Implementations must return identical sequences for identical input:
/// ascending by distance, equal distances in input order.
pub trait NeighborIndex: Sized {
    /// Build over a non-empty set of time-scaled points.
    fn build(points: &[ScaledPoint]) -> Result<Self>;

    /// Up to `k` nearest points to `target`; `k` must be positive.
    fn k_nearest(&self, target: &ScaledPoint, k: usize) -> Result<Vec<Neighbor>>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Total order on (distance², input index) candidates.
#[inline]
pub(crate) fn neighbor_order(a: (f64, usize), b: (f64, usize)) -> Ordering {
    a.0.total_cmp(&b.0).then(a.1.cmp(&b.1))
}

pub(crate) fn check_k(k: usize) -> Result<()> {
    if k == 0 {
        return Err(Error::invalid("k", k, "neighbor count must be positive"));
    }
    Ok(())
}

pub(crate) fn check_coordinates(points: &[ScaledPoint]) -> Result<()> {
    match points
        .iter()
        .find(|p| !(p.x.is_finite() && p.y.is_finite() && p.t.is_finite()))
    {
        Some(p) => Err(Error::invalid(
            "point",
            p.ordinal,
            "coordinates must be finite",
        )),
        None => Ok(()),
    }
}
