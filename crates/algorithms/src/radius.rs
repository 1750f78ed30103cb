//! Radius-table construction
//!
//! For a fixed time-scale, every point's distance to its nearest other
//! point is computed in (x, y, scaled time) space; the table stores the
//! given percentile of those distances. Run once offline, then handed to
//! the cross-validation driver as read-only data.

use stkfold_core::{scale_points, Error, Point, RadiusTable, Result, ScaledPoint, TimeEpoch};
use tracing::debug;

use crate::interpolation::KdTree;
use crate::maybe_rayon::map_ordered;

/// Percentile stored per time-scale unless told otherwise
pub const DEFAULT_PERCENTILE: f64 = 0.8;

/// Distance from each point to its nearest other point, in input order.
///
/// Needs at least two points.
pub fn nearest_neighbor_distances(points: &[ScaledPoint]) -> Result<Vec<f64>> {
    if points.len() < 2 {
        return Err(Error::invalid(
            "points",
            points.len(),
            "need at least two points for nearest-neighbor distances",
        ));
    }
    let tree = KdTree::build(points)?;
    points
        .iter()
        .map(|p| {
            // The point itself (or an exact duplicate) comes first
            let nn = tree.k_nearest(p, 2)?;
            Ok(nn[1].distance)
        })
        .collect()
}

/// The `percentile` nearest-neighbor distance at one time-scale.
///
/// Picks `sorted[⌊percentile · n⌋]`, clamped to the last element.
pub fn percentile_radius(
    points: &[Point],
    time_scale: f64,
    epoch: TimeEpoch,
    percentile: f64,
) -> Result<f64> {
    check_percentile(percentile)?;
    let scaled = scale_points(points, time_scale, epoch)?;
    let mut distances = nearest_neighbor_distances(&scaled)?;
    distances.sort_by(|a, b| a.total_cmp(b));

    let n = distances.len();
    let idx = ((percentile * n as f64) as usize).min(n - 1);
    Ok(distances[idx])
}

/// Build a radius table over `time_scales`, evaluating scales in parallel.
pub fn build_radius_table(
    points: &[Point],
    time_scales: &[f64],
    epoch: TimeEpoch,
    percentile: f64,
) -> Result<RadiusTable> {
    check_percentile(percentile)?;

    let radii = map_ordered(time_scales, |&c| {
        percentile_radius(points, c, epoch, percentile).map(|r| (c, r))
    })
    .into_iter()
    .collect::<Result<Vec<(f64, f64)>>>()?;

    debug!(entries = radii.len(), percentile, "radius table built");
    Ok(radii.into_iter().collect())
}

fn check_percentile(percentile: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&percentile) {
        return Err(Error::invalid("percentile", percentile, "must be within [0, 1]"));
    }
    Ok(())
}
