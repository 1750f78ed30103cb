//! Inverse Distance Weighting (IDW) estimate
//!
//! Estimates the value at a query location as a weighted average of its
//! neighbors, where weights are inversely proportional to distance
//! raised to a power parameter.
//!
//! Reference:
//! Shepard, D. (1968). A two-dimensional interpolation function for
//! irregularly-spaced data. ACM National Conference.

use stkfold_core::{Error, Result, ScaledPoint};

use super::Neighbor;

/// IDW estimate of the value at `target`.
///
/// # Algorithm
///
/// ```text
/// z = Σ(wi * zi) / Σ(wi)
/// where wi = (1 / d(target, pi))^p
/// ```
///
/// A single neighbor's value is returned unchanged. A neighbor at
/// distance zero dominates every other weight; the first
/// such neighbor's value is returned as-is.
///
/// # Errors
/// [`Error::InsufficientNeighbors`] for an empty neighbor set.
pub fn idw_estimate(target: &ScaledPoint, neighbors: &[Neighbor], power: f64) -> Result<f64> {
    if neighbors.is_empty() {
        return Err(Error::InsufficientNeighbors);
    }

    if let [only] = neighbors {
        return Ok(only.point.value);
    }

    let distances: Vec<f64> = neighbors.iter().map(|n| target.distance(&n.point)).collect();

    if let Some(i) = distances.iter().position(|&d| d == 0.0) {
        return Ok(neighbors[i].point.value);
    }

    let mut sum_w = 0.0;
    let mut sum_wz = 0.0;
    for (n, &d) in neighbors.iter().zip(&distances) {
        let w = (1.0 / d).powf(power);
        sum_w += w;
        sum_wz += w * n.point.value;
    }

    if sum_w > 0.0 && sum_w.is_finite() && sum_wz.is_finite() {
        return Ok(sum_wz / sum_w);
    }

    // Weights overflowed or all underflowed to zero: rescale by the
    // smallest distance so every weight lies in (0, 1] and the nearest is 1.
    let d_min = distances.iter().copied().fold(f64::INFINITY, f64::min);
    let mut sum_w = 0.0;
    let mut sum_wz = 0.0;
    for (n, &d) in neighbors.iter().zip(&distances) {
        let w = (d_min / d).powf(power);
        sum_w += w;
        sum_wz += w * n.point.value;
    }
    Ok(sum_wz / sum_w)
}
