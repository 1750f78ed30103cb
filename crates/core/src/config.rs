//! Cross-validation configuration
//!
//! One [`CvConfig`] describes exactly one cross-validation run:
//!
//! - (k) the number of folds
//! - (n) the number of nearest neighbors
//! - (p) the IDW power
//! - (r) an optional absolute exclusion radius
//! - (c) the time-scale that maps day offsets onto the third axis
//! - optional bagging multiplicity (m) and bag fraction (α)

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::point::TimeEpoch;

/// Default distance limit of the joint distance+time filter
pub const DEFAULT_DISTANCE_LIMIT: f64 = 1.4;
/// Default day limit of the joint distance+time filter
pub const DEFAULT_DAY_LIMIT: f64 = 7.0;

/// How queried neighbors are pruned before interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum FilterPolicy {
    /// Keep every queried neighbor
    #[default]
    None,
    /// Cut at the first neighbor too far away in the plane or in days
    DistanceTime { distance_limit: f64, day_limit: f64 },
    /// Cut at the first neighbor beyond a 3-D radius. The radius is
    /// [`CvConfig::radius`] when set, else the radius-table entry for the
    /// configuration's time-scale.
    Euclidean,
}

impl FilterPolicy {
    /// Joint filter with the default limits (1.4 distance units, 7 days).
    pub fn distance_time() -> Self {
        FilterPolicy::DistanceTime {
            distance_limit: DEFAULT_DISTANCE_LIMIT,
            day_limit: DEFAULT_DAY_LIMIT,
        }
    }
}

/// Bagging parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bagging {
    /// Number of bags (m)
    pub bags: usize,
    /// Bag size as a fraction of the training set (α)
    pub fraction: f64,
    /// Seed for resampling
    #[serde(default)]
    pub seed: u64,
}

impl Bagging {
    pub fn new(bags: usize, fraction: f64, seed: u64) -> Self {
        Self { bags, fraction, seed }
    }

    /// Bag size for a training set of `training_len` points: ⌊α·len⌋.
    pub fn bag_size(&self, training_len: usize) -> usize {
        (training_len as f64 * self.fraction).floor() as usize
    }
}

/// Configuration of a single cross-validation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvConfig {
    /// Fold count (k)
    pub folds: usize,
    /// Neighbor count (n)
    pub neighbors: usize,
    /// IDW power (p)
    pub power: f64,
    /// Absolute exclusion radius (r)
    #[serde(default)]
    pub radius: Option<f64>,
    /// Time-scale (c)
    pub time_scale: f64,
    #[serde(default)]
    pub bagging: Option<Bagging>,
    #[serde(default)]
    pub filter: FilterPolicy,
    #[serde(default)]
    pub epoch: TimeEpoch,
}

impl Default for CvConfig {
    fn default() -> Self {
        Self {
            folds: 10,
            neighbors: 3,
            power: 2.0,
            radius: None,
            time_scale: 0.1,
            bagging: None,
            filter: FilterPolicy::None,
            epoch: TimeEpoch::StartOfYear,
        }
    }
}

impl CvConfig {
    pub fn new(folds: usize, neighbors: usize, power: f64, time_scale: f64) -> Self {
        Self {
            folds,
            neighbors,
            power,
            time_scale,
            ..Default::default()
        }
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn with_bagging(mut self, bagging: Bagging) -> Self {
        self.bagging = Some(bagging);
        self
    }

    pub fn with_filter(mut self, filter: FilterPolicy) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_epoch(mut self, epoch: TimeEpoch) -> Self {
        self.epoch = epoch;
        self
    }

    /// Check the invariants that do not depend on the point collection.
    pub fn validate(&self) -> Result<()> {
        if self.folds < 2 {
            return Err(Error::invalid("folds", self.folds, "must be at least 2"));
        }
        self.validate_estimator()?;
        if let Some(bag) = &self.bagging {
            if bag.bags < 1 {
                return Err(Error::Configuration(format!(
                    "bag count must be at least 1, got {}",
                    bag.bags
                )));
            }
            if !(bag.fraction > 0.0 && bag.fraction <= 1.0) {
                return Err(Error::Configuration(format!(
                    "bag fraction must be in (0, 1], got {}",
                    bag.fraction
                )));
            }
        }
        Ok(())
    }

    /// Check the parameters that shape a single estimate: neighbor count,
    /// power, time-scale, radius and filter limits.
    pub fn validate_estimator(&self) -> Result<()> {
        if self.neighbors < 1 {
            return Err(Error::invalid("neighbors", self.neighbors, "must be at least 1"));
        }
        if !(self.power.is_finite() && self.power > 0.0) {
            return Err(Error::invalid("power", self.power, "must be positive"));
        }
        if !(self.time_scale.is_finite() && self.time_scale >= 0.0) {
            return Err(Error::invalid(
                "time_scale",
                self.time_scale,
                "must be finite and non-negative",
            ));
        }
        if let Some(r) = self.radius {
            if !(r.is_finite() && r > 0.0) {
                return Err(Error::invalid("radius", r, "must be positive"));
            }
        }
        if let FilterPolicy::DistanceTime { distance_limit, day_limit } = self.filter {
            if !(distance_limit.is_finite() && distance_limit >= 0.0) {
                return Err(Error::invalid("distance_limit", distance_limit, "must be non-negative"));
            }
            if !(day_limit.is_finite() && day_limit >= 0.0) {
                return Err(Error::invalid("day_limit", day_limit, "must be non-negative"));
            }
        }
        Ok(())
    }

    /// Check that `point_count` points can be split into this many folds.
    pub fn validate_for(&self, point_count: usize) -> Result<()> {
        self.validate()?;
        if self.folds > point_count {
            return Err(Error::Configuration(format!(
                "fold count {} exceeds point count {}",
                self.folds, point_count
            )));
        }
        Ok(())
    }
}
