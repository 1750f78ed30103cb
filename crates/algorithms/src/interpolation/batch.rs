//! Batch estimation at unmeasured locations
//!
//! A single KD-tree is built over every measured point. Each query
//! location (typically an area centroid) is expanded into one query per
//! day and estimated with the configured neighbor count, power and
//! exclusion filter. Locations are processed in parallel; output stays
//! location-major and day-ordered.

use std::ops::RangeInclusive;

use stkfold_core::{scale_points, CvConfig, Error, Point, RadiusTable, Result, ScaledPoint};
use tracing::debug;

use super::{idw_estimate, ExclusionFilter, KdTree};
use crate::maybe_rayon::map_ordered;

/// Days estimated per location unless told otherwise.
pub const DAYS_PER_YEAR: i64 = 365;

/// A location to estimate at.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryLocation {
    pub id: String,
    pub longitude: f64,
    pub latitude: f64,
}

impl QueryLocation {
    pub fn new(id: impl Into<String>, longitude: f64, latitude: f64) -> Self {
        Self {
            id: id.into(),
            longitude,
            latitude,
        }
    }
}

/// One estimated value.
#[derive(Debug, Clone, PartialEq)]
pub struct Estimate {
    /// Id of the [`QueryLocation`] this belongs to
    pub id: String,
    /// Day offset in the configuration's epoch
    pub day: i64,
    pub value: f64,
}

/// Estimator over the full set of measured points.
#[derive(Debug)]
pub struct BatchInterpolator {
    tree: KdTree,
    filter: ExclusionFilter,
    neighbors: usize,
    power: f64,
    time_scale: f64,
}

impl BatchInterpolator {
    /// Index `points` for estimation.
    ///
    /// Uses the configuration's neighbor count, power, time-scale, epoch and
    /// filter; folds and bagging play no part.
    pub fn new(
        config: &CvConfig,
        points: &[Point],
        radius_table: Option<&RadiusTable>,
    ) -> Result<Self> {
        config.validate_estimator()?;
        let filter = ExclusionFilter::resolve(config, radius_table)?;
        let scaled = scale_points(points, config.time_scale, config.epoch)?;
        let tree = KdTree::build(&scaled)?;
        debug!(
            points = tree.len(),
            neighbors = config.neighbors,
            power = config.power,
            time_scale = config.time_scale,
            "indexed measured points"
        );
        Ok(Self {
            tree,
            filter,
            neighbors: config.neighbors,
            power: config.power,
            time_scale: config.time_scale,
        })
    }

    /// Estimate at (`longitude`, `latitude`) on `day`.
    pub fn estimate(&self, longitude: f64, latitude: f64, day: i64) -> Result<f64> {
        let day = day as f64;
        let query = ScaledPoint {
            ordinal: 0,
            x: longitude,
            y: latitude,
            t: self.time_scale * day,
            day,
            value: f64::NAN,
        };
        let neighbors = self
            .filter
            .apply(self.tree.k_nearest(&query, self.neighbors)?, &query);
        idw_estimate(&query, &neighbors, self.power)
    }

    /// Estimate every location on every day of `days`.
    ///
    /// Any failing query aborts the batch.
    pub fn interpolate(
        &self,
        locations: &[QueryLocation],
        days: RangeInclusive<i64>,
    ) -> Result<Vec<Estimate>> {
        if days.is_empty() {
            return Err(Error::invalid(
                "days",
                format!("{}..={}", days.start(), days.end()),
                "day range is empty",
            ));
        }

        let per_location = map_ordered(locations, |loc| self.interpolate_location(loc, days.clone()));
        let mut estimates = Vec::with_capacity(locations.len() * days.clone().count());
        for batch in per_location {
            estimates.extend(batch?);
        }
        debug!(
            locations = locations.len(),
            estimates = estimates.len(),
            "interpolated"
        );
        Ok(estimates)
    }

    fn interpolate_location(
        &self,
        location: &QueryLocation,
        days: RangeInclusive<i64>,
    ) -> Result<Vec<Estimate>> {
        if !(location.longitude.is_finite() && location.latitude.is_finite()) {
            return Err(Error::invalid(
                "location",
                &location.id,
                "coordinates must be finite",
            ));
        }
        days.map(|day| {
            Ok(Estimate {
                id: location.id.clone(),
                day,
                value: self.estimate(location.longitude, location.latitude, day)?,
            })
        })
        .collect()
    }
}
