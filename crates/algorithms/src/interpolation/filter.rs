//! Neighbor exclusion
//!
//! Every policy keeps a prefix of the query result: it never reorders,
//! it only cuts at the first neighbor that breaks a limit.

use stkfold_core::{CvConfig, Error, FilterPolicy, RadiusTable, Result, ScaledPoint};

use super::Neighbor;

/// A filter with all limits resolved for one configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExclusionFilter {
    /// Keep everything
    None,
    /// Planar distance and day-gap limits, checked per neighbor in order.
    ///
    /// When the very first neighbor is too far in the plane it is kept on
    /// its own; when it is too far in time nothing is kept.
    DistanceTime { distance_limit: f64, day_limit: f64 },
    /// 3-D distance limit. A first neighbor beyond the limit is kept on
    /// its own.
    Euclidean { limit: f64 },
}

impl ExclusionFilter {
    /// Resolve the configuration's policy into concrete limits.
    ///
    /// The Euclidean limit comes from `config.radius` when set, otherwise
    /// from `table` at `config.time_scale`.
    pub fn resolve(config: &CvConfig, table: Option<&RadiusTable>) -> Result<Self> {
        Ok(match config.filter {
            FilterPolicy::None => ExclusionFilter::None,
            FilterPolicy::DistanceTime {
                distance_limit,
                day_limit,
            } => ExclusionFilter::DistanceTime {
                distance_limit,
                day_limit,
            },
            FilterPolicy::Euclidean => {
                let limit = match (config.radius, table) {
                    (Some(r), _) => r,
                    (None, Some(t)) => t.limit_for(config.time_scale)?,
                    (None, None) => {
                        return Err(Error::Configuration(
                            "euclidean filter needs a radius or a radius table".into(),
                        ))
                    }
                };
                ExclusionFilter::Euclidean { limit }
            }
        })
    }

    /// Number of leading neighbors that survive.
    pub fn retained(&self, neighbors: &[Neighbor], query: &ScaledPoint) -> usize {
        match *self {
            ExclusionFilter::None => neighbors.len(),
            ExclusionFilter::DistanceTime {
                distance_limit,
                day_limit,
            } => {
                for (i, n) in neighbors.iter().enumerate() {
                    if query.planar_distance(&n.point) > distance_limit {
                        return i.max(1);
                    }
                    if query.day_gap(&n.point) > day_limit {
                        return i;
                    }
                }
                neighbors.len()
            }
            ExclusionFilter::Euclidean { limit } => neighbors
                .iter()
                .position(|n| n.distance > limit)
                .map_or(neighbors.len(), |i| i.max(1)),
        }
    }

    /// Truncate `neighbors` to the surviving prefix.
    pub fn apply(&self, mut neighbors: Vec<Neighbor>, query: &ScaledPoint) -> Vec<Neighbor> {
        let keep = self.retained(&neighbors, query);
        neighbors.truncate(keep);
        neighbors
    }
}
