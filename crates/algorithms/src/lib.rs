//! # stkfold algorithms
//!
//! Spatiotemporal k-fold cross-validation of inverse-distance-weighted
//! interpolation.
//!
//! ## Modules
//!
//! - **interpolation**: 3-D KD-tree, brute-force oracle, neighbor
//!   exclusion filters, IDW estimate, batch estimation at query locations
//! - **validation**: fold partitioning, bagging, error statistics and the
//!   cross-validation driver (`evaluate`)
//! - **radius**: offline construction of the time-scale → radius table

pub mod interpolation;
pub(crate) mod maybe_rayon;
pub mod radius;
pub mod validation;

pub use validation::{cross_validate, evaluate, CvReport};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::interpolation::{
        idw_estimate, BatchInterpolator, BruteForceIndex, Estimate, ExclusionFilter, KdTree,
        Neighbor, NeighborIndex, QueryLocation,
    };
    pub use crate::radius::{build_radius_table, percentile_radius, DEFAULT_PERCENTILE};
    pub use crate::validation::{
        cross_validate, cross_validate_with, evaluate, CvReport, ErrorSummary, FoldPartition,
        FoldResult,
    };
    pub use stkfold_core::prelude::*;
}
