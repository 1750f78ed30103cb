//! # stkfold core
//!
//! Core types for spatiotemporal k-fold cross-validation.
//!
//! This crate provides:
//! - `Point` / `ScaledPoint`: raw observations and their (x, y, scaled-time) projection
//! - `CvConfig`: one cross-validation configuration, and `ParameterGrid` for sweeps
//! - `RadiusTable`: precomputed time-scale → exclusion radius lookup
//! - `PointSource` / `ReportSink`: seams to loading and reporting
//! - The error taxonomy shared by every crate in the workspace

pub mod config;
pub mod error;
pub mod grid;
pub mod point;
pub mod radius;
pub mod report;

pub use config::{Bagging, CvConfig, FilterPolicy};
pub use error::{Error, Result};
pub use grid::{GridEntry, ParameterGrid};
pub use point::{scale_points, Point, ScaledPoint, TimeEpoch};
pub use radius::RadiusTable;
pub use report::{PointSource, RecordOutcome, ReportRecord, ReportScope, ReportSink};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{Bagging, CvConfig, FilterPolicy};
    pub use crate::error::{Error, Result};
    pub use crate::grid::{BaggingSpec, GridEntry, ParameterGrid};
    pub use crate::point::{scale_points, Point, ScaledPoint, TimeEpoch};
    pub use crate::radius::RadiusTable;
    pub use crate::report::{PointSource, RecordOutcome, ReportRecord, ReportScope, ReportSink};
}
