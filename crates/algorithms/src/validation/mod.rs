//! K-fold cross-validation of IDW over spatiotemporal points
//!
//! - Partition: round-robin fold assignment
//! - Bagging: seeded resampling of training sets
//! - Statistics: MAE, MSE, RMSE, MARE, RMSPE
//! - K-fold: the cross-validation driver and its `evaluate` entry point

pub mod bagging;
pub mod kfold;
pub mod partition;
pub mod statistics;

pub use kfold::{cross_validate, cross_validate_with, evaluate, CvReport, FoldResult};
pub use partition::FoldPartition;
pub use statistics::{ErrorAccumulator, ErrorSummary};
