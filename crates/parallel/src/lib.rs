//! # stkfold parallel
//!
//! Configuration-level parallelism for spatiotemporal cross-validation.
//!
//! This crate provides:
//! - `WorkerPool`: the process-wide pool, built from a `ProcessingMode`
//! - Sweeps: one independent cross-validation task per grid entry

pub mod strategy;
pub mod sweep;

pub use strategy::{num_cpus, ProcessingMode, WorkerPool};
pub use sweep::{
    evaluate_configurations, evaluate_configurations_with, write_outcomes, SweepFailure,
    SweepOutcome, SweepStats,
};
