//! Parameter sweeps
//!
//! Every configuration of a grid is cross-validated as an independent task
//! on a [`WorkerPool`]. All tasks read the same point collection; each
//! builds its own scaled working set, so no task observes another's data.
//! A failing configuration is recorded with its error label and never
//! affects its siblings.

use stkfold_algorithms::{cross_validate, CvReport};
use stkfold_core::{
    CvConfig, GridEntry, Point, RadiusTable, RecordOutcome, ReportRecord, ReportScope,
    ReportSink, Result,
};
use tracing::{debug, warn};

use crate::strategy::WorkerPool;

/// Why a configuration produced no result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepFailure {
    /// Error category, e.g. `InsufficientNeighborsError`
    pub kind: &'static str,
    pub message: String,
}

/// Result of one configuration in a sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepOutcome {
    pub conf_id: usize,
    pub config: CvConfig,
    pub result: std::result::Result<CvReport, SweepFailure>,
}

impl SweepOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// One record per fold followed by the aggregate. A failed
    /// configuration yields a single aggregate record carrying its label.
    pub fn records(&self) -> Vec<ReportRecord> {
        let record = |scope, outcome| ReportRecord {
            conf_id: self.conf_id,
            scope,
            config: self.config.clone(),
            outcome,
        };
        let report = match &self.result {
            Ok(report) => report,
            Err(failure) => {
                return vec![record(
                    ReportScope::Aggregate,
                    RecordOutcome::Failed { kind: failure.kind },
                )];
            }
        };
        let scored = |mare, rmspe| RecordOutcome::Scored { mare, rmspe };
        report
            .folds
            .iter()
            .map(|f| {
                record(
                    ReportScope::Fold(f.fold),
                    scored(f.summary.mare, f.summary.rmspe),
                )
            })
            .chain(std::iter::once(record(
                ReportScope::Aggregate,
                scored(report.mare(), report.rmspe()),
            )))
            .collect()
    }
}

/// Counts from a completed sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub succeeded: usize,
    pub failed: usize,
}

/// Cross-validate every entry, returning outcomes in entry order.
pub fn evaluate_configurations(
    pool: &WorkerPool,
    entries: &[GridEntry],
    points: &[Point],
    radius_table: Option<&RadiusTable>,
) -> Vec<SweepOutcome> {
    evaluate_configurations_with(pool, entries, points, radius_table, |_| {})
}

/// Like [`evaluate_configurations`], calling `on_done` as each task finishes.
pub fn evaluate_configurations_with<F>(
    pool: &WorkerPool,
    entries: &[GridEntry],
    points: &[Point],
    radius_table: Option<&RadiusTable>,
    on_done: F,
) -> Vec<SweepOutcome>
where
    F: Fn(&SweepOutcome) + Sync + Send,
{
    debug!(
        configurations = entries.len(),
        threads = pool.threads(),
        "starting sweep"
    );
    pool.map(entries, |entry| {
        let result = cross_validate(&entry.config, points, radius_table).map_err(|e| {
            warn!(conf_id = entry.id, kind = e.kind(), "configuration failed: {e}");
            SweepFailure {
                kind: e.kind(),
                message: e.to_string(),
            }
        });
        let outcome = SweepOutcome {
            conf_id: entry.id,
            config: entry.config.clone(),
            result,
        };
        on_done(&outcome);
        outcome
    })
}

/// Write every outcome to `sink`, in entry order.
pub fn write_outcomes(outcomes: &[SweepOutcome], sink: &mut dyn ReportSink) -> Result<SweepStats> {
    let mut stats = SweepStats::default();
    for outcome in outcomes {
        if outcome.is_ok() {
            stats.succeeded += 1;
        } else {
            stats.failed += 1;
        }
        for record in outcome.records() {
            sink.record(&record)?;
        }
    }
    sink.finish()?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use stkfold_core::{FilterPolicy, ParameterGrid};

    fn points() -> Vec<Point> {
        let d0 = NaiveDate::from_ymd_opt(2011, 5, 1).unwrap();
        (0..40)
            .map(|i| {
                let x = (i % 8) as f64 * 0.5;
                let y = (i / 8) as f64 * 0.5;
                let v = 5.0 + x + 2.0 * y + (i % 3) as f64 * 0.25;
                Point::new(format!("s{i}"), x, y, d0 + Duration::days((i % 4) as i64), v)
            })
            .collect()
    }

    fn entries() -> Vec<GridEntry> {
        let grid = ParameterGrid {
            folds: vec![4],
            neighbors: vec![2, 3],
            powers: vec![1.0, 2.0],
            time_scales: vec![0.1],
            ..ParameterGrid::default()
        };
        grid.expand()
    }

    #[test]
    fn test_outcomes_in_entry_order() {
        let pool = WorkerPool::new(crate::ProcessingMode::ParallelWith(2)).unwrap();
        let entries = entries();
        let outcomes = evaluate_configurations(&pool, &entries, &points(), None);
        assert_eq!(outcomes.len(), entries.len());
        for (o, e) in outcomes.iter().zip(&entries) {
            assert_eq!(o.conf_id, e.id);
            assert!(o.is_ok());
        }
    }

    #[test]
    fn test_modes_agree() {
        let pts = points();
        let entries = entries();
        let seq = evaluate_configurations(
            &WorkerPool::new(crate::ProcessingMode::Sequential).unwrap(),
            &entries,
            &pts,
            None,
        );
        let par = evaluate_configurations(&WorkerPool::default(), &entries, &pts, None);
        assert_eq!(seq, par);
    }

    #[test]
    fn test_failure_is_isolated() {
        let mut entries = entries();
        // Euclidean filter with neither a radius nor a table
        entries[1].config.filter = FilterPolicy::Euclidean;
        let outcomes = evaluate_configurations(&WorkerPool::default(), &entries, &points(), None);

        let failure = outcomes[1].result.as_ref().unwrap_err();
        assert_eq!(failure.kind, "ConfigurationError");
        let records = outcomes[1].records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].scope, ReportScope::Aggregate);
        assert_eq!(records[0].outcome.failure(), Some("ConfigurationError"));
        assert!(outcomes.iter().enumerate().all(|(i, o)| i == 1 || o.is_ok()));
    }

    #[test]
    fn test_write_outcomes() {
        let mut entries = entries();
        entries[0].config.folds = 100;
        let outcomes = evaluate_configurations(&WorkerPool::default(), &entries, &points(), None);

        let mut sink: Vec<ReportRecord> = Vec::new();
        let stats = write_outcomes(&outcomes, &mut sink).unwrap();
        assert_eq!(stats, SweepStats { succeeded: 3, failed: 1 });
        // One labeled row for the failure, then 4 folds + aggregate for each success
        assert_eq!(sink.len(), 1 + 3 * 5);
        assert_eq!(sink[0].conf_id, entries[0].id);
        assert_eq!(
            sink[0].outcome,
            RecordOutcome::Failed { kind: "ConfigurationError" }
        );
        assert_eq!(sink[5].scope, ReportScope::Aggregate);
        assert_eq!(sink[5].conf_id, entries[1].id);
        assert!(sink[5].outcome.mare().is_some());
    }

    #[test]
    fn test_progress_callback_sees_every_task() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let seen = AtomicUsize::new(0);
        let entries = entries();
        evaluate_configurations_with(&WorkerPool::default(), &entries, &points(), None, |_| {
            seen.fetch_add(1, Ordering::Relaxed);
        });
        assert_eq!(seen.load(Ordering::Relaxed), entries.len());
    }
}
