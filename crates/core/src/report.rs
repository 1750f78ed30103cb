//! Seams to the collaborators around the engine: where points come from
//! and where results go.

use std::fmt;

use crate::config::CvConfig;
use crate::error::Result;
use crate::point::Point;

/// Yields the point collection for a run.
pub trait PointSource {
    fn load(&mut self) -> Result<Vec<Point>>;
}

impl PointSource for Vec<Point> {
    fn load(&mut self) -> Result<Vec<Point>> {
        Ok(self.clone())
    }
}

/// Which part of a run a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportScope {
    Fold(usize),
    Aggregate,
}

impl fmt::Display for ReportScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportScope::Fold(i) => write!(f, "{i}"),
            ReportScope::Aggregate => f.write_str("all"),
        }
    }
}

/// What a record reports: scores, or the error category that stopped
/// the configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordOutcome {
    Scored { mare: f64, rmspe: f64 },
    Failed { kind: &'static str },
}

impl RecordOutcome {
    pub fn mare(&self) -> Option<f64> {
        match self {
            RecordOutcome::Scored { mare, .. } => Some(*mare),
            RecordOutcome::Failed { .. } => None,
        }
    }

    pub fn rmspe(&self) -> Option<f64> {
        match self {
            RecordOutcome::Scored { rmspe, .. } => Some(*rmspe),
            RecordOutcome::Failed { .. } => None,
        }
    }

    pub fn failure(&self) -> Option<&'static str> {
        match self {
            RecordOutcome::Scored { .. } => None,
            RecordOutcome::Failed { kind } => Some(kind),
        }
    }
}

/// One line of a result report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRecord {
    pub conf_id: usize,
    pub scope: ReportScope,
    pub config: CvConfig,
    pub outcome: RecordOutcome,
}

/// Receives result records.
pub trait ReportSink {
    fn record(&mut self, record: &ReportRecord) -> Result<()>;

    /// Flush anything buffered.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

impl ReportSink for Vec<ReportRecord> {
    fn record(&mut self, record: &ReportRecord) -> Result<()> {
        self.push(record.clone());
        Ok(())
    }
}
