//! Result reports as delimited text

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;
use stkfold_algorithms::interpolation::Estimate;
use stkfold_core::{ReportRecord, ReportSink, Result};

#[derive(Serialize)]
struct Row {
    conf_id: usize,
    scope: String,
    folds: usize,
    neighbors: usize,
    power: f64,
    time_scale: f64,
    alpha: Option<f64>,
    m: Option<usize>,
    mare: Option<f64>,
    rmspe: Option<f64>,
    error: Option<&'static str>,
}

impl From<&ReportRecord> for Row {
    fn from(r: &ReportRecord) -> Self {
        Self {
            conf_id: r.conf_id,
            scope: r.scope.to_string(),
            folds: r.config.folds,
            neighbors: r.config.neighbors,
            power: r.config.power,
            time_scale: r.config.time_scale,
            alpha: r.config.bagging.map(|b| b.fraction),
            m: r.config.bagging.map(|b| b.bags),
            mare: r.outcome.mare(),
            rmspe: r.outcome.rmspe(),
            error: r.outcome.failure(),
        }
    }
}

/// Writes one CSV row per record, header first.
///
/// Unbagged configurations leave `alpha` and `m` empty. A failed
/// configuration leaves `mare` and `rmspe` empty and names its error kind.
pub struct CsvReportSink<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvReportSink<File> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let writer = csv::Writer::from_path(path).map_err(io::Error::from)?;
        Ok(Self { writer })
    }
}

impl<W: Write> CsvReportSink<W> {
    pub fn from_writer(inner: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(inner),
        }
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| e.into_error().into())
    }
}

impl<W: Write> ReportSink for CsvReportSink<W> {
    fn record(&mut self, record: &ReportRecord) -> Result<()> {
        self.writer
            .serialize(Row::from(record))
            .map_err(io::Error::from)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[derive(Serialize)]
struct EstimateRow<'a> {
    id: &'a str,
    day: i64,
    estimate: f64,
}

/// Write `id,day,estimate` rows, header first.
pub fn write_estimates<W: Write>(inner: W, estimates: &[Estimate]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(inner);
    for e in estimates {
        writer
            .serialize(EstimateRow {
                id: &e.id,
                day: e.day,
                estimate: e.value,
            })
            .map_err(io::Error::from)?;
    }
    writer.flush()?;
    Ok(())
}
