//! Time-scale → exclusion radius lookup table
//!
//! Built once offline (see `stkfold_algorithms::radius::build_radius_table`)
//! and handed to every configuration as read-only data.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Mapping from a time-scale to the distance limit used at that scale.
///
/// Keys are the shortest decimal rendering that round-trips to the same
/// `f64`, so `0.025` is stored under `"0.025"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RadiusTable {
    entries: BTreeMap<String, f64>,
}

/// Canonical key for a time-scale.
pub fn time_scale_key(time_scale: f64) -> String {
    format!("{time_scale}")
}

impl RadiusTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, time_scale: f64, radius: f64) -> Option<f64> {
        self.entries.insert(time_scale_key(time_scale), radius)
    }

    pub fn get(&self, time_scale: f64) -> Option<f64> {
        self.entries.get(&time_scale_key(time_scale)).copied()
    }

    /// Like [`get`](Self::get), but a missing key is an error.
    pub fn limit_for(&self, time_scale: f64) -> Result<f64> {
        self.get(time_scale).ok_or_else(|| Error::MissingRadius {
            time_scale: time_scale_key(time_scale),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate (key, radius) pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}

impl FromIterator<(f64, f64)> for RadiusTable {
    fn from_iter<I: IntoIterator<Item = (f64, f64)>>(iter: I) -> Self {
        let mut table = RadiusTable::new();
        for (c, r) in iter {
            table.insert(c, r);
        }
        table
    }
}
