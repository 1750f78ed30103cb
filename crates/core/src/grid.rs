//! Parameter grids for configuration sweeps

use serde::{Deserialize, Serialize};

use crate::config::{Bagging, CvConfig, FilterPolicy};
use crate::error::Result;
use crate::point::TimeEpoch;

/// Bag count and fraction for one grid axis entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaggingSpec {
    pub bags: usize,
    pub fraction: f64,
}

/// The cartesian product of parameter values to evaluate.
///
/// An empty `bagging` list means every configuration runs unbagged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterGrid {
    pub folds: Vec<usize>,
    pub neighbors: Vec<usize>,
    pub powers: Vec<f64>,
    pub time_scales: Vec<f64>,
    pub bagging: Vec<BaggingSpec>,
    pub radius: Option<f64>,
    pub filter: FilterPolicy,
    pub epoch: TimeEpoch,
    pub seed: u64,
}

/// A configuration with its position in the sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct GridEntry {
    pub id: usize,
    pub config: CvConfig,
}

/// Time-scales 0.001..=0.024 in steps of 0.001, then 0.025..=2.0 in steps of 0.025.
pub fn default_time_scales() -> Vec<f64> {
    let mut scales: Vec<f64> = (1..25).map(|i| 0.001 * i as f64).collect();
    scales.extend((1..81).map(|i| 0.025 * i as f64));
    scales
}

impl Default for ParameterGrid {
    fn default() -> Self {
        Self {
            folds: vec![10],
            neighbors: (3..=8).collect(),
            powers: (2..=10).map(|i| i as f64 * 0.5).collect(),
            time_scales: default_time_scales(),
            bagging: Vec::new(),
            radius: None,
            filter: FilterPolicy::None,
            epoch: TimeEpoch::StartOfYear,
            seed: 0,
        }
    }
}

impl ParameterGrid {
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Number of configurations `expand` yields.
    pub fn len(&self) -> usize {
        self.folds.len()
            * self.neighbors.len()
            * self.powers.len()
            * self.time_scales.len()
            * self.bagging.len().max(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Expand into configurations ordered k → n → p → c → bagging, with
    /// incrementing ids starting at 0.
    pub fn expand(&self) -> Vec<GridEntry> {
        let bagging: Vec<Option<Bagging>> = if self.bagging.is_empty() {
            vec![None]
        } else {
            self.bagging
                .iter()
                .map(|b| Some(Bagging::new(b.bags, b.fraction, self.seed)))
                .collect()
        };

        let mut entries = Vec::with_capacity(self.len());
        for &k in &self.folds {
            for &n in &self.neighbors {
                for &p in &self.powers {
                    for &c in &self.time_scales {
                        for bag in &bagging {
                            let config = CvConfig {
                                folds: k,
                                neighbors: n,
                                power: p,
                                radius: self.radius,
                                time_scale: c,
                                bagging: *bag,
                                filter: self.filter,
                                epoch: self.epoch,
                            };
                            entries.push(GridEntry {
                                id: entries.len(),
                                config,
                            });
                        }
                    }
                }
            }
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grid_size() {
        let grid = ParameterGrid::default();
        assert_eq!(grid.time_scales.len(), 104);
        assert_eq!(grid.powers, vec![1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0, 4.5, 5.0]);
        assert_eq!(grid.len(), 6 * 9 * 104);
        assert_eq!(grid.expand().len(), grid.len());
    }

    #[test]
    fn test_expand_order_and_ids() {
        let grid = ParameterGrid {
            folds: vec![5],
            neighbors: vec![3, 4],
            powers: vec![1.0, 2.0],
            time_scales: vec![0.1],
            bagging: vec![
                BaggingSpec { bags: 3, fraction: 0.5 },
                BaggingSpec { bags: 3, fraction: 0.75 },
            ],
            seed: 11,
            ..Default::default()
        };
        let entries = grid.expand();
        assert_eq!(entries.len(), 8);
        for (i, e) in entries.iter().enumerate() {
            assert_eq!(e.id, i);
        }
        assert_eq!(entries[0].config.neighbors, 3);
        assert_eq!(entries[0].config.power, 1.0);
        assert_eq!(entries[0].config.bagging, Some(Bagging::new(3, 0.5, 11)));
        assert_eq!(entries[1].config.bagging, Some(Bagging::new(3, 0.75, 11)));
        assert_eq!(entries[2].config.power, 2.0);
        assert_eq!(entries[4].config.neighbors, 4);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let grid = ParameterGrid::from_json(r#"{"neighbors": [3], "powers": [2.0]}"#).unwrap();
        assert_eq!(grid.folds, vec![10]);
        assert_eq!(grid.neighbors, vec![3]);
        assert_eq!(grid.len(), 104);
    }

    #[test]
    fn test_empty_axis() {
        let grid = ParameterGrid {
            neighbors: Vec::new(),
            ..Default::default()
        };
        assert!(grid.is_empty());
        assert!(grid.expand().is_empty());
    }
}
