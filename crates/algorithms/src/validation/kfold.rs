//! Spatiotemporal k-fold cross-validation
//!
//! Per configuration the run moves through these stages:
//!
//! 1. **Configured**: the configuration is validated and the exclusion
//!    filter's limits are resolved (radius-table lookups happen here,
//!    never inside a fold).
//! 2. **Partitioned**: points are time-scaled into a configuration-local
//!    working set and split round-robin into k folds.
//! 3. **Per-fold evaluation**: each fold indexes its training set (or m
//!    bootstrap bags of it), estimates every held-out point with IDW and
//!    accumulates errors. Folds only read the shared working set and run
//!    in parallel.
//! 4. **Aggregated**: per-fold statistics are averaged in fold order.
//!
//! Any error aborts the configuration; nothing partial is returned.

use stkfold_core::{scale_points, CvConfig, Error, Point, RadiusTable, Result, ScaledPoint};
use tracing::debug;

use super::bagging::{fold_rng, sample_with_replacement};
use super::partition::FoldPartition;
use super::statistics::{ErrorAccumulator, ErrorSummary};
use crate::interpolation::{idw_estimate, ExclusionFilter, KdTree, NeighborIndex};
use crate::maybe_rayon::map_ordered;

/// Outcome of one fold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoldResult {
    pub fold: usize,
    pub validation_len: usize,
    pub training_len: usize,
    /// Statistics for this fold; with bagging, the mean over its bags
    pub summary: ErrorSummary,
}

/// Outcome of a full cross-validation run.
#[derive(Debug, Clone, PartialEq)]
pub struct CvReport {
    /// Per-fold results in fold order
    pub folds: Vec<FoldResult>,
    /// Mean of the per-fold statistics
    pub aggregate: ErrorSummary,
}

impl CvReport {
    pub fn mare(&self) -> f64 {
        self.aggregate.mare
    }

    pub fn rmspe(&self) -> f64 {
        self.aggregate.rmspe
    }
}

/// Run k-fold cross-validation and return `(MARE, RMSPE)`.
///
/// `radius_table` is only consulted by the Euclidean filter when the
/// configuration has no fixed radius.
pub fn evaluate(
    config: &CvConfig,
    points: &[Point],
    radius_table: Option<&RadiusTable>,
) -> Result<(f64, f64)> {
    let report = cross_validate(config, points, radius_table)?;
    Ok((report.mare(), report.rmspe()))
}

/// Run k-fold cross-validation with a KD-tree per fold.
pub fn cross_validate(
    config: &CvConfig,
    points: &[Point],
    radius_table: Option<&RadiusTable>,
) -> Result<CvReport> {
    cross_validate_with::<KdTree>(config, points, radius_table)
}

/// Run k-fold cross-validation with any [`NeighborIndex`].
pub fn cross_validate_with<I: NeighborIndex>(
    config: &CvConfig,
    points: &[Point],
    radius_table: Option<&RadiusTable>,
) -> Result<CvReport> {
    config.validate_for(points.len())?;
    let filter = ExclusionFilter::resolve(config, radius_table)?;

    let scaled = scale_points(points, config.time_scale, config.epoch)?;
    let partition = FoldPartition::round_robin(scaled.len(), config.folds)?;
    debug!(
        folds = config.folds,
        neighbors = config.neighbors,
        power = config.power,
        time_scale = config.time_scale,
        points = scaled.len(),
        "partitioned"
    );

    let outcomes: Vec<Result<FoldResult>> = map_ordered(0..partition.fold_count(), |fold| {
        evaluate_fold::<I>(fold, &partition, &scaled, config, &filter)
    });
    // Surface the first failure in fold order
    let folds = outcomes.into_iter().collect::<Result<Vec<FoldResult>>>()?;

    let summaries: Vec<ErrorSummary> = folds.iter().map(|f| f.summary).collect();
    let aggregate = ErrorSummary::mean(&summaries)
        .ok_or_else(|| Error::Configuration("no folds evaluated".into()))?;

    debug!(mare = aggregate.mare, rmspe = aggregate.rmspe, "aggregated");
    Ok(CvReport { folds, aggregate })
}

fn evaluate_fold<I: NeighborIndex>(
    fold: usize,
    partition: &FoldPartition,
    scaled: &[ScaledPoint],
    config: &CvConfig,
    filter: &ExclusionFilter,
) -> Result<FoldResult> {
    let validation: Vec<ScaledPoint> = partition.validation(fold).iter().map(|&i| scaled[i]).collect();
    let training: Vec<ScaledPoint> = partition.training(fold).iter().map(|&i| scaled[i]).collect();

    if validation.is_empty() {
        return Err(Error::Configuration(format!("fold {fold} has no validation points")));
    }

    let summary = match &config.bagging {
        None => {
            let index = I::build(&training)?;
            score(&index, &validation, config, filter)?
        }
        Some(bagging) => {
            let size = bagging.bag_size(training.len());
            if size == 0 {
                return Err(Error::Configuration(format!(
                    "bag fraction {} leaves fold {fold} with empty bags ({} training points)",
                    bagging.fraction,
                    training.len()
                )));
            }
            let mut rng = fold_rng(bagging.seed, fold);
            let mut per_bag = Vec::with_capacity(bagging.bags);
            for _ in 0..bagging.bags {
                let bag = sample_with_replacement(&training, size, &mut rng);
                let index = I::build(&bag)?;
                per_bag.push(score(&index, &validation, config, filter)?);
            }
            ErrorSummary::mean(&per_bag)
                .ok_or_else(|| Error::Configuration("bag count must be at least 1".into()))?
        }
    };

    debug!(fold, mare = summary.mare, rmspe = summary.rmspe, "fold evaluated");
    Ok(FoldResult {
        fold,
        validation_len: validation.len(),
        training_len: training.len(),
        summary,
    })
}

/// Estimate every validation point from `index` and summarize the errors.
fn score<I: NeighborIndex>(
    index: &I,
    validation: &[ScaledPoint],
    config: &CvConfig,
    filter: &ExclusionFilter,
) -> Result<ErrorSummary> {
    let mut acc = ErrorAccumulator::new();
    for p in validation {
        let neighbors = filter.apply(index.k_nearest(p, config.neighbors)?, p);
        let estimate = idw_estimate(p, &neighbors, config.power)?;
        acc.push(estimate, p.value, p.ordinal)?;
    }
    acc.summary()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use stkfold_core::{Bagging, FilterPolicy};

    use crate::interpolation::BruteForceIndex;

    fn line(n: usize) -> Vec<Point> {
        let d = NaiveDate::from_ymd_opt(2009, 1, 1).unwrap();
        (0..n)
            .map(|i| Point::new(format!("s{i}"), i as f64, 0.0, d, (i + 1) as f64))
            .collect()
    }

    #[test]
    fn test_line_two_folds_one_neighbor() {
        // Fold 0 holds even x, fold 1 odd x. With one neighbor the
        // estimate is the nearest training value; ties go to the
        // training point listed first.
        let pts = line(10);
        let config = CvConfig::new(2, 1, 2.0, 1.0);
        let report = cross_validate(&config, &pts, None).unwrap();

        // Fold 0 validates x = 0,2,4,6,8 (values 1,3,5,7,9); training is
        // x = 1,3,5,7,9 and each query is equidistant from x-1 and x+1
        // except x = 0 (only x = 1).
        // x=0 -> x=1 (2); x=2 -> x=1 (2); x=4 -> x=3 (4); x=6 -> x=5 (6); x=8 -> x=7 (8)
        let fold0: [(f64, f64); 5] = [(2.0, 1.0), (2.0, 3.0), (4.0, 5.0), (6.0, 7.0), (8.0, 9.0)];
        // Fold 1 validates x = 1,3,5,7,9 (values 2,4,6,8,10); training x = 0,2,4,6,8.
        // x=1 -> x=0 (1); x=3 -> x=2 (3); x=5 -> x=4 (5); x=7 -> x=6 (7); x=9 -> x=8 (9)
        let fold1: [(f64, f64); 5] = [(1.0, 2.0), (3.0, 4.0), (5.0, 6.0), (7.0, 8.0), (9.0, 10.0)];

        let stats = |pairs: &[(f64, f64)]| {
            let n = pairs.len() as f64;
            let mare = pairs.iter().map(|(e, t)| (e - t).abs() / t).sum::<f64>() / n;
            let rmspe = 100.0 * (pairs.iter().map(|(e, t)| ((e - t) / t).powi(2)).sum::<f64>() / n).sqrt();
            (mare, rmspe)
        };
        let (m0, r0) = stats(&fold0);
        let (m1, r1) = stats(&fold1);

        assert_relative_eq!(report.folds[0].summary.mare, m0, epsilon = 1e-12);
        assert_relative_eq!(report.folds[1].summary.mare, m1, epsilon = 1e-12);
        assert_relative_eq!(report.mare(), (m0 + m1) / 2.0, epsilon = 1e-12);
        assert_relative_eq!(report.rmspe(), (r0 + r1) / 2.0, epsilon = 1e-10);
    }

    #[test]
    fn test_evaluate_returns_aggregate() {
        let pts = line(12);
        let config = CvConfig::new(3, 2, 2.0, 0.1);
        let report = cross_validate(&config, &pts, None).unwrap();
        let (mare, rmspe) = evaluate(&config, &pts, None).unwrap();
        assert_eq!(mare, report.mare());
        assert_eq!(rmspe, report.rmspe());
        assert_eq!(report.folds.len(), 3);
    }

    #[test]
    fn test_leave_one_out_sizes() {
        let pts = line(7);
        let config = CvConfig::new(7, 2, 1.0, 0.1);
        let report = cross_validate(&config, &pts, None).unwrap();
        for f in &report.folds {
            assert_eq!(f.validation_len, 1);
            assert_eq!(f.training_len, 6);
        }
    }

    #[test]
    fn test_too_many_folds() {
        let err = evaluate(&CvConfig::new(11, 1, 2.0, 0.1), &line(10), None).unwrap_err();
        assert_eq!(err.kind(), "ConfigurationError");
    }

    #[test]
    fn test_zero_truth_aborts() {
        let mut pts = line(10);
        pts[3].value = 0.0;
        let err = evaluate(&CvConfig::new(2, 2, 2.0, 0.1), &pts, None).unwrap_err();
        assert_eq!(err.kind(), "DivisionByZeroError");
    }

    #[test]
    fn test_first_failing_fold_is_reported() {
        // Zero truths at 7 (fold 1) and 5 (fold 2); fold 1 must win every run
        let mut pts = line(12);
        pts[7].value = 0.0;
        pts[5].value = 0.0;
        for _ in 0..20 {
            let err = evaluate(&CvConfig::new(3, 2, 2.0, 0.1), &pts, None).unwrap_err();
            assert!(matches!(err, Error::DivisionByZero { ordinal: 7 }), "{err:?}");
        }
    }

    #[test]
    fn test_kdtree_matches_oracle() {
        let d0 = NaiveDate::from_ymd_opt(2009, 1, 1).unwrap();
        let pts: Vec<Point> = (0..120)
            .map(|i| {
                let x = ((i * 37) % 101) as f64 * 0.1;
                let y = ((i * 53) % 97) as f64 * 0.1;
                let date = d0 + chrono::Duration::days((i * 7 % 60) as i64);
                Point::new(format!("{i}"), x, y, date, 5.0 + (i % 13) as f64)
            })
            .collect();
        let config = CvConfig::new(10, 5, 2.5, 0.05);
        let a = cross_validate_with::<KdTree>(&config, &pts, None).unwrap();
        let b = cross_validate_with::<BruteForceIndex>(&config, &pts, None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_bagging_is_deterministic() {
        let pts = line(40);
        let config = CvConfig::new(5, 3, 2.0, 0.1).with_bagging(Bagging::new(3, 0.75, 99));
        let a = evaluate(&config, &pts, None).unwrap();
        let b = evaluate(&config, &pts, None).unwrap();
        assert_eq!(a.0.to_bits(), b.0.to_bits());
        assert_eq!(a.1.to_bits(), b.1.to_bits());
    }

    #[test]
    fn test_bagging_seed_matters() {
        let pts = line(40);
        let a = evaluate(
            &CvConfig::new(5, 3, 2.0, 0.1).with_bagging(Bagging::new(3, 0.5, 1)),
            &pts,
            None,
        )
        .unwrap();
        let b = evaluate(
            &CvConfig::new(5, 3, 2.0, 0.1).with_bagging(Bagging::new(3, 0.5, 2)),
            &pts,
            None,
        )
        .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_bags_rejected() {
        let pts = line(4);
        let config = CvConfig::new(2, 1, 2.0, 0.1).with_bagging(Bagging::new(2, 0.1, 0));
        let err = evaluate(&config, &pts, None).unwrap_err();
        assert_eq!(err.kind(), "ConfigurationError");
    }

    #[test]
    fn test_euclidean_filter_with_table() {
        let pts = line(20);
        let mut table = RadiusTable::new();
        table.insert(0.1, 1.5);
        let config = CvConfig::new(4, 5, 2.0, 0.1).with_filter(FilterPolicy::Euclidean);
        assert!(evaluate(&config, &pts, Some(&table)).is_ok());

        let missing = CvConfig::new(4, 5, 2.0, 0.2).with_filter(FilterPolicy::Euclidean);
        assert_eq!(
            evaluate(&missing, &pts, Some(&table)).unwrap_err().kind(),
            "ConfigurationError"
        );
    }

    #[test]
    fn test_time_violation_empties_neighbors() {
        // Every point on its own day, 30 days apart: with a 7-day limit
        // the first neighbor already breaks the time rule.
        let d0 = NaiveDate::from_ymd_opt(2009, 1, 1).unwrap();
        let pts: Vec<Point> = (0..6)
            .map(|i| Point::new("s", 0.0, 0.0, d0 + chrono::Duration::days(30 * i), 1.0 + i as f64))
            .collect();
        let config = CvConfig::new(2, 2, 2.0, 1.0).with_filter(FilterPolicy::distance_time());
        let err = evaluate(&config, &pts, None).unwrap_err();
        assert_eq!(err.kind(), "InsufficientNeighborsError");
    }

    #[test]
    fn test_input_is_not_mutated() {
        let pts = line(10);
        let before = pts.clone();
        evaluate(&CvConfig::new(2, 3, 2.0, 5.0), &pts, None).unwrap();
        assert_eq!(pts, before);
    }
}
