//! Error statistics for cross-validation
//!
//! - **MAE**: mean |estimate − truth|
//! - **MSE** / **RMSE**: mean squared error and its root
//! - **MARE**: mean |estimate − truth| / truth
//! - **RMSPE**: 100 · sqrt(mean ((estimate − truth) / truth)²)

use stkfold_core::{Error, Result};

/// Running sums over one validation set.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ErrorAccumulator {
    count: usize,
    abs: f64,
    sq: f64,
    abs_rel: f64,
    sq_rel: f64,
}

impl ErrorAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one (estimate, truth) pair. `ordinal` identifies the point in
    /// the error raised for a zero ground truth.
    pub fn push(&mut self, estimate: f64, truth: f64, ordinal: usize) -> Result<()> {
        if truth == 0.0 {
            return Err(Error::DivisionByZero { ordinal });
        }
        let err = estimate - truth;
        let rel = err / truth;
        self.count += 1;
        self.abs += err.abs();
        self.sq += err * err;
        self.abs_rel += err.abs() / truth;
        self.sq_rel += rel * rel;
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Summary over everything pushed so far. Fails when nothing was pushed.
    pub fn summary(&self) -> Result<ErrorSummary> {
        if self.count == 0 {
            return Err(Error::Configuration("empty validation set".into()));
        }
        let n = self.count as f64;
        let mse = self.sq / n;
        Ok(ErrorSummary {
            mae: self.abs / n,
            mse,
            rmse: mse.sqrt(),
            mare: self.abs_rel / n,
            rmspe: 100.0 * (self.sq_rel / n).sqrt(),
        })
    }
}

/// Error statistics for one validation set, or an average of several.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorSummary {
    pub mae: f64,
    pub mse: f64,
    pub rmse: f64,
    pub mare: f64,
    pub rmspe: f64,
}

impl ErrorSummary {
    /// Field-wise arithmetic mean, summed in slice order.
    ///
    /// Returns `None` for an empty slice.
    pub fn mean(summaries: &[ErrorSummary]) -> Option<ErrorSummary> {
        if summaries.is_empty() {
            return None;
        }
        let n = summaries.len() as f64;
        let mut acc = ErrorSummary {
            mae: 0.0,
            mse: 0.0,
            rmse: 0.0,
            mare: 0.0,
            rmspe: 0.0,
        };
        for s in summaries {
            acc.mae += s.mae;
            acc.mse += s.mse;
            acc.rmse += s.rmse;
            acc.mare += s.mare;
            acc.rmspe += s.rmspe;
        }
        acc.mae /= n;
        acc.mse /= n;
        acc.rmse /= n;
        acc.mare /= n;
        acc.rmspe /= n;
        Some(acc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_summary() {
        let mut acc = ErrorAccumulator::new();
        acc.push(11.0, 10.0, 0).unwrap();
        acc.push(18.0, 20.0, 1).unwrap();
        let s = acc.summary().unwrap();
        assert_eq!(acc.count(), 2);
        assert_relative_eq!(s.mae, 1.5);
        assert_relative_eq!(s.mse, 2.5);
        assert_relative_eq!(s.rmse, 2.5f64.sqrt());
        assert_relative_eq!(s.mare, (0.1 + 0.1) / 2.0, epsilon = 1e-15);
        assert_relative_eq!(s.rmspe, 100.0 * ((0.01 + 0.01) / 2.0f64).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_zero_truth() {
        let mut acc = ErrorAccumulator::new();
        let err = acc.push(1.0, 0.0, 17).unwrap_err();
        assert_eq!(err.kind(), "DivisionByZeroError");
        assert!(matches!(err, Error::DivisionByZero { ordinal: 17 }));
        assert_eq!(acc.count(), 0);
    }

    #[test]
    fn test_empty_summary() {
        assert!(ErrorAccumulator::new().summary().is_err());
    }

    #[test]
    fn test_perfect_estimates() {
        let mut acc = ErrorAccumulator::new();
        for v in [1.0, 2.0, 3.0] {
            acc.push(v, v, 0).unwrap();
        }
        let s = acc.summary().unwrap();
        assert_eq!(s.mare, 0.0);
        assert_eq!(s.rmspe, 0.0);
    }

    #[test]
    fn test_mean() {
        let a = ErrorSummary { mae: 1.0, mse: 2.0, rmse: 3.0, mare: 0.1, rmspe: 10.0 };
        let b = ErrorSummary { mae: 3.0, mse: 4.0, rmse: 5.0, mare: 0.3, rmspe: 30.0 };
        let m = ErrorSummary::mean(&[a, b]).unwrap();
        assert_relative_eq!(m.mae, 2.0);
        assert_relative_eq!(m.rmse, 4.0);
        assert_relative_eq!(m.mare, 0.2);
        assert_relative_eq!(m.rmspe, 20.0);
        assert!(ErrorSummary::mean(&[]).is_none());
    }
}
