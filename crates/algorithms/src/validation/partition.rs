//! Round-robin fold assignment

use stkfold_core::{Error, Result};

/// Assignment of point ordinals to folds: point `i` goes to fold `i mod k`.
///
/// A pure function of the point count and `k`, so a fixed input order
/// always yields the same folds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldPartition {
    folds: Vec<Vec<usize>>,
    len: usize,
}

impl FoldPartition {
    /// Partition `len` ordinals into `k` folds.
    ///
    /// Fails with an invalid argument for `k == 0` and a configuration
    /// error when `k > len` (some fold would be empty).
    pub fn round_robin(len: usize, k: usize) -> Result<Self> {
        if k == 0 {
            return Err(Error::invalid("folds", k, "must be positive"));
        }
        if k > len {
            return Err(Error::Configuration(format!(
                "fold count {k} exceeds point count {len}"
            )));
        }

        let mut folds = vec![Vec::with_capacity(len / k + 1); k];
        for i in 0..len {
            folds[i % k].push(i);
        }
        Ok(Self { folds, len })
    }

    /// Number of folds (k).
    pub fn fold_count(&self) -> usize {
        self.folds.len()
    }

    /// Number of partitioned ordinals.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Fold that holds ordinal `i`.
    pub fn fold_of(&self, i: usize) -> usize {
        i % self.folds.len()
    }

    /// Ordinals held out in `fold`, ascending.
    pub fn validation(&self, fold: usize) -> &[usize] {
        &self.folds[fold]
    }

    /// Ordinals of every other fold, concatenated in fold order.
    pub fn training(&self, fold: usize) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.len - self.folds[fold].len());
        for (j, members) in self.folds.iter().enumerate() {
            if j != fold {
                out.extend_from_slice(members);
            }
        }
        out
    }
}
