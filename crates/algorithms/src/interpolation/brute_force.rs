//! Exhaustive nearest-neighbor search
//!
//! Scores every point on every query. Used as the correctness oracle
//! for [`KdTree`](super::KdTree), never on the evaluation path.

use stkfold_core::{Error, Result, ScaledPoint};

use super::{check_coordinates, check_k, neighbor_order, Neighbor, NeighborIndex};

#[derive(Debug, Clone)]
pub struct BruteForceIndex {
    points: Vec<ScaledPoint>,
}

impl NeighborIndex for BruteForceIndex {
    fn build(points: &[ScaledPoint]) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::EmptyInput);
        }
        check_coordinates(points)?;
        Ok(Self {
            points: points.to_vec(),
        })
    }

    fn k_nearest(&self, target: &ScaledPoint, k: usize) -> Result<Vec<Neighbor>> {
        check_k(k)?;

        let mut scored: Vec<(f64, usize)> = self
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| (target.dist_sq(p), i))
            .collect();
        scored.sort_by(|a, b| neighbor_order(*a, *b));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(dist_sq, idx)| Neighbor {
                point: self.points[idx],
                distance: dist_sq.sqrt(),
                index: idx,
            })
            .collect())
    }

    fn len(&self) -> usize {
        self.points.len()
    }
}
