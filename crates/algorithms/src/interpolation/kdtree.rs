//! 3D k-d tree over (x, y, scaled time)
//!
//! Provides O(log n) k-nearest-neighbor queries for time-scaled point
//! data. Built once per fold from the training set and only read after
//! that.
//!
//! Reference:
//! Bentley, J.L. (1975). Multidimensional binary search trees used
//! for associative searching. CACM, 18(9).

use stkfold_core::{Error, Result, ScaledPoint};

use super::{check_coordinates, check_k, neighbor_order, Neighbor, NeighborIndex};

const DIMS: usize = 3;

/// A 3D k-d tree with median splits.
#[derive(Debug)]
pub struct KdTree {
    nodes: Vec<KdNode>,
    /// Points in input order
    points: Vec<ScaledPoint>,
}

#[derive(Debug)]
struct KdNode {
    /// Index into `points`
    point_idx: usize,
    /// Split dimension: 0 = x, 1 = y, 2 = t
    split_dim: u8,
    /// Left child index (None = leaf)
    left: Option<usize>,
    /// Right child index (None = leaf)
    right: Option<usize>,
}

impl KdTree {
    /// Build a k-d tree from time-scaled points.
    ///
    /// Construction is O(n log² n) using median-of-coordinate splitting,
    /// cycling x → y → t with depth. Fails on an empty slice.
    pub fn build(points: &[ScaledPoint]) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::EmptyInput);
        }
        check_coordinates(points)?;

        let mut indices: Vec<usize> = (0..points.len()).collect();
        let mut nodes = Vec::with_capacity(points.len());
        build_recursive(points, &mut indices, 0, &mut nodes);

        Ok(Self {
            nodes,
            points: points.to_vec(),
        })
    }

    /// Number of points in the tree.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the tree is empty. Always false for a built tree.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Depth of the deepest leaf (root = 1).
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[KdNode], idx: usize) -> usize {
            let node = &nodes[idx];
            let l = node.left.map_or(0, |c| walk(nodes, c));
            let r = node.right.map_or(0, |c| walk(nodes, c));
            1 + l.max(r)
        }
        walk(&self.nodes, 0)
    }

    /// Find the k nearest points to `target`.
    ///
    /// Returns `min(k, len)` results ascending by distance; equal
    /// distances keep input order. Fails if `k == 0`.
    pub fn k_nearest(&self, target: &ScaledPoint, k: usize) -> Result<Vec<Neighbor>> {
        check_k(k)?;

        // Ascending by (distance², index); the last entry is the current worst.
        let mut best: Vec<(f64, usize)> = Vec::with_capacity(k + 1);
        self.knn_recursive(0, target, k, &mut best);

        Ok(best
            .into_iter()
            .map(|(dist_sq, idx)| Neighbor {
                point: self.points[idx],
                distance: dist_sq.sqrt(),
                index: idx,
            })
            .collect())
    }

    fn knn_recursive(
        &self,
        node_idx: usize,
        target: &ScaledPoint,
        k: usize,
        best: &mut Vec<(f64, usize)>,
    ) {
        let node = &self.nodes[node_idx];
        let p = &self.points[node.point_idx];
        let candidate = (target.dist_sq(p), node.point_idx);

        let full = best.len() >= k;
        let beats_worst = best
            .last()
            .map_or(true, |&worst| neighbor_order(candidate, worst).is_lt());

        if !full || beats_worst {
            let pos = best
                .binary_search_by(|entry| neighbor_order(*entry, candidate))
                .unwrap_or_else(|e| e);
            best.insert(pos, candidate);
            if best.len() > k {
                best.pop();
            }
        }

        let axis = node.split_dim as usize;
        let diff = target.coord(axis) - p.coord(axis);
        let (first, second) = if diff < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        if let Some(child) = first {
            self.knn_recursive(child, target, k, best);
        }

        // `<=` so points tied with the current worst can still win on index
        let threshold = if best.len() >= k {
            best[best.len() - 1].0
        } else {
            f64::INFINITY
        };

        if diff * diff <= threshold {
            if let Some(child) = second {
                self.knn_recursive(child, target, k, best);
            }
        }
    }
}

impl NeighborIndex for KdTree {
    fn build(points: &[ScaledPoint]) -> Result<Self> {
        KdTree::build(points)
    }

    fn k_nearest(&self, target: &ScaledPoint, k: usize) -> Result<Vec<Neighbor>> {
        KdTree::k_nearest(self, target, k)
    }

    fn len(&self) -> usize {
        self.points.len()
    }
}

/// Recursively build the k-d tree.
///
/// Points equal to the median on the split axis may land on either
/// side; queries descend into both sides whenever the splitting plane
/// is not farther than the current worst candidate, so this does not
/// affect results.
fn build_recursive(
    points: &[ScaledPoint],
    indices: &mut [usize],
    depth: usize,
    nodes: &mut Vec<KdNode>,
) -> usize {
    let n = indices.len();
    let split_dim = depth % DIMS;

    indices.sort_by(|&a, &b| {
        points[a]
            .coord(split_dim)
            .total_cmp(&points[b].coord(split_dim))
            .then(a.cmp(&b))
    });

    let median = n / 2;
    let point_idx = indices[median];

    let node_idx = nodes.len();
    nodes.push(KdNode {
        point_idx,
        split_dim: split_dim as u8,
        left: None,
        right: None,
    });

    let (left, rest) = indices.split_at_mut(median);
    let right = &mut rest[1..];

    if !left.is_empty() {
        let left_idx = build_recursive(points, left, depth + 1, nodes);
        nodes[node_idx].left = Some(left_idx);
    }

    if !right.is_empty() {
        let right_idx = build_recursive(points, right, depth + 1, nodes);
        nodes[node_idx].right = Some(right_idx);
    }

    node_idx
}
