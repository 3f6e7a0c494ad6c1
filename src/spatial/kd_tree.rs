use serde::{Deserialize, Serialize};

use crate::WorldPoint;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KDNode {
    pub point: WorldPoint,
    pub index: usize,
    pub axis: usize,
    pub left: Option<Box<KDNode>>,
    pub right: Option<Box<KDNode>>,
}

/// 3D k-d tree over catalog positions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KDTree {
    pub root: Option<Box<KDNode>>,
}

fn coord(p: &WorldPoint, axis: usize) -> f64 {
    match axis {
        0 => p.x,
        1 => p.y,
        _ => p.z,
    }
}

impl KDTree {
    pub fn build(points: &[WorldPoint]) -> Self {
        let mut indices: Vec<usize> = (0..points.len()).collect();
        let root = Self::build_recursive(points, &mut indices, 0);
        KDTree { root }
    }

    fn build_recursive(
        points: &[WorldPoint],
        idx: &mut [usize],
        depth: usize,
    ) -> Option<Box<KDNode>> {
        if idx.is_empty() {
            return None;
        }

        let axis = depth % 3;
        idx.sort_by(|&a, &b| coord(&points[a], axis).total_cmp(&coord(&points[b], axis)));
        let mid = idx.len() / 2;
        let median = idx[mid];

        let (lower, upper) = idx.split_at_mut(mid);
        Some(Box::new(KDNode {
            point: points[median],
            index: median,
            axis,
            left: Self::build_recursive(points, lower, depth + 1),
            right: Self::build_recursive(points, &mut upper[1..], depth + 1),
        }))
    }

    /// Closest point to `target` with its distance.
    pub fn nearest(&self, target: WorldPoint) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        Self::search_nearest(&self.root, target, &mut best);
        best.map(|(idx, d2)| (idx, d2.sqrt()))
    }

    fn search_nearest(node: &Option<Box<KDNode>>, target: WorldPoint, best: &mut Option<(usize, f64)>) {
        let Some(noderef) = node else {
            return;
        };
        let dist2 = noderef.point.distance_squared(target);
        if best.map_or(true, |(_, b)| dist2 < b) {
            *best = Some((noderef.index, dist2));
        }

        let delta = coord(&target, noderef.axis) - coord(&noderef.point, noderef.axis);
        let (first, second) = if delta < 0.0 {
            (&noderef.left, &noderef.right)
        } else {
            (&noderef.right, &noderef.left)
        };
        Self::search_nearest(first, target, best);
        if best.map_or(true, |(_, b)| delta * delta < b) {
            Self::search_nearest(second, target, best);
        }
    }
}
