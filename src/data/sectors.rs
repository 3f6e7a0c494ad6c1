//! Named sectors derived from star density on the galactic plane.

use serde::Serialize;

use crate::projection::camera::WorldBounds;
use crate::{Segment, WorldPoint};

pub const SECTOR_GRID: usize = 100;
/// Regions with this many cells or fewer are noise, not sectors.
pub const MIN_SECTOR_CELLS: usize = 20;

const SECTOR_NAMES: [&str; 6] = [
    "Alpha Sector",
    "Beta Sector",
    "Gamma Sector",
    "Delta Sector",
    "Epsilon Sector",
    "Zeta Sector",
];
const SECTOR_COLORS: [u32; 6] = [0x00ffff, 0xff6600, 0x00ff66, 0xff0066, 0x6600ff, 0xffff00];

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Sector {
    pub name: String,
    pub color: u32,
    /// Grid cells as `(column, row)` along x and z.
    pub cells: Vec<(usize, usize)>,
    pub centroid: WorldPoint,
    pub boundary: Vec<Segment>,
}

struct DensityGrid {
    counts: Vec<u32>,
    bounds: WorldBounds,
    cell_w: f64,
    cell_d: f64,
}

impl DensityGrid {
    fn new<I: IntoIterator<Item = WorldPoint>>(stars: I, bounds: WorldBounds) -> Self {
        let cell_w = bounds.width() / SECTOR_GRID as f64;
        let cell_d = bounds.depth() / SECTOR_GRID as f64;
        let mut counts = vec![0u32; SECTOR_GRID * SECTOR_GRID];
        if cell_w > 0.0 && cell_d > 0.0 {
            for p in stars {
                let cx = ((p.x - bounds.min_x) / cell_w).floor();
                let cz = ((p.z - bounds.min_z) / cell_d).floor();
                if (0.0..SECTOR_GRID as f64).contains(&cx) && (0.0..SECTOR_GRID as f64).contains(&cz) {
                    counts[cx as usize * SECTOR_GRID + cz as usize] += 1;
                }
            }
        }
        DensityGrid {
            counts,
            bounds,
            cell_w,
            cell_d,
        }
    }

    fn populated(&self, i: usize, j: usize) -> bool {
        self.counts[i * SECTOR_GRID + j] > 0
    }

    fn corner(&self, i: usize, j: usize) -> WorldPoint {
        WorldPoint::new(
            self.bounds.min_x + i as f64 * self.cell_w,
            0.0,
            self.bounds.min_z + j as f64 * self.cell_d,
        )
    }

    /// 4-connected populated region containing `(i, j)`.
    fn flood(&self, start: (usize, usize), visited: &mut [bool]) -> Vec<(usize, usize)> {
        let mut cells = Vec::new();
        let mut stack = vec![start];
        while let Some((i, j)) = stack.pop() {
            let k = i * SECTOR_GRID + j;
            if visited[k] || !self.populated(i, j) {
                continue;
            }
            visited[k] = true;
            cells.push((i, j));
            if i + 1 < SECTOR_GRID {
                stack.push((i + 1, j));
            }
            if i > 0 {
                stack.push((i - 1, j));
            }
            if j + 1 < SECTOR_GRID {
                stack.push((i, j + 1));
            }
            if j > 0 {
                stack.push((i, j - 1));
            }
        }
        cells
    }

    fn outline(&self, cells: &[(usize, usize)]) -> Vec<Segment> {
        let mut edges = Vec::new();
        for &(i, j) in cells {
            let (x1z1, x2z1) = (self.corner(i, j), self.corner(i + 1, j));
            let (x1z2, x2z2) = (self.corner(i, j + 1), self.corner(i + 1, j + 1));
            if i == 0 || !self.populated(i - 1, j) {
                edges.push(Segment { from: x1z1, to: x1z2 });
            }
            if i + 1 == SECTOR_GRID || !self.populated(i + 1, j) {
                edges.push(Segment { from: x2z1, to: x2z2 });
            }
            if j == 0 || !self.populated(i, j - 1) {
                edges.push(Segment { from: x1z1, to: x2z1 });
            }
            if j + 1 == SECTOR_GRID || !self.populated(i, j + 1) {
                edges.push(Segment { from: x1z2, to: x2z2 });
            }
        }
        edges
    }
}

/// Groups stars into sectors: a density grid over `bounds`, flood-filled into
/// connected regions, keeping regions larger than [`MIN_SECTOR_CELLS`].
/// Names and colours cycle in discovery order.
pub fn build_sectors<I: IntoIterator<Item = WorldPoint>>(stars: I, bounds: WorldBounds) -> Vec<Sector> {
    let grid = DensityGrid::new(stars, bounds);
    let mut visited = vec![false; SECTOR_GRID * SECTOR_GRID];
    let mut sectors = Vec::new();

    for i in 0..SECTOR_GRID {
        for j in 0..SECTOR_GRID {
            if visited[i * SECTOR_GRID + j] || !grid.populated(i, j) {
                continue;
            }
            let cells = grid.flood((i, j), &mut visited);
            if cells.len() <= MIN_SECTOR_CELLS {
                continue;
            }
            let n = cells.len() as f64;
            let (sx, sz) = cells.iter().fold((0.0, 0.0), |(sx, sz), &(ci, cj)| {
                let c = grid.corner(ci, cj);
                (sx + c.x + grid.cell_w / 2.0, sz + c.z + grid.cell_d / 2.0)
            });
            let k = sectors.len();
            sectors.push(Sector {
                name: SECTOR_NAMES[k % SECTOR_NAMES.len()].to_owned(),
                color: SECTOR_COLORS[k % SECTOR_COLORS.len()],
                boundary: grid.outline(&cells),
                centroid: WorldPoint::new(sx / n, 0.0, sz / n),
                cells,
            });
        }
    }
    sectors
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    const BOUNDS: WorldBounds = WorldBounds {
        min_x: 0.0,
        max_x: 1000.0,
        min_z: 0.0,
        max_z: 1000.0,
    };

    /// One star in the middle of each cell of a `w` x `h` block at `(i0, j0)`.
    fn block(i0: usize, j0: usize, w: usize, h: usize) -> Vec<WorldPoint> {
        let mut out = Vec::new();
        for i in i0..i0 + w {
            for j in j0..j0 + h {
                out.push(WorldPoint::new(i as f64 * 10.0 + 5.0, 0.0, j as f64 * 10.0 + 5.0));
            }
        }
        out
    }

    #[test]
    fn small_clusters_are_dropped() {
        let stars = block(10, 10, 4, 5); // 20 cells
        assert!(build_sectors(stars, BOUNDS).is_empty());
    }

    #[test]
    fn separate_regions_get_cycled_names() {
        let mut stars = block(0, 0, 5, 5);
        stars.extend(block(50, 50, 3, 8));
        let sectors = build_sectors(stars, BOUNDS);
        assert_eq!(sectors.len(), 2);
        assert_eq!(sectors[0].name, "Alpha Sector");
        assert_eq!(sectors[1].name, "Beta Sector");
        assert_eq!(sectors[1].color, 0xff6600);
        assert_eq!(sectors[0].cells.len(), 25);
        assert_approx_eq!(sectors[0].centroid.x, 25.0, 1e-9);
        assert_approx_eq!(sectors[0].centroid.z, 25.0, 1e-9);
        // a 5x5 square has 20 outer edges
        assert_eq!(sectors[0].boundary.len(), 20);
    }

    #[test]
    fn stars_outside_bounds_are_ignored() {
        let stars = block(0, 0, 5, 5)
            .into_iter()
            .map(|p| WorldPoint::new(p.x - 2000.0, 0.0, p.z));
        assert!(build_sectors(stars, BOUNDS).is_empty());
    }
}
