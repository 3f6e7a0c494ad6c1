use crate::projection::camera::WorldBounds;
use crate::{Segment, WorldPoint};

/// Distance of the compass labels outside the galaxy edge.
pub const CARDINAL_MARGIN: f64 = 2_000.0;
const CARDINAL_HEIGHT: f64 = 500.0;

/// Lines every `step` units across `bounds`, starting at its minimum corner.
/// Vertical lines (constant x) first, then horizontal ones.
pub fn grid_lines(bounds: &WorldBounds, step: f64) -> Vec<Segment> {
    if step.is_nan() || step <= 0.0 {
        return Vec::new();
    }
    let mut lines = Vec::new();
    let mut x = bounds.min_x;
    while x <= bounds.max_x {
        lines.push(Segment {
            from: WorldPoint::new(x, 0.0, bounds.min_z),
            to: WorldPoint::new(x, 0.0, bounds.max_z),
        });
        x += step;
    }
    let mut z = bounds.min_z;
    while z <= bounds.max_z {
        lines.push(Segment {
            from: WorldPoint::new(bounds.min_x, 0.0, z),
            to: WorldPoint::new(bounds.max_x, 0.0, z),
        });
        z += step;
    }
    lines
}

/// N, S, E and W placed just outside `bounds`. North is toward `-z`.
pub fn cardinal_labels(bounds: &WorldBounds) -> Vec<(&'static str, WorldPoint)> {
    let c = bounds.center();
    vec![
        ("N", WorldPoint::new(c.x, CARDINAL_HEIGHT, bounds.min_z - CARDINAL_MARGIN)),
        ("S", WorldPoint::new(c.x, CARDINAL_HEIGHT, bounds.max_z + CARDINAL_MARGIN)),
        ("E", WorldPoint::new(bounds.max_x + CARDINAL_MARGIN, CARDINAL_HEIGHT, c.z)),
        ("W", WorldPoint::new(bounds.min_x - CARDINAL_MARGIN, CARDINAL_HEIGHT, c.z)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::camera::GALAXY_BOUNDS;

    #[test]
    fn galaxy_grid_line_count() {
        let lines = grid_lines(&GALAXY_BOUNDS, 2_000.0);
        // 48074.7 wide -> 25 columns, 41889.9 deep -> 21 rows
        assert_eq!(lines.len(), 25 + 21);
        assert_eq!(lines[0].from.x, GALAXY_BOUNDS.min_x);
        assert!(grid_lines(&GALAXY_BOUNDS, 0.0).is_empty());
    }

    #[test]
    fn north_is_beyond_min_z() {
        let labels = cardinal_labels(&GALAXY_BOUNDS);
        let (name, north) = labels[0];
        assert_eq!(name, "N");
        assert_eq!(north.z, GALAXY_BOUNDS.min_z - CARDINAL_MARGIN);
    }
}
