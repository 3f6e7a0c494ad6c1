//! Planar camera: an affine map from the galactic x/z plane to the viewport.

use serde::{Deserialize, Serialize};

use crate::config::AnimationConfig;
use crate::projection::CameraRig;
use crate::{ScreenPoint, Viewport, WorldPoint};

pub const MIN_ZOOM: f64 = 0.005;
pub const MAX_ZOOM: f64 = 12.0;

/// Smallest world extent used when fitting, so a single-point region still
/// yields a finite zoom.
const MIN_FIT_EXTENT: f64 = 1e-6;

/// Floor for a fitted zoom when the padding leaves no room on screen.
const MIN_FIT_ZOOM: f64 = 1e-6;

/// Extent of the known galaxy on the x/z plane.
pub const GALAXY_BOUNDS: WorldBounds = WorldBounds {
    min_x: 2001.5400390625,
    max_x: 50076.23828125,
    min_z: 5409.990234375,
    max_z: 47299.921875,
};

/// Axis-aligned rectangle on the galactic plane.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorldBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_z: f64,
    pub max_z: f64,
}

impl WorldBounds {
    /// Bounds enclosing every point, or `None` for an empty iterator.
    pub fn from_points<I: IntoIterator<Item = WorldPoint>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut b = WorldBounds {
            min_x: first.x,
            max_x: first.x,
            min_z: first.z,
            max_z: first.z,
        };
        for p in iter {
            b.min_x = b.min_x.min(p.x);
            b.max_x = b.max_x.max(p.x);
            b.min_z = b.min_z.min(p.z);
            b.max_z = b.max_z.max(p.z);
        }
        Some(b)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn depth(&self) -> f64 {
        self.max_z - self.min_z
    }

    pub fn center(&self) -> WorldPoint {
        WorldPoint::new(
            (self.min_x + self.max_x) / 2.0,
            0.0,
            (self.min_z + self.max_z) / 2.0,
        )
    }
}

/// Zoom and pan of the 2D map. The offset is the world position shown at the
/// viewport centre, with the depth axis already negated.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlanarCamera {
    pub zoom: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for PlanarCamera {
    fn default() -> Self {
        PlanarCamera {
            zoom: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

pub fn clamp_zoom(zoom: f64) -> f64 {
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

pub fn world_to_screen(p: WorldPoint, camera: &PlanarCamera, viewport: Viewport) -> ScreenPoint {
    ScreenPoint::new(
        (p.x - camera.offset_x) * camera.zoom + viewport.width / 2.0,
        (-p.z - camera.offset_y) * camera.zoom + viewport.height / 2.0,
    )
}

/// Inverse of [`world_to_screen`]; the returned point lies on `y = 0`.
pub fn screen_to_world(s: ScreenPoint, camera: &PlanarCamera, viewport: Viewport) -> WorldPoint {
    WorldPoint::new(
        (s.x - viewport.width / 2.0) / camera.zoom + camera.offset_x,
        0.0,
        -((s.y - viewport.height / 2.0) / camera.zoom + camera.offset_y),
    )
}

/// Applies `factor` to the zoom, clamps, then shifts the offset so the world
/// point under `at` stays there.
pub fn zoom_at_screen_point(
    factor: f64,
    at: ScreenPoint,
    camera: &PlanarCamera,
    viewport: Viewport,
) -> PlanarCamera {
    let before = screen_to_world(at, camera, viewport);
    let mut next = PlanarCamera {
        zoom: clamp_zoom(camera.zoom * factor),
        ..*camera
    };
    let after = screen_to_world(at, &next, viewport);
    next.offset_x += before.x - after.x;
    next.offset_y += after.z - before.z;
    next
}

/// Largest zoom that fits `bounds` inside the padded viewport, centred on the
/// bounds. Only `MAX_ZOOM` applies: an oversized region may go below `MIN_ZOOM`.
pub fn fit_bounds(bounds: &WorldBounds, viewport: Viewport, padding: f64) -> PlanarCamera {
    let world_width = bounds.width().max(MIN_FIT_EXTENT);
    let world_depth = bounds.depth().max(MIN_FIT_EXTENT);
    let zx = (viewport.width - padding * 2.0) / world_width;
    let zy = (viewport.height - padding * 2.0) / world_depth;
    let needed = zx.min(zy).max(MIN_FIT_ZOOM);

    let center = bounds.center();
    PlanarCamera {
        zoom: needed.min(MAX_ZOOM),
        offset_x: center.x,
        offset_y: -center.z,
    }
}

impl CameraRig for PlanarCamera {
    fn project(&self, p: WorldPoint, viewport: Viewport) -> Option<ScreenPoint> {
        Some(world_to_screen(p, self, viewport))
    }

    fn unproject(&self, s: ScreenPoint, viewport: Viewport) -> Option<WorldPoint> {
        Some(screen_to_world(s, self, viewport))
    }

    fn panned_from(&self, anchor: &Self, dx: f64, dy: f64, _viewport: Viewport) -> Self {
        PlanarCamera {
            zoom: self.zoom,
            offset_x: anchor.offset_x - dx / self.zoom,
            offset_y: anchor.offset_y - dy / self.zoom,
        }
    }

    fn zoomed_at(&self, factor: f64, at: ScreenPoint, viewport: Viewport) -> Self {
        zoom_at_screen_point(factor, at, self, viewport)
    }

    fn home(_galaxy: &WorldBounds) -> Self {
        PlanarCamera::default()
    }

    fn fit(bounds: &WorldBounds, viewport: Viewport, padding: f64) -> Self {
        fit_bounds(bounds, viewport, padding)
    }

    fn fit_galaxy(galaxy: &WorldBounds, viewport: Viewport, padding: f64) -> Self {
        fit_bounds(galaxy, viewport, padding)
    }

    fn overview(bounds: &WorldBounds, viewport: Viewport, padding: f64) -> Self {
        fit_bounds(bounds, viewport, padding)
    }

    fn centered_on(&self, point: WorldPoint) -> Self {
        PlanarCamera {
            zoom: self.zoom,
            offset_x: point.x,
            offset_y: -point.z,
        }
    }

    fn focused_on(&self, point: WorldPoint) -> Self {
        self.centered_on(point)
    }

    fn follow(&self, marker: WorldPoint, _direction: WorldPoint) -> Self {
        self.centered_on(marker)
    }

    fn lerp(&self, other: &Self, t: f64) -> Self {
        PlanarCamera {
            zoom: self.zoom + (other.zoom - self.zoom) * t,
            offset_x: self.offset_x + (other.offset_x - self.offset_x) * t,
            offset_y: self.offset_y + (other.offset_y - self.offset_y) * t,
        }
    }

    fn animation_duration_ms(config: &AnimationConfig) -> f64 {
        config.planar_duration_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    const VIEW: Viewport = Viewport::new(800.0, 500.0);

    fn cameras() -> Vec<PlanarCamera> {
        let mut out = Vec::new();
        for &zoom in &[MIN_ZOOM, 0.01, 0.37, 1.0, 4.5, MAX_ZOOM] {
            for &(ox, oy) in &[(0.0, 0.0), (26000.0, -24000.0), (-513.25, 999.5)] {
                out.push(PlanarCamera {
                    zoom,
                    offset_x: ox,
                    offset_y: oy,
                });
            }
        }
        out
    }

    #[test]
    fn screen_world_round_trip() {
        for cam in cameras() {
            for &(sx, sy) in &[(0.0, 0.0), (400.0, 250.0), (799.0, 12.5), (125.0, 499.0)] {
                let s = ScreenPoint::new(sx, sy);
                let back = world_to_screen(screen_to_world(s, &cam, VIEW), &cam, VIEW);
                assert_approx_eq!(back.x, s.x, 1e-6);
                assert_approx_eq!(back.y, s.y, 1e-6);
            }
        }
    }

    #[test]
    fn depth_axis_points_up() {
        let cam = PlanarCamera::default();
        let near = world_to_screen(WorldPoint::new(0.0, 0.0, 0.0), &cam, VIEW);
        let far = world_to_screen(WorldPoint::new(0.0, 0.0, 10.0), &cam, VIEW);
        assert!(far.y < near.y);
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        for cam in cameras() {
            for &factor in &[0.5, 0.9, 1.1, 3.0] {
                let at = ScreenPoint::new(613.0, 91.0);
                let before = screen_to_world(at, &cam, VIEW);
                let next = zoom_at_screen_point(factor, at, &cam, VIEW);
                let after = screen_to_world(at, &next, VIEW);
                assert_approx_eq!(before.x, after.x, 1e-6);
                assert_approx_eq!(before.z, after.z, 1e-6);
            }
        }
    }

    #[test]
    fn repeated_zoom_saturates_at_limits() {
        let at = ScreenPoint::new(10.0, 10.0);
        let mut cam = PlanarCamera::default();
        for _ in 0..500 {
            cam = zoom_at_screen_point(0.9, at, &cam, VIEW);
            assert!(cam.zoom >= MIN_ZOOM);
        }
        assert_eq!(cam.zoom, MIN_ZOOM);
        for _ in 0..500 {
            cam = zoom_at_screen_point(1.1, at, &cam, VIEW);
            assert!(cam.zoom <= MAX_ZOOM);
        }
        assert_eq!(cam.zoom, MAX_ZOOM);
    }

    #[test]
    fn fit_centres_bounds_and_caps_zoom() {
        let tiny = WorldBounds {
            min_x: 10.0,
            max_x: 10.0,
            min_z: 20.0,
            max_z: 20.0,
        };
        let cam = fit_bounds(&tiny, VIEW, 40.0);
        assert_eq!(cam.zoom, MAX_ZOOM);
        let centre = world_to_screen(WorldPoint::new(10.0, 0.0, 20.0), &cam, VIEW);
        assert_approx_eq!(centre.x, 400.0, 1e-9);
        assert_approx_eq!(centre.y, 250.0, 1e-9);
    }

    #[test]
    fn fit_may_go_below_min_zoom_for_huge_regions() {
        let huge = WorldBounds {
            min_x: 0.0,
            max_x: 1.0e7,
            min_z: 0.0,
            max_z: 1.0e7,
        };
        let cam = fit_bounds(&huge, VIEW, 40.0);
        assert!(cam.zoom < MIN_ZOOM);
        let corner = world_to_screen(WorldPoint::new(0.0, 0.0, 0.0), &cam, VIEW);
        assert!(corner.x >= 40.0 - 1e-9 && corner.y <= 460.0 + 1e-9);
    }

    #[test]
    fn bounds_from_points() {
        let b = WorldBounds::from_points(vec![
            WorldPoint::new(1.0, 5.0, -2.0),
            WorldPoint::new(-3.0, 0.0, 4.0),
        ])
        .expect("bounds");
        assert_eq!((b.min_x, b.max_x, b.min_z, b.max_z), (-3.0, 1.0, -2.0, 4.0));
        assert!(WorldBounds::from_points(Vec::new()).is_none());
    }

    #[test]
    fn fit_keeps_a_positive_zoom_when_padding_fills_the_view() {
        let b = WorldBounds {
            min_x: 0.0,
            max_x: 100.0,
            min_z: 0.0,
            max_z: 100.0,
        };
        let cam = fit_bounds(&b, Viewport::new(60.0, 60.0), 40.0);
        assert_eq!(cam.zoom, MIN_FIT_ZOOM);
    }
}
