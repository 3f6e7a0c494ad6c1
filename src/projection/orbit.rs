//! Perspective camera orbiting a target point, used by the 3D scene.

use glam::{DMat4, DVec3};
use serde::{Deserialize, Serialize};

use crate::config::AnimationConfig;
use crate::projection::camera::WorldBounds;
use crate::projection::CameraRig;
use crate::{ScreenPoint, Viewport, WorldPoint};

pub const MIN_DISTANCE: f64 = 1_000.0;
pub const MAX_DISTANCE: f64 = 100_000.0;
pub const NEAR_PLANE: f64 = 100.0;
pub const FAR_PLANE: f64 = 1_000_000.0;
pub const DEFAULT_FOV_Y_DEG: f64 = 60.0;

/// Span used when a route has no extent on the plane.
const FALLBACK_SIZE: f64 = 5_000.0;
const FOLLOW_BEHIND: f64 = 1_200.0;
const FOLLOW_ABOVE: f64 = 1_400.0;
const FOCUS_DISTANCE: f64 = 3_000.0;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct OrbitCamera {
    pub position: WorldPoint,
    pub target: WorldPoint,
    pub fov_y_deg: f64,
}

impl OrbitCamera {
    pub fn new(position: WorldPoint, target: WorldPoint) -> Self {
        OrbitCamera {
            position,
            target,
            fov_y_deg: DEFAULT_FOV_Y_DEG,
        }
    }

    pub fn distance(&self) -> f64 {
        self.position.distance(self.target)
    }

    /// World to camera space. Looking straight down the y axis, screen up
    /// points to -z.
    pub fn view(&self) -> DMat4 {
        let forward = self.target - self.position;
        let up = if forward.cross(DVec3::Y).length_squared() > f64::EPSILON {
            DVec3::Y
        } else {
            DVec3::NEG_Z
        };
        DMat4::look_at_rh(self.position, self.target, up)
    }

    pub fn projection(&self, viewport: Viewport) -> DMat4 {
        DMat4::perspective_rh(self.fov_y_deg.to_radians(), viewport.aspect(), NEAR_PLANE, FAR_PLANE)
    }

    /// Focal length in units of half the viewport height.
    fn focal(&self) -> f64 {
        1.0 / (self.fov_y_deg.to_radians() / 2.0).tan()
    }

    /// Camera placed above and in front of `center` so a region of `size`
    /// fits, with `k` scaling the viewing distance.
    fn framing(center: WorldPoint, size: f64, k: f64, up: f64, back: f64) -> Self {
        let distance = size * k;
        OrbitCamera::new(
            WorldPoint::new(center.x, distance * up, center.z + distance * back),
            WorldPoint::new(center.x, 0.0, center.z),
        )
    }

    fn region_size(bounds: &WorldBounds) -> f64 {
        let size = bounds.width().max(bounds.depth());
        if size > 0.0 {
            size
        } else {
            FALLBACK_SIZE
        }
    }
}

impl CameraRig for OrbitCamera {
    fn project(&self, p: WorldPoint, viewport: Viewport) -> Option<ScreenPoint> {
        let eye = self.view().transform_point3(p);
        // camera space looks down -z
        if -eye.z <= NEAR_PLANE {
            return None;
        }
        let ndc = self.projection(viewport).project_point3(eye);
        Some(ScreenPoint::new(
            (ndc.x + 1.0) * viewport.width / 2.0,
            (1.0 - ndc.y) * viewport.height / 2.0,
        ))
    }

    fn unproject(&self, s: ScreenPoint, viewport: Viewport) -> Option<WorldPoint> {
        let ndc_x = 2.0 * s.x / viewport.width - 1.0;
        let ndc_y = 1.0 - 2.0 * s.y / viewport.height;
        let inverse = (self.projection(viewport) * self.view()).inverse();
        let near = inverse.project_point3(DVec3::new(ndc_x, ndc_y, 0.0));
        let far = inverse.project_point3(DVec3::new(ndc_x, ndc_y, 1.0));
        let ray = (far - near).normalize_or_zero();
        if ray.y.abs() < f64::EPSILON {
            return None;
        }
        let t = -self.position.y / ray.y;
        if t <= 0.0 {
            return None;
        }
        Some(self.position + ray * t)
    }

    fn panned_from(&self, anchor: &Self, dx: f64, dy: f64, viewport: Viewport) -> Self {
        let view = anchor.view();
        let right = view.row(0).truncate();
        let up = view.row(1).truncate();
        let units_per_px = 2.0 * anchor.distance() / (viewport.height * anchor.focal());
        let shift = right * (-dx * units_per_px) + up * (dy * units_per_px);
        OrbitCamera {
            position: anchor.position + shift,
            target: anchor.target + shift,
            fov_y_deg: self.fov_y_deg,
        }
    }

    fn zoomed_at(&self, factor: f64, at: ScreenPoint, viewport: Viewport) -> Self {
        if factor <= 0.0 {
            return *self;
        }
        let old = self.distance();
        if old <= 0.0 {
            return *self;
        }
        let new = (old / factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
        let ratio = new / old;
        let target = match self.unproject(at, viewport) {
            Some(hit) => self.target + (hit - self.target) * (1.0 - ratio),
            None => self.target,
        };
        OrbitCamera {
            position: target + (self.position - self.target) * ratio,
            target,
            fov_y_deg: self.fov_y_deg,
        }
    }

    fn home(galaxy: &WorldBounds) -> Self {
        let c = galaxy.center();
        OrbitCamera::new(
            WorldPoint::new(c.x, 25_000.0, c.z + 20_000.0),
            WorldPoint::new(c.x, 0.0, c.z),
        )
    }

    fn fit(bounds: &WorldBounds, _viewport: Viewport, _padding: f64) -> Self {
        OrbitCamera::framing(bounds.center(), Self::region_size(bounds), 1.5, 0.8, 0.6)
    }

    fn fit_galaxy(galaxy: &WorldBounds, _viewport: Viewport, _padding: f64) -> Self {
        OrbitCamera::framing(galaxy.center(), Self::region_size(galaxy), 1.0, 0.6, 0.4)
    }

    fn overview(bounds: &WorldBounds, _viewport: Viewport, _padding: f64) -> Self {
        OrbitCamera::framing(bounds.center(), Self::region_size(bounds), 1.8, 0.9, 0.7)
    }

    fn centered_on(&self, point: WorldPoint) -> Self {
        let shift = point - self.target;
        OrbitCamera {
            position: self.position + shift,
            target: point,
            fov_y_deg: self.fov_y_deg,
        }
    }

    fn focused_on(&self, point: WorldPoint) -> Self {
        OrbitCamera {
            position: point + DVec3::new(0.0, FOCUS_DISTANCE * 0.6, FOCUS_DISTANCE * 0.8),
            target: point,
            fov_y_deg: self.fov_y_deg,
        }
    }

    fn follow(&self, marker: WorldPoint, direction: WorldPoint) -> Self {
        let offset = direction.normalize_or_zero() * -FOLLOW_BEHIND + DVec3::new(0.0, FOLLOW_ABOVE, 0.0);
        OrbitCamera {
            position: marker + offset,
            target: marker,
            fov_y_deg: self.fov_y_deg,
        }
    }

    fn lerp(&self, other: &Self, t: f64) -> Self {
        OrbitCamera {
            position: self.position.lerp(other.position, t),
            target: self.target.lerp(other.target, t),
            fov_y_deg: self.fov_y_deg + (other.fov_y_deg - self.fov_y_deg) * t,
        }
    }

    fn animation_duration_ms(config: &AnimationConfig) -> f64 {
        config.orbit_duration_ms
    }
}
