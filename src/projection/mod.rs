pub mod camera;
pub mod orbit;

use crate::config::AnimationConfig;
use crate::projection::camera::WorldBounds;
use crate::{ScreenPoint, Viewport, WorldPoint};

/// Camera behaviour shared by the 2D and 3D views.
///
/// Implementations are plain values: every operation returns a new camera and
/// the caller decides when to commit it.
pub trait CameraRig: Clone + std::fmt::Debug + PartialEq {
    /// Projects a world point to screen space. `None` when it cannot be seen
    /// (behind the camera).
    fn project(&self, p: WorldPoint, viewport: Viewport) -> Option<ScreenPoint>;

    /// World point under a screen position, on the galactic plane (`y = 0`).
    fn unproject(&self, s: ScreenPoint, viewport: Viewport) -> Option<WorldPoint>;

    /// Camera after dragging `(dx, dy)` pixels from the state captured in `anchor`.
    fn panned_from(&self, anchor: &Self, dx: f64, dy: f64, viewport: Viewport) -> Self;

    /// Zoom by `factor` keeping the world point under `at` in place.
    fn zoomed_at(&self, factor: f64, at: ScreenPoint, viewport: Viewport) -> Self;

    /// Default framing used by the reset preset.
    fn home(galaxy: &WorldBounds) -> Self;

    /// Framing that shows all of `bounds`.
    fn fit(bounds: &WorldBounds, viewport: Viewport, padding: f64) -> Self;

    /// Framing that shows the whole galaxy.
    fn fit_galaxy(galaxy: &WorldBounds, viewport: Viewport, padding: f64) -> Self;

    /// Framing the route animation settles on.
    fn overview(bounds: &WorldBounds, viewport: Viewport, padding: f64) -> Self;

    /// Same zoom, centred on `point`.
    fn centered_on(&self, point: WorldPoint) -> Self;

    /// Close-up on a single system.
    fn focused_on(&self, point: WorldPoint) -> Self;

    /// Where the camera wants to be while following the comet.
    fn follow(&self, marker: WorldPoint, direction: WorldPoint) -> Self;

    fn lerp(&self, other: &Self, t: f64) -> Self;

    fn animation_duration_ms(config: &AnimationConfig) -> f64;
}
