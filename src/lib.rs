pub mod animation;
pub mod config;
pub mod data;
pub mod gesture;
pub mod hover;
pub mod projection;
pub mod render;
pub mod route;
pub mod spatial;
pub mod view;

use serde::{Deserialize, Serialize};

/// Identifier of a star system as issued by the routing collaborator.
pub type SystemId = u32;

/// Position in galaxy space (light-years, already transformed).
pub type WorldPoint = glam::DVec3;

/// Straight line between two world points, used for grid and outline geometry.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Segment {
    pub from: WorldPoint,
    pub to: WorldPoint,
}

/// Pixel position inside the viewport, origin at the top-left corner.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        ScreenPoint { x, y }
    }

    pub fn distance(&self, other: &ScreenPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn midpoint(&self, other: &ScreenPoint) -> ScreenPoint {
        ScreenPoint::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Size of the drawing surface in CSS pixels.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Viewport { width, height }
    }

    pub fn center(&self) -> ScreenPoint {
        ScreenPoint::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn aspect(&self) -> f64 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport::new(800.0, 500.0)
    }
}
