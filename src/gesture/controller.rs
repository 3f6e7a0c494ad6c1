//! Pointer and wheel handling. Produces camera deltas and never writes the
//! camera itself.

use log::debug;

use crate::config::ProjectionConfig;
use crate::projection::CameraRig;
use crate::ScreenPoint;

pub type PointerId = i64;

#[derive(Clone, Debug, PartialEq)]
pub enum GestureMode<C> {
    Idle,
    /// One pointer down; the drag is measured from `start` against `camera`.
    Panning { start: ScreenPoint, camera: C },
    /// Two pointers down; `distance` is the separation at the previous move.
    Pinching { distance: f64 },
}

/// A requested camera change. Applied by the view through its single camera
/// entry point.
#[derive(Clone, Debug, PartialEq)]
pub enum CameraDelta<C> {
    /// Drag `(dx, dy)` pixels away from the camera captured in `anchor`.
    Pan { anchor: C, dx: f64, dy: f64 },
    ZoomAt { factor: f64, at: ScreenPoint },
    Set(C),
}

#[derive(Clone, Debug)]
pub struct GestureController<C> {
    /// Active pointers in the order they went down.
    pointers: Vec<(PointerId, ScreenPoint)>,
    mode: GestureMode<C>,
    wheel_zoom_in: f64,
    wheel_zoom_out: f64,
}

impl<C: CameraRig> GestureController<C> {
    pub fn new(config: &ProjectionConfig) -> Self {
        GestureController {
            pointers: Vec::new(),
            mode: GestureMode::Idle,
            wheel_zoom_in: config.wheel_zoom_in,
            wheel_zoom_out: config.wheel_zoom_out,
        }
    }

    pub fn mode(&self) -> &GestureMode<C> {
        &self.mode
    }

    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    fn pinch_distance(&self) -> Option<f64> {
        match self.pointers.as_slice() {
            [(_, a), (_, b)] => Some(a.distance(b)),
            _ => None,
        }
    }

    /// Re-derives the mode from the pointers that are still down.
    fn settle_mode(&mut self, camera: &C) {
        self.mode = match self.pointers.as_slice() {
            [] => GestureMode::Idle,
            [(_, pos)] => GestureMode::Panning {
                start: *pos,
                camera: camera.clone(),
            },
            [(_, a), (_, b)] => GestureMode::Pinching {
                distance: a.distance(b),
            },
            // extra pointers are tracked but do not change the gesture
            _ => return,
        };
    }

    pub fn pointer_down(&mut self, id: PointerId, pos: ScreenPoint, camera: &C) {
        match self.pointers.iter_mut().find(|(pid, _)| *pid == id) {
            Some(entry) => entry.1 = pos,
            None => self.pointers.push((id, pos)),
        }
        self.settle_mode(camera);
        debug!("pointer {} down, {} active", id, self.pointers.len());
    }

    pub fn pointer_move(&mut self, id: PointerId, pos: ScreenPoint) -> Option<CameraDelta<C>> {
        let entry = self.pointers.iter_mut().find(|(pid, _)| *pid == id)?;
        entry.1 = pos;

        match &mut self.mode {
            GestureMode::Panning { start, camera } if self.pointers.len() == 1 => {
                Some(CameraDelta::Pan {
                    anchor: camera.clone(),
                    dx: pos.x - start.x,
                    dy: pos.y - start.y,
                })
            }
            GestureMode::Pinching { distance } if self.pointers.len() == 2 => {
                let [(_, a), (_, b)] = self.pointers.as_slice() else {
                    return None;
                };
                let next = a.distance(b);
                let previous = std::mem::replace(distance, next);
                if previous <= 0.0 || next <= 0.0 {
                    return None;
                }
                Some(CameraDelta::ZoomAt {
                    factor: next / previous,
                    at: a.midpoint(b),
                })
            }
            _ => None,
        }
    }

    /// Lift or cancel. A remaining single pointer re-anchors a pan at its
    /// current position against `camera`.
    pub fn pointer_up(&mut self, id: PointerId, camera: &C) {
        let before = self.pointers.len();
        self.pointers.retain(|(pid, _)| *pid != id);
        if self.pointers.len() == before {
            return;
        }
        self.settle_mode(camera);
        debug!("pointer {} up, {} active", id, self.pointers.len());
    }

    pub fn cancel_all(&mut self) {
        self.pointers.clear();
        self.mode = GestureMode::Idle;
    }

    /// Restarts an ongoing gesture from `camera`, used once something other
    /// than the pointers has moved the camera.
    pub fn rebase(&mut self, camera: &C) {
        if let Some(pos) = self.pointers.first().map(|(_, p)| *p) {
            if let GestureMode::Panning { start, camera: anchor } = &mut self.mode {
                *start = pos;
                *anchor = camera.clone();
            }
        }
        let current = self.pinch_distance();
        if let (GestureMode::Pinching { distance }, Some(d)) = (&mut self.mode, current) {
            *distance = d;
        }
    }

    pub fn wheel(&self, delta_y: f64, at: ScreenPoint) -> Option<CameraDelta<C>> {
        let factor = if delta_y > 0.0 {
            self.wheel_zoom_out
        } else if delta_y < 0.0 {
            self.wheel_zoom_in
        } else {
            return None;
        };
        Some(CameraDelta::ZoomAt { factor, at })
    }
}
