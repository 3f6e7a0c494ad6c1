use std::collections::HashSet;

use log::debug;

use crate::route::model::Waypoint;
use crate::{ScreenPoint, SystemId, WorldPoint};

/// The waypoint under the pointer.
#[derive(Clone, Debug, PartialEq)]
pub struct HoverTarget {
    pub waypoint: Waypoint,
    /// Where the waypoint projects to right now.
    pub screen: ScreenPoint,
    pub screen_distance: f64,
}

/// Nearest waypoint strictly closer than `threshold` pixels to `pointer`.
///
/// A system visited twice is only considered at its first hop. Ties keep the
/// earlier hop. Waypoints `project` cannot place on screen are skipped.
pub fn pick<F>(
    waypoints: &[Waypoint],
    pointer: ScreenPoint,
    threshold: f64,
    project: F,
) -> Option<HoverTarget>
where
    F: Fn(WorldPoint) -> Option<ScreenPoint>,
{
    let mut seen: HashSet<SystemId> = HashSet::with_capacity(waypoints.len());
    let mut best: Option<(&Waypoint, ScreenPoint, f64)> = None;

    for wp in waypoints {
        if !seen.insert(wp.id) {
            continue;
        }
        let Some(screen) = project(wp.position) else {
            continue;
        };
        let d = screen.distance(&pointer);
        if d >= threshold {
            continue;
        }
        if best.map_or(true, |(_, _, bd)| d < bd) {
            best = Some((wp, screen, d));
        }
    }

    best.map(|(wp, screen, d)| HoverTarget {
        waypoint: wp.clone(),
        screen,
        screen_distance: d,
    })
}

/// Keeps the current hover target between pointer moves.
#[derive(Debug, Clone)]
pub struct HoverService {
    threshold: f64,
    current: Option<HoverTarget>,
}

impl HoverService {
    pub fn new(threshold: f64) -> Self {
        HoverService {
            threshold,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&HoverTarget> {
        self.current.as_ref()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Re-picks for a pointer position. Returns true when the hovered system
    /// changed.
    pub fn update<F>(&mut self, waypoints: &[Waypoint], pointer: ScreenPoint, project: F) -> bool
    where
        F: Fn(WorldPoint) -> Option<ScreenPoint>,
    {
        let next = pick(waypoints, pointer, self.threshold, project);
        let changed = self.current.as_ref().map(|t| t.waypoint.hop_index)
            != next.as_ref().map(|t| t.waypoint.hop_index);
        if changed {
            match &next {
                Some(t) => debug!("hovering {} (hop {})", t.waypoint.id, t.waypoint.hop_index),
                None => debug!("hover cleared"),
            }
        }
        self.current = next;
        changed
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
