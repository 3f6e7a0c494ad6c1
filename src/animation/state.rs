use log::{debug, info};
use serde::Serialize;

use crate::animation::curve::RouteCurve;
use crate::config::AnimationConfig;
use crate::WorldPoint;

#[derive(Clone, Copy, Debug, Default, Serialize, PartialEq, Eq)]
pub enum AnimationPhase {
    #[default]
    Idle,
    /// Seeded but not yet ticked: comet at the origin, only the origin shown.
    Seeding,
    Following,
    Transitioning,
}

#[derive(Clone, Copy, Debug, Default, Serialize, PartialEq)]
pub struct AnimationState {
    pub progress: f64,
    pub start_ms: f64,
    pub phase: AnimationPhase,
}

/// Everything a frame needs to know about the animation at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationFrame {
    pub phase: AnimationPhase,
    pub progress: f64,
    pub elapsed_ms: f64,
    pub comet: WorldPoint,
    pub direction: WorldPoint,
    /// Eased blend toward the overview framing; 0 until the transition starts.
    pub pullback: f64,
    pub starfield_opacity: f64,
    pub comet_opacity: f64,
    /// Set on the frame that finishes the animation.
    pub completed: bool,
}

pub fn ease_in_out_cubic(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Time-driven route reveal: Idle → Seeding → Following → Transitioning → Idle.
#[derive(Debug, Clone)]
pub struct RouteAnimation {
    config: AnimationConfig,
    duration_ms: f64,
    curve: Option<RouteCurve>,
    samples: Vec<WorldPoint>,
    hops: usize,
    state: AnimationState,
}

impl RouteAnimation {
    pub fn new(config: AnimationConfig, duration_ms: f64) -> Self {
        RouteAnimation {
            config,
            duration_ms,
            curve: None,
            samples: Vec::new(),
            hops: 0,
            state: AnimationState::default(),
        }
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn phase(&self) -> AnimationPhase {
        self.state.phase
    }

    /// True while the animation owns the camera.
    pub fn is_active(&self) -> bool {
        self.state.phase != AnimationPhase::Idle
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    pub fn curve(&self) -> Option<&RouteCurve> {
        self.curve.as_ref()
    }

    /// Dense samples of the curve used for drawing the route line.
    pub fn samples(&self) -> &[WorldPoint] {
        &self.samples
    }

    /// Builds the curve through `waypoints` and starts from progress 0.
    /// Returns `None` when there is nothing to animate.
    pub fn seed(&mut self, waypoints: &[WorldPoint], now_ms: f64) -> Option<AnimationFrame> {
        let curve = RouteCurve::new(waypoints.to_vec(), self.config.curve_tension)?;
        self.samples = curve.sample(self.config.samples_per_segment);
        self.hops = curve.segments();
        self.curve = Some(curve);
        info!(
            "seeding route animation over {} hops ({} ms)",
            self.hops, self.duration_ms
        );
        Some(self.restart(now_ms))
    }

    /// Plays the retained curve again without touching route data.
    pub fn replay(&mut self, now_ms: f64) -> Option<AnimationFrame> {
        self.curve.as_ref()?;
        info!("replaying route animation");
        Some(self.restart(now_ms))
    }

    fn restart(&mut self, now_ms: f64) -> AnimationFrame {
        self.state = AnimationState {
            progress: 0.0,
            start_ms: now_ms,
            phase: AnimationPhase::Seeding,
        };
        self.frame(0.0, AnimationPhase::Seeding, false)
    }

    /// Stops playback; the route is then shown fully revealed.
    pub fn cancel(&mut self) {
        if self.is_active() {
            debug!(
                "route animation cancelled at progress {:.3}",
                self.state.progress
            );
            self.state.phase = AnimationPhase::Idle;
        }
    }

    /// Forgets the curve entirely (route replaced or cleared).
    pub fn clear(&mut self) {
        self.cancel();
        self.curve = None;
        self.samples.clear();
        self.hops = 0;
        self.state = AnimationState::default();
    }

    /// Advances from wall-clock time. Progress never decreases, even if the
    /// clock does.
    pub fn tick(&mut self, now_ms: f64) -> Option<AnimationFrame> {
        if !self.is_active() {
            return None;
        }
        let elapsed = (now_ms - self.state.start_ms).max(0.0);
        let progress = (elapsed / self.duration_ms)
            .min(1.0)
            .max(self.state.progress);
        self.state.progress = progress;

        let previous = self.state.phase;
        let (phase, completed) = if progress >= 1.0 {
            (AnimationPhase::Idle, true)
        } else if progress < self.config.follow_end {
            (AnimationPhase::Following, false)
        } else {
            (AnimationPhase::Transitioning, false)
        };
        if phase != previous {
            debug!(
                "route animation {:?} -> {:?} at {:.3}",
                previous, phase, progress
            );
        }
        self.state.phase = phase;
        if completed {
            info!("route animation complete after {:.0} ms", elapsed);
        }
        Some(self.frame(elapsed, phase, completed))
    }

    fn frame(&self, elapsed_ms: f64, phase: AnimationPhase, completed: bool) -> AnimationFrame {
        let cfg = &self.config;
        let progress = self.state.progress;
        let (comet, direction) = match &self.curve {
            Some(curve) => (
                curve.point_at(progress),
                curve.direction_at(progress, cfg.look_ahead),
            ),
            None => (WorldPoint::ZERO, WorldPoint::ZERO),
        };
        let pullback = match phase {
            AnimationPhase::Transitioning => {
                ease_in_out_cubic((progress - cfg.follow_end) / (1.0 - cfg.follow_end))
            }
            AnimationPhase::Idle if completed => 1.0,
            _ => 0.0,
        };
        let (starfield_opacity, comet_opacity) = match phase {
            AnimationPhase::Idle => (cfg.full_starfield, 0.0),
            _ => (
                cfg.dimmed_starfield + (cfg.full_starfield - cfg.dimmed_starfield) * pullback,
                1.0 - pullback,
            ),
        };
        AnimationFrame {
            phase,
            progress,
            elapsed_ms,
            comet,
            direction,
            pullback,
            starfield_opacity,
            comet_opacity,
            completed,
        }
    }

    /// Whether the waypoint at `hop_index` has been reached.
    pub fn is_revealed(&self, hop_index: usize) -> bool {
        !self.is_active() || hop_index as f64 <= self.state.progress * self.hops as f64 + 1e-9
    }
}
