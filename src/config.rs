use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::projection::camera::{WorldBounds, GALAXY_BOUNDS};

/// Padding in pixels kept around a fitted region.
pub const FIT_PADDING_PX: f64 = 40.0;
/// Pointer distance under which a waypoint counts as hovered.
pub const HOVER_THRESHOLD_PX: f64 = 12.0;
/// Spacing of the reference grid in world units.
pub const GRID_STEP: f64 = 2000.0;
/// Fraction of the animation spent following the comet before pulling back.
pub const FOLLOW_PHASE_END: f64 = 0.85;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StarMapConfig {
    pub projection: ProjectionConfig,
    pub animation: AnimationConfig,
    pub hover: HoverConfig,
    pub route: RouteClientConfig,
    pub galaxy: GalaxyConfig,
}

impl StarMapConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: StarMapConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let a = &self.animation;
        if !(a.planar_duration_ms > 0.0 && a.orbit_duration_ms > 0.0) {
            return Err(ConfigError::Invalid(
                "animation durations must be positive".into(),
            ));
        }
        if !(a.follow_end > 0.0 && a.follow_end < 1.0) {
            return Err(ConfigError::Invalid(
                "animation.follow_end must lie strictly between 0 and 1".into(),
            ));
        }
        let p = &self.projection;
        if !(p.wheel_zoom_in > 0.0 && p.wheel_zoom_out > 0.0) {
            return Err(ConfigError::Invalid(
                "projection wheel zoom factors must be positive".into(),
            ));
        }
        if !(self.hover.threshold_px > 0.0) {
            return Err(ConfigError::Invalid(
                "hover.threshold_px must be positive".into(),
            ));
        }
        if self.route.timeout_ms == 0 {
            return Err(ConfigError::Invalid("route.timeout_ms must be non-zero".into()));
        }
        if !(self.galaxy.grid_step > 0.0) {
            return Err(ConfigError::Invalid("galaxy.grid_step must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProjectionConfig {
    pub fit_padding_px: f64,
    pub wheel_zoom_in: f64,
    pub wheel_zoom_out: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            fit_padding_px: FIT_PADDING_PX,
            wheel_zoom_in: 1.1,
            wheel_zoom_out: 0.9,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnimationConfig {
    /// Reveal duration when drawing on a 2D surface.
    pub planar_duration_ms: f64,
    /// Fly-through duration for the 3D scene.
    pub orbit_duration_ms: f64,
    pub follow_end: f64,
    /// Curve parameter distance used to derive the direction of travel.
    pub look_ahead: f64,
    /// Per-60Hz-frame blend factor toward the follow framing.
    pub follow_smoothing: f64,
    pub dimmed_starfield: f64,
    pub full_starfield: f64,
    pub curve_tension: f64,
    pub samples_per_segment: usize,
    pub trail_particles: usize,
    /// Curve parameter span covered by the trail behind the comet.
    pub trail_span: f64,
    pub trail_scatter: f64,
    pub trail_seed: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            planar_duration_ms: 3_500.0,
            orbit_duration_ms: 30_000.0,
            follow_end: FOLLOW_PHASE_END,
            look_ahead: 0.04,
            follow_smoothing: 0.03,
            dimmed_starfield: 0.15,
            full_starfield: 0.85,
            curve_tension: 0.5,
            samples_per_segment: 50,
            trail_particles: 150,
            trail_span: 0.05,
            trail_scatter: 50.0,
            trail_seed: 0x5eed_c0de,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HoverConfig {
    pub threshold_px: f64,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            threshold_px: HOVER_THRESHOLD_PX,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RouteClientConfig {
    pub endpoint: Option<String>,
    pub timeout_ms: u64,
}

impl Default for RouteClientConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_ms: 15_000,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GalaxyConfig {
    pub bounds: WorldBounds,
    pub grid_step: f64,
    pub image_path: String,
    pub catalog_path: String,
    /// Set when the backdrop image is stored upside down relative to routes.
    pub flip_image: bool,
}

impl Default for GalaxyConfig {
    fn default() -> Self {
        Self {
            bounds: GALAXY_BOUNDS,
            grid_step: GRID_STEP,
            image_path: "assets/GalaxyDottedMap.png".into(),
            catalog_path: "assets/data/galaxy-systems.json".into(),
            flip_image: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config =
            StarMapConfig::from_json(r#"{"hover":{"threshold_px":20},"route":{"timeout_ms":500}}"#)
                .expect("config");
        assert_eq!(config.hover.threshold_px, 20.0);
        assert_eq!(config.route.timeout_ms, 500);
        assert_eq!(config.animation, AnimationConfig::default());
        assert_eq!(config.galaxy.bounds, GALAXY_BOUNDS);
    }

    #[test]
    fn rejects_follow_end_outside_unit_interval() {
        let err = StarMapConfig::from_json(r#"{"animation":{"follow_end":1.0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_nan_threshold_and_non_positive_wheel_factors() {
        let mut config = StarMapConfig::default();
        config.hover.threshold_px = f64::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = StarMapConfig::default();
        config.projection.wheel_zoom_out = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let err = StarMapConfig::from_json(r#"{"projection":{"wheel_zoom_in":-1.1}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(StarMapConfig::default().validate().is_ok());
    }
}
