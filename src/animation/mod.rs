pub mod curve;
pub mod state;
pub mod trail;

/// Comet halo scale for the elapsed time.
pub fn comet_pulse(elapsed_ms: f64) -> f64 {
    1.0 + (elapsed_ms * 0.01).sin() * 0.2
}

/// Radius of the comet glow for the elapsed time.
pub fn comet_glow_radius(elapsed_ms: f64) -> f64 {
    600.0 + (elapsed_ms * 0.008).sin() * 100.0
}
