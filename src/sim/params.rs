//! Live-tunable launch parameters
//!
//! Written by the sliders between frames, read by the spawner and the
//! integrator. Values are accepted as given, except non-finite ones which
//! would poison every projectile they touch.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Which slider a value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamKind {
    Gravity,
    Velocity,
    Angle,
}

impl ParamKind {
    pub const ALL: [ParamKind; 3] = [ParamKind::Gravity, ParamKind::Velocity, ParamKind::Angle];

    /// Element id of the slider input
    pub fn input_id(&self) -> &'static str {
        match self {
            ParamKind::Gravity => "gravity",
            ParamKind::Velocity => "velocity",
            ParamKind::Angle => "angle",
        }
    }

    /// Element id of the on-screen readout
    pub fn label_id(&self) -> &'static str {
        match self {
            ParamKind::Gravity => "gravity_out",
            ParamKind::Velocity => "velocity_out",
            ParamKind::Angle => "angle_out",
        }
    }
}

/// Gravity, launch speed and launch angle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlParams {
    /// Signed acceleration, negative pulls toward the floor
    gravity: f64,
    /// Launch speed magnitude (units per second)
    velocity: f64,
    /// Degrees above the horizon
    angle: f64,
}

impl Default for ControlParams {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            velocity: DEFAULT_VELOCITY,
            angle: DEFAULT_ANGLE_DEG,
        }
    }
}

impl ControlParams {
    pub fn new(gravity: f64, velocity: f64, angle: f64) -> Self {
        let mut params = Self::default();
        params.set_gravity(gravity);
        params.set_velocity(velocity);
        params.set_angle(angle);
        params
    }

    pub fn gravity(&self) -> f64 {
        self.gravity
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Returns false (and keeps the old value) for NaN or infinity
    pub fn set_gravity(&mut self, gravity: f64) -> bool {
        store_finite(&mut self.gravity, gravity, "gravity")
    }

    pub fn set_velocity(&mut self, velocity: f64) -> bool {
        store_finite(&mut self.velocity, velocity, "velocity")
    }

    pub fn set_angle(&mut self, angle: f64) -> bool {
        store_finite(&mut self.angle, angle, "angle")
    }

    /// Apply a raw slider value. The gravity slider shows the downward
    /// magnitude, so it is negated on the way in.
    pub fn apply_slider(&mut self, kind: ParamKind, value: f64) -> bool {
        match kind {
            ParamKind::Gravity => self.set_gravity(-value),
            ParamKind::Velocity => self.set_velocity(value),
            ParamKind::Angle => self.set_angle(value),
        }
    }

    /// Value to put back into the slider element
    pub fn slider_value(&self, kind: ParamKind) -> f64 {
        match kind {
            ParamKind::Gravity => -self.gravity,
            ParamKind::Velocity => self.velocity,
            ParamKind::Angle => self.angle,
        }
    }

    /// Readout text next to the slider (gravity keeps its sign)
    pub fn label(&self, kind: ParamKind) -> String {
        let value = match kind {
            ParamKind::Gravity => self.gravity,
            ParamKind::Velocity => self.velocity,
            ParamKind::Angle => self.angle,
        };
        format!("{}", value)
    }
}

fn store_finite(slot: &mut f64, value: f64, name: &str) -> bool {
    if value.is_finite() {
        *slot = value;
        true
    } else {
        log::warn!("Ignoring non-finite {}: {}", name, value);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Simulation;

    #[test]
    fn test_fresh_simulation_starts_from_compiled_defaults() {
        let mut sim = Simulation::default();
        sim.params.apply_slider(ParamKind::Velocity, 120.0);

        // A reload builds a new simulation; nothing from the last one carries over
        let sim = Simulation::default();
        assert_eq!(sim.params, ControlParams::default());
        assert_eq!(sim.params.slider_value(ParamKind::Gravity), -DEFAULT_GRAVITY);
        assert_eq!(sim.params.slider_value(ParamKind::Velocity), DEFAULT_VELOCITY);
        assert_eq!(sim.params.slider_value(ParamKind::Angle), DEFAULT_ANGLE_DEG);
    }

    #[test]
    fn test_gravity_slider_is_negated() {
        let mut params = ControlParams::default();
        assert!(params.apply_slider(ParamKind::Gravity, 500.0));
        assert_eq!(params.gravity(), -500.0);
        assert_eq!(params.slider_value(ParamKind::Gravity), 500.0);
        assert_eq!(params.label(ParamKind::Gravity), "-500");
    }

    #[test]
    fn test_non_finite_values_are_ignored() {
        let mut params = ControlParams::default();
        assert!(!params.set_velocity(f64::NAN));
        assert!(!params.apply_slider(ParamKind::Angle, f64::INFINITY));
        assert_eq!(params, ControlParams::default());
    }

    #[test]
    fn test_degenerate_values_are_accepted() {
        let params = ControlParams::new(0.0, -20.0, 400.0);
        assert_eq!(params.gravity(), 0.0);
        assert_eq!(params.velocity(), -20.0);
        assert_eq!(params.angle(), 400.0);
    }
}
