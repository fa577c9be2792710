//! Toy Cannon - a browser cannon with ballistic projectiles
//!
//! Core modules:
//! - `sim`: Projectile simulation (spawning, integration, bounce, expiry)
//! - `clock`: Frame timestamp to elapsed-seconds conversion
//! - `assets`: Asset loading gate (Loading -> Ready -> Running)
//! - `renderer`: Canvas 2D drawing (web only)

pub mod assets;
pub mod clock;
pub mod error;
#[cfg(target_arch = "wasm32")]
pub mod renderer;
pub mod sim;

pub use error::{CannonError, Result};

/// Game configuration constants
pub mod consts {
    /// Drawing surface size
    pub const CANVAS_WIDTH: f64 = 1200.0;
    pub const CANVAS_HEIGHT: f64 = 850.0;

    /// Launch defaults (slider starting positions)
    pub const DEFAULT_GRAVITY: f64 = -980.0;
    pub const DEFAULT_VELOCITY: f64 = 800.0;
    pub const DEFAULT_ANGLE_DEG: f64 = 30.0;

    /// Projectile sprite edge length (pixels); the floor sits one sprite above the bottom
    pub const PROJECTILE_SIZE: f64 = 50.0;
    /// Fraction of vertical speed kept after a floor bounce
    pub const RESTITUTION: f64 = 0.8;
    /// Gap left between a bounced projectile and the floor line
    pub const FLOOR_CLAMP_GAP: f64 = 1.0;
    /// Projectiles slower than this are considered at rest and removed
    pub const MIN_SPEED: f64 = 0.5;
    /// Maximum flight time (seconds) regardless of physics outcome
    pub const PROJECTILE_LIFETIME: f64 = 15.0;
    /// Remaining lifetime at or below this counts as expired (seconds)
    pub const LIFETIME_EPSILON: f64 = 1e-9;

    /// Largest elapsed time a single frame may report (seconds)
    pub const MAX_FRAME_DT: f64 = 0.25;
    /// How long the asset gate waits before giving up (milliseconds)
    pub const ASSET_LOAD_TIMEOUT_MS: f64 = 10_000.0;

    /// Cannon artwork proportions
    pub const CANNON_BASE_HEIGHT: f64 = 150.0;
    pub const CANNON_BASE_ASPECT: f64 = 1.65;
    pub const CANNON_BODY_ASPECT: f64 = 1.475;
    pub const CANNON_HEIGHT_RATIO: f64 = 1.22;
    /// Angle the barrel is drawn at in the body artwork (degrees)
    pub const CANNON_ARTWORK_ANGLE_DEG: f64 = 30.0;
}

/// Launch direction for an angle in degrees above the horizon.
///
/// Screen space grows downward, so "up" is negative y.
#[inline]
pub fn launch_direction(angle_deg: f64) -> glam::DVec2 {
    let rad = angle_deg.to_radians();
    glam::DVec2::new(rad.cos(), -rad.sin())
}
