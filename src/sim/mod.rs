//! Projectile simulation module
//!
//! All physics lives here. This module must stay free of platform code:
//! - Seconds everywhere (milliseconds are converted by the frame clock)
//! - Stable iteration order (by projectile id)
//! - No rendering or DOM dependencies

pub mod cannon;
pub mod params;
pub mod spawn;
pub mod state;
pub mod tick;

pub use cannon::CannonGeometry;
pub use params::{ControlParams, ParamKind};
pub use spawn::{launch_velocity, spawn};
pub use state::{Bounds, Projectile, ProjectileStore, Simulation, Tuning};
pub use tick::{FrameInput, RemovalCause, StepReport, step, tick};
