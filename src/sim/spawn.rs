//! Projectile spawning

use glam::DVec2;

use super::params::ControlParams;
use super::state::{ProjectileStore, Simulation, Tuning};
use crate::launch_direction;

/// Launch velocity for the current angle and speed
pub fn launch_velocity(params: &ControlParams) -> DVec2 {
    launch_direction(params.angle()) * params.velocity()
}

/// Append a projectile leaving `origin` with the current parameters.
///
/// Parameters are read at call time, so several spawns in one frame each see
/// whatever the sliders held at that moment.
pub fn spawn(
    store: &mut ProjectileStore,
    origin: DVec2,
    params: &ControlParams,
    tuning: &Tuning,
) -> u32 {
    let vel = launch_velocity(params);
    let id = store.push(origin, vel, tuning.lifetime);
    log::debug!(
        "Fired #{} from ({:.1}, {:.1}) at {:.1} deg, speed {:.1}",
        id,
        origin.x,
        origin.y,
        params.angle(),
        params.velocity()
    );
    id
}

impl Simulation {
    /// Fire one projectile from the muzzle
    pub fn fire(&mut self) -> u32 {
        let origin = self.muzzle();
        spawn(&mut self.store, origin, &self.params, &self.tuning)
    }
}
