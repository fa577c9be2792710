//! Per-frame simulation step
//!
//! Fire first, then integrate every projectile, then drop the ones that are
//! done in a single compaction pass.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::state::{Bounds, Projectile, ProjectileStore, Simulation, Tuning};
use crate::consts::LIFETIME_EPSILON;

/// Input commands for a single frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Fire key held down (polled: fires once per frame while held)
    pub fire_held: bool,
    /// One-shot fires queued since the last frame (button clicks)
    pub fire_clicks: u32,
}

impl FrameInput {
    pub fn shots(&self) -> u32 {
        self.fire_clicks + u32::from(self.fire_held)
    }
}

/// Why a projectile left the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalCause {
    /// Lifetime ran out
    Expired,
    /// Crossed the right edge
    OutOfBounds,
    /// Speed dropped to (almost) nothing
    Stalled,
}

/// What happened during one step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepReport {
    pub fired: u32,
    pub bounces: u32,
    pub expired: u32,
    pub out_of_bounds: u32,
    pub stalled: u32,
}

impl StepReport {
    pub fn removed(&self) -> u32 {
        self.expired + self.out_of_bounds + self.stalled
    }

    fn record(&mut self, cause: RemovalCause) {
        match cause {
            RemovalCause::Expired => self.expired += 1,
            RemovalCause::OutOfBounds => self.out_of_bounds += 1,
            RemovalCause::Stalled => self.stalled += 1,
        }
    }
}

/// Advance one projectile by `dt`, returning whether it bounced and whether
/// it should be removed.
fn integrate(
    p: &mut Projectile,
    dt: f64,
    gravity: f64,
    bounds: &Bounds,
    tuning: &Tuning,
) -> (bool, Option<RemovalCause>) {
    // Repeated subtraction of non-binary steps (1/60, 1/144) leaves a
    // rounding crumb above zero on the frame that should expire
    p.lifetime -= dt;
    let expired = p.lifetime <= LIFETIME_EPSILON;

    // Gravity is stored negative-down; screen y grows downward
    let accel = DVec2::new(0.0, -gravity);
    let mut pos = p.pos + p.vel * dt;
    let mut vel = p.vel + accel * dt;

    let floor = tuning.floor_y(bounds);
    let bounced = pos.y > floor;
    if bounced {
        vel.y = -vel.y * tuning.restitution;
        pos.y = floor - tuning.floor_gap;
    }

    p.pos = pos;
    p.vel = vel;

    let cause = if expired {
        Some(RemovalCause::Expired)
    } else if pos.x > bounds.width {
        Some(RemovalCause::OutOfBounds)
    } else if vel.length() < tuning.min_speed {
        Some(RemovalCause::Stalled)
    } else {
        None
    };

    (bounced, cause)
}

/// Integrate every projectile in the store by `dt` seconds and compact.
///
/// Removal marks are collected for the whole store before anything is
/// removed, so no projectile is skipped or visited twice.
pub fn step(
    store: &mut ProjectileStore,
    dt: f64,
    gravity: f64,
    bounds: &Bounds,
    tuning: &Tuning,
) -> StepReport {
    let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
    let mut report = StepReport::default();

    let marks: Vec<Option<RemovalCause>> = store
        .iter_mut()
        .map(|p| {
            let (bounced, cause) = integrate(p, dt, gravity, bounds, tuning);
            if bounced {
                report.bounces += 1;
            }
            if let Some(cause) = cause {
                log::debug!(
                    "Removing #{} ({:?}) at ({:.1}, {:.1})",
                    p.id,
                    cause,
                    p.pos.x,
                    p.pos.y
                );
                report.record(cause);
            }
            cause
        })
        .collect();

    if report.removed() > 0 {
        store.compact(&marks);
    }

    report
}

/// Run one frame: handle fire input, then step the whole store
pub fn tick(sim: &mut Simulation, input: &FrameInput, dt: f64) -> StepReport {
    let shots = input.shots();
    for _ in 0..shots {
        sim.fire();
    }

    let mut report = step(
        &mut sim.store,
        dt,
        sim.params.gravity(),
        &sim.bounds,
        &sim.tuning,
    );
    report.fired = shots;
    if dt.is_finite() && dt > 0.0 {
        sim.elapsed += dt;
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::params::ControlParams;
    use proptest::prelude::*;

    const DT: f64 = 1.0 / 64.0;

    fn store_with(pos: DVec2, vel: DVec2, lifetime: f64) -> (ProjectileStore, u32) {
        let mut store = ProjectileStore::new();
        let id = store.push(pos, vel, lifetime);
        (store, id)
    }

    #[test]
    fn test_semi_implicit_euler_order() {
        let (mut store, id) = store_with(DVec2::new(100.0, 100.0), DVec2::new(10.0, -20.0), 5.0);
        step(&mut store, 0.5, -4.0, &Bounds::default(), &Tuning::default());

        let p = store.get(id).unwrap();
        // Position moves with the old velocity, then velocity picks up gravity
        assert_eq!(p.pos, DVec2::new(105.0, 90.0));
        assert_eq!(p.vel, DVec2::new(10.0, -18.0));
        assert_eq!(p.lifetime, 4.5);
    }

    #[test]
    fn test_floor_bounce_keeps_restitution_fraction() {
        let bounds = Bounds::default();
        let tuning = Tuning::default();
        let floor = tuning.floor_y(&bounds);
        let (mut store, id) = store_with(DVec2::new(300.0, floor - 1.0), DVec2::new(50.0, 300.0), 5.0);

        let gravity = -980.0;
        let vy_before = 300.0 + 980.0 * DT;
        let report = step(&mut store, DT, gravity, &bounds, &tuning);

        let p = store.get(id).unwrap();
        assert_eq!(report.bounces, 1);
        assert!(p.vel.y < 0.0);
        assert!((p.vel.y.abs() - 0.8 * vy_before).abs() < 1e-9);
        assert_eq!(p.pos.y, floor - tuning.floor_gap);
        assert_eq!(p.vel.x, 50.0);
    }

    #[test]
    fn test_out_of_bounds_removed_same_step() {
        let bounds = Bounds::default();
        let (mut store, _) = store_with(DVec2::new(bounds.width - 1.0, 100.0), DVec2::new(200.0, 0.0), 5.0);
        let report = step(&mut store, DT, -980.0, &bounds, &Tuning::default());
        assert_eq!(report.out_of_bounds, 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_stalled_projectile_removed_same_step() {
        // No gravity, crawling speed, plenty of lifetime and room
        let (mut store, _) = store_with(DVec2::new(100.0, 100.0), DVec2::new(0.3, 0.0), 5.0);
        let report = step(&mut store, DT, 0.0, &Bounds::default(), &Tuning::default());
        assert_eq!(report.stalled, 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_expired_projectile_still_moves_on_final_step() {
        let (mut store, _) = store_with(DVec2::new(100.0, 100.0), DVec2::new(100.0, 0.0), DT);
        let report = step(&mut store, DT, -980.0, &Bounds::default(), &Tuning::default());
        assert_eq!(report.expired, 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_mixed_removals_in_one_pass() {
        let bounds = Bounds::default();
        let tuning = Tuning::default();
        let mut store = ProjectileStore::new();
        let keep_a = store.push(DVec2::new(100.0, 100.0), DVec2::new(100.0, 0.0), 5.0);
        store.push(DVec2::new(bounds.width, 100.0), DVec2::new(100.0, 0.0), 5.0);
        store.push(DVec2::new(100.0, 100.0), DVec2::new(100.0, 0.0), 0.0);
        let keep_b = store.push(DVec2::new(200.0, 200.0), DVec2::new(100.0, 0.0), 5.0);
        store.push(DVec2::new(300.0, 300.0), DVec2::ZERO, 5.0);

        let report = step(&mut store, DT, 0.0, &bounds, &tuning);

        assert_eq!(report.removed(), 3);
        let left: Vec<u32> = store.iter().map(|p| p.id).collect();
        assert_eq!(left, vec![keep_a, keep_b]);
    }

    #[test]
    fn test_bad_dt_does_not_poison_state() {
        let (mut store, id) = store_with(DVec2::new(100.0, 100.0), DVec2::new(100.0, 0.0), 5.0);
        step(&mut store, f64::NAN, -980.0, &Bounds::default(), &Tuning::default());
        step(&mut store, -1.0, -980.0, &Bounds::default(), &Tuning::default());
        let p = store.get(id).unwrap();
        assert_eq!(p.pos, DVec2::new(100.0, 100.0));
        assert_eq!(p.lifetime, 5.0);
    }

    #[test]
    fn test_upward_gravity_stays_finite_until_lifetime() {
        let mut sim = Simulation::new(ControlParams::new(500.0, 0.0, 90.0));
        sim.fire();
        let mut frames = 0;
        while !sim.store.is_empty() {
            tick(&mut sim, &FrameInput::default(), DT);
            for p in sim.store.iter() {
                assert!(p.pos.is_finite() && p.vel.is_finite());
            }
            frames += 1;
            assert!(frames <= 15 * 64);
        }
    }

    #[test]
    fn test_fire_many_in_one_frame() {
        let mut sim = Simulation::default();
        let input = FrameInput {
            fire_held: true,
            fire_clicks: 4,
        };
        let report = tick(&mut sim, &input, 0.0);
        assert_eq!(report.fired, 5);
        assert_eq!(sim.store.len(), 5);
        let muzzle = sim.muzzle();
        for p in sim.store.iter() {
            assert_eq!(p.pos, muzzle);
        }
    }

    /// Closed form of the integrator for a constant step `dt` over `n` steps:
    /// position uses the velocity from before each update, so it lags the
    /// continuous parabola by `a * t * dt / 2`.
    fn euler_closed_form(p0: DVec2, v0: DVec2, a: DVec2, dt: f64, n: u32) -> (DVec2, DVec2) {
        let t = dt * n as f64;
        let pos = p0 + v0 * t + a * (0.5 * t * (t - dt));
        let vel = v0 + a * t;
        (pos, vel)
    }

    #[test]
    fn test_end_to_end_one_second_flight() {
        let mut sim = Simulation::new(ControlParams::new(-980.0, 800.0, 30.0));
        let origin = DVec2::new(145.0, 640.0);
        let id = crate::sim::spawn(&mut sim.store, origin, &sim.params, &sim.tuning);

        let dt = 1.0 / 60.0;
        for _ in 0..60 {
            tick(&mut sim, &FrameInput::default(), dt);
        }

        let v0 = DVec2::new(800.0 * 30f64.to_radians().cos(), -400.0);
        let (pos, vel) = euler_closed_form(origin, v0, DVec2::new(0.0, 980.0), dt, 60);
        // Apex-and-fall stays above the floor line (800) for the first second
        assert!(pos.y < sim.tuning.floor_y(&sim.bounds));

        let p = sim.store.get(id).unwrap();
        assert!((p.pos - pos).abs().max_element() < 1e-3, "{:?} vs {:?}", p.pos, pos);
        assert!((p.vel - vel).abs().max_element() < 1e-3, "{:?} vs {:?}", p.vel, vel);

        // And it converges on the continuous parabola as dt shrinks
        let t = 1.0;
        let continuous = origin + v0 * t + DVec2::new(0.0, 980.0) * (0.5 * t * t);
        assert!((p.pos - continuous).length() < 980.0 * dt);
    }

    #[test]
    fn test_end_to_end_with_bounce() {
        // Drop from just above the floor with a slow horizontal drift
        let mut sim = Simulation::new(ControlParams::new(-980.0, 10.0, 0.0));
        let floor = sim.tuning.floor_y(&sim.bounds);
        let id = crate::sim::spawn(&mut sim.store, DVec2::new(400.0, floor - 100.0), &sim.params, &sim.tuning);

        let mut bounces = 0;
        let mut last_vy = 0.0;
        for _ in 0..64 {
            let before = sim.store.get(id).unwrap().vel.y;
            let report = tick(&mut sim, &FrameInput::default(), DT);
            if report.bounces > 0 {
                let after = sim.store.get(id).unwrap().vel.y;
                assert!((after + 0.8 * (before + 980.0 * DT)).abs() < 1e-9);
                last_vy = after;
                bounces += 1;
            }
        }
        assert!(bounces >= 1);
        assert!(last_vy < 0.0);
    }

    #[test]
    fn test_lifetime_expires_on_time_at_display_rates() {
        let bounds = Bounds { width: 1e9, height: 1e12 };
        for (lifetime, steps_per_second) in [(1.0, 10u32), (3.0, 60), (1.0, 30), (2.0, 144), (15.0, 144)] {
            let tuning = Tuning { lifetime, ..Tuning::default() };
            let (mut store, _) = store_with(DVec2::ZERO, DVec2::ZERO, lifetime);

            let dt = 1.0 / steps_per_second as f64;
            let mut frames = 0u32;
            while !store.is_empty() {
                step(&mut store, dt, -980.0, &bounds, &tuning);
                frames += 1;
            }
            assert_eq!(
                frames,
                (lifetime * steps_per_second as f64).round() as u32,
                "lifetime {} at {} steps/s",
                lifetime,
                steps_per_second
            );
        }
    }

    proptest! {
        #[test]
        fn prop_lifetime_expiry_depends_on_elapsed_time_only(
            steps_per_second in prop::sample::select(vec![1u32, 2, 4, 8, 10, 16, 30, 32, 60, 64, 128, 144]),
            lifetime_secs in 1u32..6,
        ) {
            let bounds = Bounds { width: 1e9, height: 1e12 };
            let tuning = Tuning { lifetime: lifetime_secs as f64, ..Tuning::default() };
            let mut store = ProjectileStore::new();
            store.push(DVec2::ZERO, DVec2::ZERO, tuning.lifetime);

            let dt = 1.0 / steps_per_second as f64;
            let mut elapsed = 0.0;
            while !store.is_empty() {
                let report = step(&mut store, dt, -980.0, &bounds, &tuning);
                elapsed += dt;
                if report.removed() > 0 {
                    prop_assert_eq!(report.expired, 1);
                }
                prop_assert!(elapsed < tuning.lifetime + dt / 2.0);
            }
            prop_assert!((elapsed - tuning.lifetime).abs() < dt / 2.0);
        }

        #[test]
        fn prop_count_never_grows_without_fire(
            shots in prop::collection::vec((0.0f64..90.0, 0.0f64..1500.0), 1..20),
            gravity in -2000.0f64..0.0,
            frames in prop::collection::vec(0.0f64..0.1, 1..200),
        ) {
            let mut sim = Simulation::default();
            sim.params.set_gravity(gravity);
            for (angle, speed) in shots {
                sim.params.set_angle(angle);
                sim.params.set_velocity(speed);
                sim.fire();
            }

            let mut last = sim.store.len();
            for dt in frames {
                tick(&mut sim, &FrameInput::default(), dt);
                prop_assert!(sim.store.len() <= last);
                last = sim.store.len();
                for p in sim.store.iter() {
                    prop_assert!(p.lifetime > 0.0);
                    prop_assert!(p.pos.x <= sim.bounds.width);
                    prop_assert!(p.pos.y <= sim.tuning.floor_y(&sim.bounds));
                }
            }
        }
    }
}
