//! Simulation state and core types
//!
//! Everything the frame loop mutates lives here. The renderer only ever sees
//! `&[Projectile]`.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::cannon::CannonGeometry;
use super::params::ControlParams;
use crate::consts::*;

/// A single projectile in flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    /// Top-left of the sprite, screen space (y grows downward)
    pub pos: DVec2,
    /// Units per second
    pub vel: DVec2,
    /// Seconds left before forced removal
    pub lifetime: f64,
}

impl Projectile {
    pub fn speed(&self) -> f64 {
        self.vel.length()
    }
}

/// Drawing surface extent. The floor and the right edge come from here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
        }
    }
}

/// Bounce and expiry constants, tied to the projectile sprite size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    /// Sprite edge length; the floor line is `height - projectile_size`
    pub projectile_size: f64,
    pub restitution: f64,
    /// Distance kept above the floor line after a bounce
    pub floor_gap: f64,
    /// Speeds below this count as at rest
    pub min_speed: f64,
    /// Seconds a projectile may fly before it is removed
    pub lifetime: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            projectile_size: PROJECTILE_SIZE,
            restitution: RESTITUTION,
            floor_gap: FLOOR_CLAMP_GAP,
            min_speed: MIN_SPEED,
            lifetime: PROJECTILE_LIFETIME,
        }
    }
}

impl Tuning {
    /// y beyond which a projectile bounces
    #[inline]
    pub fn floor_y(&self, bounds: &Bounds) -> f64 {
        bounds.height - self.projectile_size
    }
}

/// Ordered collection of live projectiles
///
/// Ids are handed out monotonically, so the vector stays sorted by id as long
/// as entries are only appended and removed with a stable filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectileStore {
    projectiles: Vec<Projectile>,
    next_id: u32,
}

impl ProjectileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new entity id
    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Append a projectile, assigning it a fresh id. Returns the id.
    pub fn push(&mut self, pos: DVec2, vel: DVec2, lifetime: f64) -> u32 {
        let id = self.next_entity_id();
        self.projectiles.push(Projectile {
            id,
            pos,
            vel,
            lifetime,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.projectiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&Projectile> {
        self.projectiles.iter().find(|p| p.id == id)
    }

    /// Read-only view for rendering
    pub fn as_slice(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Projectile> {
        self.projectiles.iter_mut()
    }

    /// Drop every projectile whose mark is `Some`, in one stable pass.
    ///
    /// `marks` must be in store order, one entry per projectile.
    pub(crate) fn compact<T>(&mut self, marks: &[Option<T>]) {
        debug_assert_eq!(marks.len(), self.projectiles.len());
        let mut marks = marks.iter();
        self.projectiles
            .retain(|_| marks.next().is_none_or(|mark| mark.is_none()));
    }
}

/// Complete simulation state
#[derive(Debug, Clone, Default)]
pub struct Simulation {
    pub params: ControlParams,
    pub tuning: Tuning,
    pub bounds: Bounds,
    pub cannon: CannonGeometry,
    pub store: ProjectileStore,
    /// Total simulated seconds
    pub elapsed: f64,
}

impl Simulation {
    pub fn new(params: ControlParams) -> Self {
        Self {
            params,
            ..Default::default()
        }
    }

    /// Where the next projectile leaves the barrel, for the current angle
    pub fn muzzle(&self) -> DVec2 {
        self.cannon.muzzle(self.params.angle(), &self.bounds)
    }
}
