//! Cannon barrel geometry
//!
//! The cannon is two sprites: a fixed base in the bottom-left corner and a
//! body that pivots around an attach point on top of the base. The muzzle
//! position (where projectiles appear) follows the launch angle.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::state::Bounds;
use crate::consts::*;

/// Sprite proportions of the cannon artwork
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CannonGeometry {
    pub base_height: f64,
    pub base_aspect: f64,
    pub body_aspect: f64,
    /// Body height relative to the base height
    pub height_ratio: f64,
    /// Barrel angle baked into the body artwork (degrees)
    pub artwork_angle: f64,
    /// Pivot inside the body sprite, relative to its top-left
    pub body_pivot: DVec2,
    /// Half the projectile sprite, so the sprite is centred on the barrel
    pub sprite_offset: f64,
}

impl Default for CannonGeometry {
    fn default() -> Self {
        Self {
            base_height: CANNON_BASE_HEIGHT,
            base_aspect: CANNON_BASE_ASPECT,
            body_aspect: CANNON_BODY_ASPECT,
            height_ratio: CANNON_HEIGHT_RATIO,
            artwork_angle: CANNON_ARTWORK_ANGLE_DEG,
            body_pivot: DVec2::new(65.0, 173.0),
            sprite_offset: PROJECTILE_SIZE / 2.0,
        }
    }
}

impl CannonGeometry {
    /// Base sprite size (width, height)
    pub fn base_size(&self) -> DVec2 {
        DVec2::new(self.base_height * self.base_aspect, self.base_height)
    }

    /// Body sprite size (width, height)
    pub fn body_size(&self) -> DVec2 {
        let height = self.base_height * self.height_ratio;
        DVec2::new(height * self.body_aspect, height)
    }

    /// Top-left of the base sprite
    pub fn base_origin(&self, bounds: &Bounds) -> DVec2 {
        DVec2::new(0.0, bounds.height - self.base_height)
    }

    /// Point on the base the body pivots around
    pub fn attach_point(&self, bounds: &Bounds) -> DVec2 {
        DVec2::new(
            self.base_height * self.base_aspect * 0.5,
            bounds.height - self.base_height,
        )
    }

    /// Rotation to apply to the body sprite, radians, canvas convention
    /// (positive is clockwise on screen)
    pub fn body_rotation(&self, angle_deg: f64) -> f64 {
        -(angle_deg - self.artwork_angle).to_radians()
    }

    /// Top-left of a projectile sprite leaving the barrel at `angle_deg`
    pub fn muzzle(&self, angle_deg: f64, bounds: &Bounds) -> DVec2 {
        let attach = self.attach_point(bounds);
        let body = self.body_size();
        let rad = angle_deg.to_radians();
        let barrel_tip = DVec2::new(
            attach.x + rad.cos() * (body.x - 20.0),
            attach.y - rad.sin() * (body.y + 20.0),
        );
        barrel_tip - DVec2::splat(self.sprite_offset * 2.0)
    }
}
