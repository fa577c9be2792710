//! Canvas 2D rendering module
//!
//! Draws the cannon sprites and every live projectile. Reads simulation state,
//! never mutates it.

pub mod canvas;
pub mod sprites;

pub use canvas::CanvasRenderer;
pub use sprites::Sprites;
