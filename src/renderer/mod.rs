//! Software rendering layer
//!
//! Particles and scene entities draw through the [`Canvas`] trait. The actual
//! backend (window, GPU, terminal) lives outside this crate; [`Sprite`] is the
//! in-memory image type everything is built from and is itself a `Canvas`.

pub mod sprite;

pub use sprite::Sprite;

use glam::Vec2;

use crate::Rgba;

/// Camera transform applied to world coordinates before drawing
pub type Translation<'a> = &'a dyn Fn(Vec2) -> Vec2;

/// Translation that leaves coordinates unchanged
#[inline]
pub fn identity(coord: Vec2) -> Vec2 {
    coord
}

/// A drawing target
pub trait Canvas {
    /// Draw `sprite` with its top-left corner at `topleft`, scaled by `alpha` (0-255)
    fn blit(&mut self, sprite: &Sprite, topleft: Vec2, alpha: u8);

    /// Draw a filled disc
    fn fill_circle(&mut self, center: Vec2, radius: f32, colour: Rgba);
}
