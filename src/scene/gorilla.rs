//! Gorillas and craters

use std::borrow::Cow;

use glam::Vec2;

use crate::renderer::{Canvas, Sprite, Translation};
use crate::sim::{Collidable, Mask};
use crate::{Rect, Rgba};

pub const GORILLA_SIZE: u32 = 64;
pub const CRATER_DIAMETER: u32 = 32;

const FUR: Rgba = Rgba::rgb(160, 96, 32);
const FACE: Rgba = Rgba::rgb(232, 176, 120);

/// Procedural gorilla silhouette
fn gorilla_sprite() -> Sprite {
    let s = GORILLA_SIZE as f32;
    let mut sprite = Sprite::new(GORILLA_SIZE, GORILLA_SIZE);
    // Legs
    sprite.fill_rect(Rect::new(s * 0.25, s * 0.7, s * 0.18, s * 0.3), FUR);
    sprite.fill_rect(Rect::new(s * 0.57, s * 0.7, s * 0.18, s * 0.3), FUR);
    // Body and arms
    sprite.draw_circle(Vec2::new(s * 0.5, s * 0.55), s * 0.25, FUR);
    sprite.fill_rect(Rect::new(s * 0.08, s * 0.35, s * 0.14, s * 0.35), FUR);
    sprite.fill_rect(Rect::new(s * 0.78, s * 0.35, s * 0.14, s * 0.35), FUR);
    // Head
    sprite.draw_circle(Vec2::new(s * 0.5, s * 0.2), s * 0.17, FUR);
    sprite.draw_circle(Vec2::new(s * 0.5, s * 0.23), s * 0.09, FACE);
    sprite
}

/// A player. Stands still; only collides.
#[derive(Debug, Clone)]
pub struct Gorilla {
    pub pos: Vec2,
    sprite: Sprite,
    mask: Mask,
}

impl Gorilla {
    pub fn new(pos: Vec2) -> Self {
        let sprite = gorilla_sprite();
        let mask = Mask::from_sprite(&sprite);
        Self { pos, sprite, mask }
    }

    pub fn render(&self, canvas: &mut dyn Canvas, translate: Translation<'_>) {
        canvas.blit(&self.sprite, translate(self.rect().topleft()), 255);
    }
}

impl Collidable for Gorilla {
    fn rect(&self) -> Rect {
        Rect::from_center(self.pos, self.sprite.size())
    }

    fn mask(&self) -> Option<Cow<'_, Mask>> {
        Some(Cow::Borrowed(&self.mask))
    }
}

/// The hole an explosion leaves behind
#[derive(Debug, Clone)]
pub struct Crater {
    pub pos: Vec2,
    mask: Mask,
}

impl Crater {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            mask: Mask::filled_circle(CRATER_DIAMETER),
        }
    }

    pub fn topleft(&self) -> Vec2 {
        self.pos - Vec2::splat(CRATER_DIAMETER as f32 / 2.0)
    }

    pub fn shape(&self) -> &Mask {
        &self.mask
    }
}

impl Collidable for Crater {
    fn rect(&self) -> Rect {
        Rect::from_center(self.pos, Vec2::splat(CRATER_DIAMETER as f32))
    }

    fn mask(&self) -> Option<Cow<'_, Mask>> {
        Some(Cow::Borrowed(&self.mask))
    }
}
