//! The destructible city skyline
//!
//! Buildings are composed into one sprite and one mask covering the whole
//! playfield. Explosions erase craters out of both.

use std::borrow::Cow;

use glam::Vec2;
use rand::Rng;

use crate::renderer::{Canvas, Sprite, Translation};
use crate::sim::{Collidable, Mask};
use crate::{Rect, Rgba};

pub const BUILDING_WIDTH: f32 = 80.0;
pub const BUILDING_MIN_HEIGHT: u32 = 20;
pub const BUILDING_MAX_HEIGHT: u32 = 320;
/// Height of one storey (window row)
const STOREY_HEIGHT: i32 = 20;

const BUILDING_COLOURS: [Rgba; 3] = [
    Rgba::rgb(160, 160, 168),
    Rgba::rgb(168, 64, 48),
    Rgba::rgb(64, 168, 168),
];
const WINDOW_LIT: Rgba = Rgba::rgb(255, 255, 128);
const WINDOW_DARK: Rgba = Rgba::rgb(64, 64, 64);

/// A single building's footprint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Building {
    pub rect: Rect,
    pub skin: usize,
}

impl Building {
    /// Where a gorilla of the given height stands on this roof (its centre)
    pub fn roof_spot(&self, gorilla_height: f32) -> Vec2 {
        Vec2::new(
            self.rect.center().x,
            self.rect.top() - gorilla_height / 2.0 + 1.0,
        )
    }

    fn draw(&self, sprite: &mut Sprite, rng: &mut impl Rng) {
        sprite.fill_rect(self.rect, BUILDING_COLOURS[self.skin % BUILDING_COLOURS.len()]);
        let left = self.rect.left() as i32;
        let top = self.rect.top() as i32;
        let bottom = self.rect.bottom() as i32;
        let mut y = top + 6;
        while y + 8 <= bottom {
            let mut x = left + 8;
            while x + 8 <= left + BUILDING_WIDTH as i32 - 4 {
                let colour = if rng.random_bool(0.6) { WINDOW_LIT } else { WINDOW_DARK };
                sprite.fill_rect(Rect::new(x as f32, y as f32, 6.0, 8.0), colour);
                x += 14;
            }
            y += STOREY_HEIGHT;
        }
    }
}

pub struct Skyline {
    width: u32,
    height: u32,
    buildings: Vec<Building>,
    sprite: Sprite,
    mask: Mask,
}

impl Skyline {
    /// Random skyline filling a `width` x `height` playfield
    pub fn generate(width: u32, height: u32, rng: &mut impl Rng) -> Self {
        let count = ((width as f32 / BUILDING_WIDTH).floor() as usize).max(2);
        let buildings: Vec<Building> = (0..count)
            .map(|i| {
                let h = rng
                    .random_range(BUILDING_MIN_HEIGHT..=BUILDING_MAX_HEIGHT)
                    .min(height) as f32;
                Building {
                    rect: Rect::new(i as f32 * BUILDING_WIDTH, height as f32 - h, BUILDING_WIDTH, h),
                    skin: rng.random_range(0..BUILDING_COLOURS.len()),
                }
            })
            .collect();

        let mut sprite = Sprite::new(width, height);
        for building in &buildings {
            building.draw(&mut sprite, rng);
        }
        let mask = Mask::from_sprite(&sprite);
        log::debug!("Generated skyline: {} buildings", buildings.len());

        Self {
            width,
            height,
            buildings,
            sprite,
            mask,
        }
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    /// Punch a hole: clear every pixel covered by `crater` placed with its
    /// top-left at `topleft`
    pub fn destroy(&mut self, crater: &Mask, topleft: Vec2) {
        let offset = (topleft.x.round() as i32, topleft.y.round() as i32);
        self.mask.erase(crater, offset);
        for y in 0..crater.height() as i32 {
            for x in 0..crater.width() as i32 {
                if crater.get(x, y) {
                    self.sprite.set(x + offset.0, y + offset.1, Rgba::TRANSPARENT);
                }
            }
        }
    }

    /// Solid pixels left
    pub fn solid_pixels(&self) -> usize {
        self.mask.count()
    }

    pub fn render(&self, canvas: &mut dyn Canvas, translate: Translation<'_>) {
        canvas.blit(&self.sprite, translate(Vec2::ZERO), 255);
    }
}

impl Collidable for Skyline {
    fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width as f32, self.height as f32)
    }

    fn mask(&self) -> Option<Cow<'_, Mask>> {
        Some(Cow::Borrowed(&self.mask))
    }
}
