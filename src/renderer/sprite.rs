//! In-memory RGBA images
//!
//! Thin game-facing wrapper over [`image::RgbaImage`]: procedural drawing,
//! rotation, scaling, tinting and alpha blending.

use glam::Vec2;
use image::imageops::{self, FilterType};
use image::{Pixel, RgbaImage};

use super::Canvas;
use crate::{Rect, Rgba};

/// An RGBA pixel buffer
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    image: RgbaImage,
}

impl Sprite {
    /// Fully transparent sprite
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Rgba::TRANSPARENT)
    }

    /// Sprite where every pixel is `colour`
    pub fn filled(width: u32, height: u32, colour: Rgba) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, colour.into()),
        }
    }

    /// The underlying pixel buffer
    #[inline]
    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width() as f32, self.height() as f32)
    }

    #[inline]
    fn coords(&self, x: i32, y: i32) -> Option<(u32, u32)> {
        if x < 0 || y < 0 || x >= self.width() as i32 || y >= self.height() as i32 {
            return None;
        }
        Some((x as u32, y as u32))
    }

    /// Pixel at (x, y), `None` outside the sprite
    pub fn get(&self, x: i32, y: i32) -> Option<Rgba> {
        self.coords(x, y)
            .map(|(x, y)| Rgba::from(*self.image.get_pixel(x, y)))
    }

    /// Overwrite a pixel. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: i32, y: i32, colour: Rgba) {
        if let Some((x, y)) = self.coords(x, y) {
            self.image.put_pixel(x, y, colour.into());
        }
    }

    /// Overwrite every pixel whose centre lies inside the disc
    pub fn draw_circle(&mut self, center: Vec2, radius: f32, colour: Rgba) {
        for (x, y) in disc_pixels(center, radius) {
            self.set(x, y, colour);
        }
    }

    /// Overwrite every pixel inside `rect`
    pub fn fill_rect(&mut self, rect: Rect, colour: Rgba) {
        let x0 = rect.left().round() as i32;
        let x1 = rect.right().round() as i32;
        let y0 = rect.top().round() as i32;
        let y1 = rect.bottom().round() as i32;
        for y in y0..y1 {
            for x in x0..x1 {
                self.set(x, y, colour);
            }
        }
    }

    /// Rotate counter-clockwise by `degrees`. The result grows to fit the
    /// rotated corners; uncovered pixels are transparent.
    pub fn rotated(&self, degrees: f32) -> Sprite {
        if degrees.rem_euclid(360.0) == 0.0 {
            return self.clone();
        }
        let (sin, cos) = degrees.to_radians().sin_cos();
        let (w, h) = (self.width() as f32, self.height() as f32);
        // Shave float noise so exact quarter turns don't gain a pixel
        let new_w = (w * cos.abs() + h * sin.abs() - 1e-3).ceil().max(1.0) as u32;
        let new_h = (w * sin.abs() + h * cos.abs() - 1e-3).ceil().max(1.0) as u32;

        let src_center = Vec2::new(w / 2.0, h / 2.0);
        let dst_center = Vec2::new(new_w as f32 / 2.0, new_h as f32 / 2.0);
        let image = RgbaImage::from_fn(new_w, new_h, |x, y| {
            let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - dst_center;
            // Inverse of the screen-space (y down) counter-clockwise rotation
            let s = Vec2::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos) + src_center;
            self.get(s.x.floor() as i32, s.y.floor() as i32)
                .unwrap_or(Rgba::TRANSPARENT)
                .into()
        });
        Sprite { image }
    }

    /// Nearest-neighbour rescale. A factor of zero yields a 0x0 sprite.
    pub fn scaled(&self, factor: f32) -> Sprite {
        if factor == 1.0 {
            return self.clone();
        }
        let factor = factor.max(0.0);
        let new_w = (self.width() as f32 * factor).round() as u32;
        let new_h = (self.height() as f32 * factor).round() as u32;
        if new_w == 0 || new_h == 0 || self.width() == 0 || self.height() == 0 {
            return Sprite::new(new_w, new_h);
        }
        Sprite {
            image: imageops::resize(&self.image, new_w, new_h, FilterType::Nearest),
        }
    }

    /// Multiply the colour channels by `colour`, keeping per-pixel alpha
    pub fn tinted(&self, colour: Rgba) -> Sprite {
        let tint: image::Rgba<u8> = colour.with_alpha(255).into();
        let mut image = self.image.clone();
        for pixel in image.pixels_mut() {
            pixel.apply2(&tint, |p, t| ((p as u16 * t as u16 + 127) / 255) as u8);
        }
        Sprite { image }
    }

    /// Copy with every pixel's alpha scaled by `alpha / 255`
    fn faded(&self, alpha: u8) -> RgbaImage {
        let mut image = self.image.clone();
        for pixel in image.pixels_mut() {
            pixel.0[3] = ((pixel.0[3] as u16 * alpha as u16 + 127) / 255) as u8;
        }
        image
    }
}

/// Pixels whose centre lies inside the disc
fn disc_pixels(center: Vec2, radius: f32) -> impl Iterator<Item = (i32, i32)> {
    let r2 = radius * radius;
    let x0 = (center.x - radius).floor() as i32;
    let x1 = (center.x + radius).ceil() as i32;
    let y0 = (center.y - radius).floor() as i32;
    let y1 = (center.y + radius).ceil() as i32;
    (y0..=y1)
        .flat_map(move |y| (x0..=x1).map(move |x| (x, y)))
        .filter(move |&(x, y)| {
            radius > 0.0
                && (Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - center).length_squared() <= r2
        })
}

impl Canvas for Sprite {
    fn blit(&mut self, sprite: &Sprite, topleft: Vec2, alpha: u8) {
        if alpha == 0 {
            return;
        }
        let x = topleft.x.round() as i64;
        let y = topleft.y.round() as i64;
        if alpha == 255 {
            imageops::overlay(&mut self.image, &sprite.image, x, y);
        } else {
            imageops::overlay(&mut self.image, &sprite.faded(alpha), x, y);
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, colour: Rgba) {
        let src: image::Rgba<u8> = colour.into();
        for (x, y) in disc_pixels(center, radius) {
            if let Some((x, y)) = self.coords(x, y) {
                self.image.get_pixel_mut(x, y).blend(&src);
            }
        }
    }
}
