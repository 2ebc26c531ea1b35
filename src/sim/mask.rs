//! Pixel masks for exact collision tests
//!
//! A mask is a 1-bit image: a pixel is set where the source sprite is opaque
//! enough to count as solid.

use glam::Vec2;

use crate::consts::MASK_ALPHA_THRESHOLD;
use crate::renderer::Sprite;

/// A 1-bit image, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Mask {
    /// Mask with every bit cleared
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; (width as usize) * (height as usize)],
        }
    }

    /// Mask with every bit set
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![true; (width as usize) * (height as usize)],
        }
    }

    /// Set where the sprite's alpha is above the solidity threshold
    pub fn from_sprite(sprite: &Sprite) -> Self {
        let mut mask = Self::empty(sprite.width(), sprite.height());
        for (x, y, pixel) in sprite.as_image().enumerate_pixels() {
            if pixel.0[3] > MASK_ALPHA_THRESHOLD {
                mask.set(x as i32, y as i32, true);
            }
        }
        mask
    }

    /// Filled disc inscribed in a `diameter` x `diameter` square
    pub fn filled_circle(diameter: u32) -> Self {
        let mut mask = Self::empty(diameter, diameter);
        let r = diameter as f32 / 2.0;
        let center = Vec2::splat(r);
        for y in 0..diameter as i32 {
            for x in 0..diameter as i32 {
                let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - center;
                if d.length_squared() <= r * r {
                    mask.set(x, y, true);
                }
            }
        }
        mask
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Bit at (x, y); out of bounds reads as clear
    pub fn get(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some_and(|i| self.bits[i])
    }

    pub fn set(&mut self, x: i32, y: i32, value: bool) {
        if let Some(i) = self.index(x, y) {
            self.bits[i] = value;
        }
    }

    /// Number of set bits
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Overlapping region of `self` and `other` placed at `offset` (other's
    /// top-left relative to ours), in our coordinates
    fn overlap_region(&self, other: &Mask, offset: (i32, i32)) -> (i32, i32, i32, i32) {
        let (ox, oy) = offset;
        let x0 = ox.max(0);
        let y0 = oy.max(0);
        let x1 = (ox + other.width as i32).min(self.width as i32);
        let y1 = (oy + other.height as i32).min(self.height as i32);
        (x0, y0, x1, y1)
    }

    /// Whether any set bit of `other`, placed at `offset` relative to our
    /// top-left, lands on a set bit of ours
    pub fn overlap(&self, other: &Mask, offset: (i32, i32)) -> bool {
        let (x0, y0, x1, y1) = self.overlap_region(other, offset);
        for y in y0..y1 {
            for x in x0..x1 {
                if self.get(x, y) && other.get(x - offset.0, y - offset.1) {
                    return true;
                }
            }
        }
        false
    }

    /// Clear every bit covered by a set bit of `other` placed at `offset`
    pub fn erase(&mut self, other: &Mask, offset: (i32, i32)) {
        let (x0, y0, x1, y1) = self.overlap_region(other, offset);
        for y in y0..y1 {
            for x in x0..x1 {
                if other.get(x - offset.0, y - offset.1) {
                    self.set(x, y, false);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rgba;

    #[test]
    fn test_from_sprite_threshold() {
        let mut sprite = Sprite::new(3, 1);
        sprite.set(0, 0, Rgba::new(255, 255, 255, 127));
        sprite.set(1, 0, Rgba::new(255, 255, 255, 128));
        let mask = Mask::from_sprite(&sprite);
        assert!(!mask.get(0, 0));
        assert!(mask.get(1, 0));
        assert!(!mask.get(2, 0));
        assert_eq!(mask.count(), 1);
    }

    #[test]
    fn test_overlap_with_offset() {
        let mut a = Mask::empty(4, 4);
        a.set(3, 3, true);
        let b = Mask::full(2, 2);
        assert!(a.overlap(&b, (2, 2)));
        assert!(a.overlap(&b, (3, 3)));
        assert!(!a.overlap(&b, (4, 4)));
        assert!(!a.overlap(&b, (0, 0)));
        // Negative offsets place other above/left of us
        let mut c = Mask::empty(4, 4);
        c.set(0, 0, true);
        assert!(c.overlap(&b, (-1, -1)));
        assert!(!c.overlap(&b, (-2, 0)));
    }

    #[test]
    fn test_erase() {
        let mut a = Mask::full(4, 4);
        a.erase(&Mask::full(2, 2), (1, 1));
        assert_eq!(a.count(), 12);
        assert!(!a.get(1, 1));
        assert!(!a.get(2, 2));
        assert!(a.get(3, 3));
    }

    #[test]
    fn test_filled_circle() {
        let disc = Mask::filled_circle(8);
        assert!(disc.get(4, 4));
        assert!(!disc.get(0, 0));
        assert!(disc.count() > 40 && disc.count() < 64);
    }
}
