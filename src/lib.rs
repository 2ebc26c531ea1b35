//! Gorilla Duel - a two-player artillery game
//!
//! Core modules:
//! - `sim`: Particle/force engine (particles, forces, streams, emitters, wind, timelines, masks)
//! - `renderer`: Software sprites and the canvas abstraction particles draw through
//! - `scene`: Skyline, gorillas, sky and the particle effects built on the engine
//! - `settings`: Data-driven configuration passed to constructors

pub mod error;
pub mod renderer;
pub mod scene;
pub mod settings;
pub mod sim;

pub use error::{ConfigError, SceneError, TimelineError};
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

use crate::sim::Lerp;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Guard for divisions by near-zero magnitudes (drag, growth, mass)
    pub const EPSILON: f32 = 1e-6;

    /// Alpha above which a pixel counts as solid in a mask
    pub const MASK_ALPHA_THRESHOLD: u8 = 127;

    /// Default playfield dimensions
    pub const WIDTH: f32 = 800.0;
    pub const HEIGHT: f32 = 600.0;

    /// Default gravity (pixels/s², before the speed multiplier)
    pub const GRAVITY: f32 = 9.8;
    /// Default top wind speed
    pub const MAX_WIND_SPEED: f32 = 8.0;
    /// Degrees the banana turns on every update
    pub const BANANA_SPIN: f32 = 5.0;
}

/// An RGBA colour with 8-bit channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque colour
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Copy with a different alpha channel
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

#[inline]
fn lerp_channel(a: u8, b: u8, t: f32) -> u8 {
    (a as f32 + (b as f32 - a as f32) * t).round().clamp(0.0, 255.0) as u8
}

impl From<Rgba> for image::Rgba<u8> {
    fn from(c: Rgba) -> Self {
        image::Rgba([c.r, c.g, c.b, c.a])
    }
}

impl From<image::Rgba<u8>> for Rgba {
    fn from(p: image::Rgba<u8>) -> Self {
        let [r, g, b, a] = p.0;
        Rgba::new(r, g, b, a)
    }
}

impl Lerp for Rgba {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Rgba::new(
            lerp_channel(self.r, other.r, t),
            lerp_channel(self.g, other.g, t),
            lerp_channel(self.b, other.b, t),
            lerp_channel(self.a, other.a, t),
        )
    }
}

/// Axis-aligned rectangle in screen space (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle of the given size centred on `center`
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let topleft = center - size / 2.0;
        Self::new(topleft.x, topleft.y, size.x, size.y)
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn topleft(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.w, self.h)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Half-open containment: the left/top edges are inside, right/bottom are not
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.left() && p.x < self.right() && p.y >= self.top() && p.y < self.bottom()
    }

    /// Strict overlap test. Touching edges and empty rects never intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.w <= 0.0 || self.h <= 0.0 || other.w <= 0.0 || other.h <= 0.0 {
            return false;
        }
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Copy moved by `offset`
    pub fn translate(&self, offset: Vec2) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y, self.w, self.h)
    }
}

/// Convert a launch angle (radians, counter-clockwise from +x) and power into
/// a screen-space velocity (y grows downward)
#[inline]
pub fn launch_velocity(angle: f32, power: f32) -> Vec2 {
    Vec2::new(power * angle.cos(), -power * angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_point_half_open() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains_point(Vec2::new(0.0, 0.0)));
        assert!(rect.contains_point(Vec2::new(9.99, 9.99)));
        assert!(!rect.contains_point(Vec2::new(10.0, 5.0)));
        assert!(!rect.contains_point(Vec2::new(5.0, -0.1)));
    }

    #[test]
    fn test_rect_intersects() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        // Touching edges don't count
        assert!(!a.intersects(&Rect::new(10.0, 0.0, 5.0, 5.0)));
        assert!(!a.intersects(&Rect::new(2.0, 2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_rect_from_center() {
        let rect = Rect::from_center(Vec2::new(10.0, 20.0), Vec2::new(4.0, 6.0));
        assert_eq!(rect.topleft(), Vec2::new(8.0, 17.0));
        assert_eq!(rect.center(), Vec2::new(10.0, 20.0));
    }

    #[test]
    fn test_rgba_lerp() {
        let mid = Rgba::BLACK.lerp(&Rgba::WHITE, 0.5);
        assert_eq!(mid, Rgba::rgb(128, 128, 128));
        assert_eq!(Rgba::BLACK.lerp(&Rgba::WHITE, 2.0), Rgba::WHITE);
    }

    #[test]
    fn test_launch_velocity_points_up() {
        let v = launch_velocity(std::f32::consts::FRAC_PI_2, 10.0);
        assert!(v.x.abs() < 1e-4);
        assert!((v.y + 10.0).abs() < 1e-4);
    }
}
