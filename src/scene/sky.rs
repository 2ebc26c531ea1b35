//! Time-of-day sky
//!
//! Sky colours are a `Timeline<Gradient>` keyed on the hour; stars fade in
//! through their own timeline after sunset.

use std::borrow::Cow;
use std::cell::OnceCell;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::error::TimelineError;
use crate::renderer::Sprite;
use crate::sim::{Lerp, Timeline};
use crate::Rgba;

// Hours after midnight
const SUNRISE_START: f32 = 4.0;
const SUNRISE_SWITCH: f32 = 6.0;
const SUNRISE_END: f32 = 8.0;
const NOON: f32 = 12.0;
const SUNSET_START: f32 = 18.0;
const SUNSET_SWITCH: f32 = 20.0;
const SUNSET_END: f32 = 22.0;

const DAY_BLUE: Rgba = Rgba::rgb(76, 153, 255);
const DAY_WHITE: Rgba = Rgba::rgb(255, 255, 255);
const DAWN_PURPLE: Rgba = Rgba::rgb(204, 153, 255);
const DAWN_YELLOW: Rgba = Rgba::rgb(255, 229, 153);
const NIGHT_BLACK: Rgba = Rgba::rgb(0, 25, 76);
const NIGHT_BLUE: Rgba = Rgba::rgb(51, 153, 255);
const SUNSET_PINK: Rgba = Rgba::rgb(255, 153, 204);
const SUNSET_ORANGE: Rgba = Rgba::rgb(255, 204, 51);

/// Stars per pixel of sky
const STAR_DENSITY: f32 = 0.0005;

/// Vertical colour gradient, top colour to bottom colour
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gradient {
    pub top: Rgba,
    pub bottom: Rgba,
}

impl Gradient {
    pub const fn new(top: Rgba, bottom: Rgba) -> Self {
        Self { top, bottom }
    }

    /// Fill a `width` x `height` sprite with this gradient
    pub fn to_sprite(&self, width: u32, height: u32) -> Sprite {
        let mut sprite = Sprite::new(width, height);
        for y in 0..height {
            let colour = self.top.lerp(&self.bottom, y as f32 / height.max(1) as f32);
            for x in 0..width {
                sprite.set(x as i32, y as i32, colour);
            }
        }
        sprite
    }
}

impl Lerp for Gradient {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Gradient::new(self.top.lerp(&other.top, t), self.bottom.lerp(&other.bottom, t))
    }
}

pub struct Sky {
    gradient: Timeline<Gradient>,
    star_alpha: Timeline<f32>,
    hour: f32,
    star_seed: u64,
    /// Last rendered backdrop and its size, dropped when the hour changes
    backdrop: OnceCell<((u32, u32), Sprite)>,
}

impl Sky {
    pub fn new(hour: f32, star_seed: u64) -> Result<Self, TimelineError> {
        let gradient = Timeline::new([
            (SUNRISE_START, Gradient::new(NIGHT_BLACK, NIGHT_BLUE)),
            (SUNRISE_SWITCH, Gradient::new(DAWN_PURPLE, DAWN_YELLOW)),
            (SUNRISE_END, Gradient::new(DAY_BLUE, DAY_WHITE)),
            (SUNSET_START, Gradient::new(DAY_BLUE, DAY_WHITE)),
            (SUNSET_SWITCH, Gradient::new(SUNSET_PINK, SUNSET_ORANGE)),
            (SUNSET_END, Gradient::new(NIGHT_BLACK, NIGHT_BLUE)),
        ])?;
        // Out of order on purpose: night wraps around midnight
        let star_alpha = Timeline::new([
            (SUNSET_SWITCH, 0.0),
            (SUNSET_END, 1.0),
            (SUNRISE_START, 1.0),
            (SUNRISE_SWITCH, 0.0),
        ])?;

        let mut sky = Self {
            gradient,
            star_alpha,
            hour: NOON,
            star_seed,
            backdrop: OnceCell::new(),
        };
        sky.set_hour(hour);
        Ok(sky)
    }

    #[inline]
    pub fn hour(&self) -> f32 {
        self.hour
    }

    /// Set the time of day, wrapped into [0, 24)
    pub fn set_hour(&mut self, hour: f32) {
        self.hour = hour.rem_euclid(24.0);
        self.backdrop.take();
    }

    /// Sky colours right now
    pub fn gradient(&self) -> Gradient {
        self.gradient.at(self.hour)
    }

    /// Star visibility right now, 0.0 to 1.0
    pub fn star_alpha(&self) -> f32 {
        self.star_alpha.at(self.hour)
    }

    /// Cached backdrop for the current hour. A size other than the cached
    /// one renders afresh without replacing the cache.
    pub fn backdrop(&self, width: u32, height: u32) -> Cow<'_, Sprite> {
        let (size, sprite) = self
            .backdrop
            .get_or_init(|| ((width, height), self.to_sprite(width, height)));
        if *size == (width, height) {
            Cow::Borrowed(sprite)
        } else {
            Cow::Owned(self.to_sprite(width, height))
        }
    }

    /// Render the backdrop
    pub fn to_sprite(&self, width: u32, height: u32) -> Sprite {
        let mut sprite = self.gradient().to_sprite(width, height);

        let star_alpha = self.star_alpha();
        if star_alpha > 0.0 && width > 0 && height > 0 {
            let mut rng = Pcg32::seed_from_u64(self.star_seed);
            let stars = (width as f32 * height as f32 * STAR_DENSITY) as usize;
            for _ in 0..stars {
                let x = rng.random_range(0..width) as i32;
                let y = rng.random_range(0..height) as i32;
                let brightness: u8 = rng.random_range(1..=4);
                let star = Rgba::WHITE.with_alpha(63 + brightness.min(3) * 64);
                let alpha = (star.a as f32 * star_alpha) / 255.0;
                if let Some(bg) = sprite.get(x, y) {
                    sprite.set(x, y, bg.lerp(&Rgba::WHITE, alpha));
                }
            }
        }
        sprite
    }
}
