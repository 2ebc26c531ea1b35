//! Ambient and impact effects built on the particle engine

use std::rc::Rc;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::error::TimelineError;
use crate::renderer::Sprite;
use crate::sim::{Force, Particle, SharedWind, Stream, Timeline, WindDirection};
use crate::{Rect, Rgba};

/// Chance a cloud stream spawns on any given pull
const CLOUD_SPAWN_CHANCE: f64 = 0.95;
const CLOUD_HEIGHT: u32 = 100;
const CLOUD_ALPHA: f32 = 128.0;
/// Clouds are light and catch the wind quickly
const CLOUD_DRAG_LINEAR: f32 = 0.5;
/// Topmost row clouds spawn on
const CLOUD_MIN_Y: f32 = 60.0;

const DEBRIS_CHANCE: f64 = 0.1;

/// Seconds a spark lives
const SPARK_LIFETIME: f32 = 1.5;
const SPARK_FADE_START: f32 = 0.5;
const SPARK_MIN_SPEED: f32 = 10.0;
const SPARK_MAX_SPEED: f32 = 60.0;

const BANANA_SIZE: u32 = 14;
const BANANA_YELLOW: Rgba = Rgba::rgb(255, 224, 64);

/// Procedural cloud: a row of white puffs, fattest in the middle
pub fn cloud_sprite(width: u32, height: u32, rng: &mut impl Rng) -> Sprite {
    let mut sprite = Sprite::new(width, height);
    let half_width = width as f32 / 2.0;
    let margin = (width / 10).max(1);
    if width <= margin * 2 {
        return sprite;
    }
    for _ in 0..rng.random_range(20..=40) {
        let x = rng.random_range(margin..width - margin) as f32;
        let from_center = (half_width - x).abs();
        let scale = rng.random::<f32>() + 2.0 * (1.0 / (from_center + 1.0)).sin();
        let radius = (margin as f32 * scale).max(1.0);
        sprite.draw_circle(Vec2::new(x, height as f32 - 2.0), radius, Rgba::WHITE);
    }
    sprite
}

/// Endless stream of clouds drifting in from the upwind edge of `bounds`
pub struct CloudStream {
    wind: SharedWind,
    bounds: Rect,
    rng: Pcg32,
    /// Clouds still to place anywhere across the bounds before edge spawning starts
    scatter: usize,
}

impl CloudStream {
    pub fn new(wind: SharedWind, bounds: Rect, seed: u64) -> Self {
        Self {
            wind,
            bounds,
            rng: Pcg32::seed_from_u64(seed),
            scatter: 0,
        }
    }

    /// Make the first `count` pulls each yield one cloud at a random spot,
    /// so a pre-filled sky doesn't start out empty in the middle
    pub fn scattered(mut self, count: usize) -> Self {
        self.scatter = count;
        self
    }

    fn cloud(&mut self, pos: Vec2) -> Particle {
        let width = self.rng.random_range(100..300);
        let sprite = cloud_sprite(width, CLOUD_HEIGHT, &mut self.rng);
        Particle::from_sprite(pos, Rc::new(sprite))
            .with_mass(1.0)
            .with_alpha(CLOUD_ALPHA)
            .with_drag(self.rng.random_range(0.4..0.8))
            .with_forces([
                Force::wind_drag(self.wind.clone(), CLOUD_DRAG_LINEAR, 0.0),
                Force::boundary(self.bounds, true, None),
            ])
    }

    fn spawn_y(&mut self) -> f32 {
        let lowest = (self.bounds.h / 4.0).max(CLOUD_MIN_Y + 1.0);
        self.rng.random_range(CLOUD_MIN_Y..lowest)
    }
}

impl Stream for CloudStream {
    fn next_batch(&mut self) -> Vec<Particle> {
        if self.scatter > 0 {
            self.scatter -= 1;
            let x = self.rng.random_range(self.bounds.left()..self.bounds.right());
            let y = self.spawn_y();
            return vec![self.cloud(Vec2::new(x, y))];
        }
        if !self.rng.random_bool(CLOUD_SPAWN_CHANCE) {
            return Vec::new();
        }
        let x = match self.wind.borrow().direction() {
            WindDirection::Left => self.bounds.right() - 1.0,
            WindDirection::Right => self.bounds.left(),
        };
        let y = self.spawn_y();
        vec![self.cloud(Vec2::new(x, y))]
    }
}

/// Specks blown across the screen, more of them the stronger the wind
pub struct DebrisStream {
    wind: SharedWind,
    bounds: Rect,
    rng: Pcg32,
}

impl DebrisStream {
    pub fn new(wind: SharedWind, bounds: Rect, seed: u64) -> Self {
        Self {
            wind,
            bounds,
            rng: Pcg32::seed_from_u64(seed),
        }
    }
}

impl Stream for DebrisStream {
    fn next_batch(&mut self) -> Vec<Particle> {
        let (speed, max_speed, direction) = {
            let wind = self.wind.borrow();
            (wind.speed(), wind.max_speed(), wind.direction())
        };
        let gust = self.rng.random_range(0.0..=max_speed);
        if gust >= speed || !self.rng.random_bool(DEBRIS_CHANCE) {
            return Vec::new();
        }

        let x = match direction {
            WindDirection::Left => self.bounds.right() - 1.0,
            WindDirection::Right => self.bounds.left(),
        };
        let y = self.rng.random_range(self.bounds.top()..self.bounds.bottom());
        vec![
            Particle::new(Vec2::new(x, y))
                .with_colour(Rgba::BLACK)
                .with_forces([Force::wind(self.wind.clone()), Force::boundary(self.bounds, true, None)]),
        ]
    }
}

/// Shared look of every explosion: one colour ramp and fade for all sparks
#[derive(Debug, Clone)]
pub struct ExplosionStyle {
    colours: Rc<Timeline<Rgba>>,
    fade: Force,
    gravity: Vec2,
    bounds: Rect,
}

impl ExplosionStyle {
    pub fn new(gravity: f32, bounds: Rect) -> Result<Self, TimelineError> {
        let colours = Timeline::new([
            (0.0, Rgba::rgb(255, 255, 192)),
            (0.2, Rgba::rgb(255, 192, 32)),
            (0.6, Rgba::rgb(224, 64, 16)),
            (SPARK_LIFETIME, Rgba::rgb(64, 64, 64)),
        ])?;
        Ok(Self {
            colours: Rc::new(colours),
            fade: Force::fade_out(SPARK_LIFETIME - SPARK_FADE_START, SPARK_FADE_START)?,
            gravity: Vec2::new(0.0, gravity),
            bounds,
        })
    }

    /// `count` sparks flying out from the origin in every direction
    pub fn sparks(&self, count: usize, rng: &mut impl Rng) -> Vec<Particle> {
        (0..count)
            .map(|_| {
                let heading = rng.random_range(0.0..std::f32::consts::TAU);
                let speed = rng.random_range(SPARK_MIN_SPEED..SPARK_MAX_SPEED);
                let radius = rng.random_range(1.0..3.0);
                Particle::new(Vec2::ZERO)
                    .with_velocity(Vec2::from_angle(heading) * speed)
                    .with_size(Vec2::splat(radius))
                    .with_mass(0.5)
                    .with_forces([
                        Force::age(1.0),
                        Force::gravity(self.gravity),
                        Force::drag(0.2, 0.0),
                        Force::colour_change(self.colours.clone()),
                        self.fade.clone(),
                        Force::lifetime(SPARK_LIFETIME, None),
                        Force::boundary(self.bounds, true, None),
                    ])
            })
            .collect()
    }
}

/// A small yellow crescent
pub fn banana_sprite() -> Sprite {
    let size = BANANA_SIZE as f32;
    let mut sprite = Sprite::new(BANANA_SIZE, BANANA_SIZE);
    sprite.draw_circle(Vec2::splat(size / 2.0), size / 2.0, BANANA_YELLOW);
    sprite.draw_circle(Vec2::new(size / 2.0 + 3.0, size / 2.0 - 3.0), size / 2.0, Rgba::TRANSPARENT);
    sprite
}
