//! The simulated entity every effect is built from
//!
//! A particle carries kinematic state, a visual state and an ordered list of
//! [`Force`]s. Its image (when it has one) is derived from the source sprite,
//! angle, scale and colour, and regenerated lazily after any of them change.

use std::borrow::Cow;
use std::cell::OnceCell;
use std::rc::Rc;

use glam::Vec2;

use super::collision::Collidable;
use super::force::Force;
use super::mask::Mask;
use crate::renderer::{Canvas, Sprite, Translation};
use crate::{Rect, Rgba};

/// Age value marking a killed particle
pub const KILLED: f32 = -1.0;

/// One simulation step: elapsed time plus the global speed factor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    /// Seconds since the previous step
    pub dt: f32,
    /// Global speed factor applied to integration, gravity and wind
    pub speed: f32,
}

impl Step {
    pub fn new(dt: f32, speed: f32) -> Self {
        Self { dt, speed }
    }
}

/// Cached image derived from the source sprite
#[derive(Debug, Clone)]
struct Visual {
    sprite: Sprite,
    mask: OnceCell<Mask>,
}

/// A single simulated entity
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub velocity: Vec2,
    /// Render opacity, 0-255
    pub alpha: f32,
    pub mass: f32,
    /// Per-particle multiplier on drag forces
    pub drag_coefficient: f32,
    size: Vec2,
    angle: f32,
    scale: f32,
    colour: Option<Rgba>,
    age: f32,
    source: Option<Rc<Sprite>>,
    visual: OnceCell<Visual>,
    forces: Vec<Force>,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            velocity: Vec2::ZERO,
            alpha: 255.0,
            mass: 0.0,
            drag_coefficient: 1.0,
            size: Vec2::ONE,
            angle: 0.0,
            scale: 1.0,
            colour: None,
            age: 0.0,
            source: None,
            visual: OnceCell::new(),
            forces: Vec::new(),
        }
    }
}

impl Particle {
    /// A 1x1 disc particle at `pos`
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            ..Self::default()
        }
    }

    /// A particle drawn with (and colliding through) `sprite`
    pub fn from_sprite(pos: Vec2, sprite: Rc<Sprite>) -> Self {
        Self {
            pos,
            source: Some(sprite),
            ..Self::default()
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_size(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }

    pub fn with_colour(mut self, colour: Rgba) -> Self {
        self.set_colour(Some(colour));
        self
    }

    pub fn with_angle(mut self, degrees: f32) -> Self {
        self.set_angle(degrees);
        self
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_drag(mut self, coefficient: f32) -> Self {
        self.drag_coefficient = coefficient;
        self
    }

    pub fn with_force(mut self, force: Force) -> Self {
        self.forces.push(force);
        self
    }

    pub fn with_forces(mut self, forces: impl IntoIterator<Item = Force>) -> Self {
        self.forces.extend(forces);
        self
    }

    /// Apply every force in order, then integrate position.
    ///
    /// Forces see the effects of the forces before them. Once a force kills
    /// the particle the remaining forces and the integration are skipped, so a
    /// particle is only ever killed (and its callback run) once.
    pub fn update(&mut self, step: Step) {
        if self.killed() {
            return;
        }

        let forces = std::mem::take(&mut self.forces);
        for force in &forces {
            force.apply(self, step);
            if self.killed() {
                break;
            }
        }
        self.forces = forces;

        if !self.killed() {
            self.pos += self.velocity * step.dt * step.speed;
        }
    }

    /// Mark the particle dead. Idempotent.
    pub fn kill(&mut self) {
        self.age = KILLED;
    }

    #[inline]
    pub fn killed(&self) -> bool {
        self.age == KILLED
    }

    /// Seconds of (force-driven) age, `-1` once killed
    #[inline]
    pub fn age(&self) -> f32 {
        self.age
    }

    /// Advance the age, never below zero. No effect on a killed particle.
    pub fn advance_age(&mut self, amount: f32) {
        if self.killed() {
            return;
        }
        self.age = (self.age + amount).max(0.0);
    }

    /// Rotation in degrees
    #[inline]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn set_angle(&mut self, degrees: f32) {
        self.angle = degrees;
        self.invalidate_visual();
    }

    /// Relative scale of the visual (1.0 = source size)
    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale.max(0.0);
        self.invalidate_visual();
    }

    #[inline]
    pub fn colour(&self) -> Option<Rgba> {
        self.colour
    }

    pub fn set_colour(&mut self, colour: Option<Rgba>) {
        self.colour = colour;
        self.invalidate_visual();
    }

    /// Replace the source image
    pub fn set_sprite(&mut self, sprite: Option<Rc<Sprite>>) {
        self.source = sprite;
        self.invalidate_visual();
    }

    /// Current extent. Sprite particles take it from their current image;
    /// disc particles from their base size times scale.
    pub fn size(&self) -> Vec2 {
        match self.visual() {
            Some(visual) => visual.sprite.size(),
            None => self.size * self.scale,
        }
    }

    /// Set the base size of a disc particle (sprite particles size to their image)
    pub fn set_size(&mut self, size: Vec2) {
        self.size = size;
    }

    /// Bounding rectangle, centred on the position
    pub fn rect(&self) -> Rect {
        Rect::from_center(self.pos, self.size())
    }

    /// Whether the particle has an image to run mask collisions against
    #[inline]
    pub fn has_image(&self) -> bool {
        self.source.is_some()
    }

    /// The current image, regenerated if angle, scale or colour changed
    pub fn image(&self) -> Option<&Sprite> {
        self.visual().map(|v| &v.sprite)
    }

    /// Mask of the current image
    pub fn image_mask(&self) -> Option<&Mask> {
        self.visual()
            .map(|v| v.mask.get_or_init(|| Mask::from_sprite(&v.sprite)))
    }

    fn visual(&self) -> Option<&Visual> {
        let source = self.source.as_ref()?;
        Some(self.visual.get_or_init(|| self.regenerate_visual(source)))
    }

    fn regenerate_visual(&self, source: &Sprite) -> Visual {
        let mut sprite = source.rotated(self.angle);
        if self.scale != 1.0 {
            sprite = sprite.scaled(self.scale);
        }
        if let Some(colour) = self.colour {
            sprite = sprite.tinted(colour);
        }
        Visual {
            sprite,
            mask: OnceCell::new(),
        }
    }

    #[inline]
    fn invalidate_visual(&mut self) {
        self.visual.take();
    }

    /// Draw the particle. Sprite particles blit their current image; disc
    /// particles draw a filled circle when they have a colour.
    pub fn render(&self, canvas: &mut dyn Canvas, translate: Translation<'_>) {
        let alpha = self.alpha.clamp(0.0, 255.0).round() as u8;
        if let Some(sprite) = self.image() {
            canvas.blit(sprite, translate(self.rect().topleft()), alpha);
        } else if let Some(colour) = self.colour {
            let size = self.size();
            let colour = colour.with_alpha(((colour.a as u16 * alpha as u16) / 255) as u8);
            canvas.fill_circle(translate(self.pos), size.x.max(size.y), colour);
        }
    }
}

impl Collidable for Particle {
    fn rect(&self) -> Rect {
        Particle::rect(self)
    }

    fn mask(&self) -> Option<Cow<'_, Mask>> {
        self.image_mask().map(Cow::Borrowed)
    }
}
