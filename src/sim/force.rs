//! Composable per-step behaviours
//!
//! A [`Force`] is immutable configuration plus a rule for mutating one
//! particle per step. The same force value can be attached to any number of
//! particles; cloning is cheap (shared parts sit behind `Rc`).
//!
//! Forces that kill take an optional [`Callback`], run exactly once, right
//! before the particle is marked dead.

use std::fmt;
use std::rc::Rc;

use glam::Vec2;

use super::collision::{Collider, collided};
use super::particle::{Particle, Step};
use super::timeline::Timeline;
use super::wind::SharedWind;
use crate::consts::EPSILON;
use crate::error::TimelineError;
use crate::{Rect, Rgba};

/// Notified with the particle a force is about to kill
pub type Callback = Rc<dyn Fn(&Particle)>;

/// Default gravity: 9.8 pixels/s² downward
pub const DEFAULT_GRAVITY: Vec2 = Vec2::new(0.0, 9.8);

/// Velocity of the medium a drag force acts in
#[derive(Clone)]
pub enum Fluid {
    /// Fixed velocity (zero for still air)
    Still(Vec2),
    /// Moves with the wind
    Wind(SharedWind),
}

impl Fluid {
    fn velocity(&self) -> Vec2 {
        match self {
            Fluid::Still(v) => *v,
            Fluid::Wind(wind) => wind.borrow().velocity(),
        }
    }
}

/// A per-step behaviour applied to a particle
#[derive(Clone)]
pub enum Force {
    /// `age += rate * dt`
    Age { rate: f32 },
    /// Constant acceleration
    Gravity { accel: Vec2 },
    /// Linear + quadratic drag relative to a fluid, optionally limited to a region
    Drag {
        linear: f32,
        squared: f32,
        fluid: Fluid,
        domain: Option<Rect>,
    },
    /// Colour keyed on age
    ColourChange { timeline: Rc<Timeline<Rgba>> },
    /// Alpha keyed on age
    Fade { timeline: Rc<Timeline<f32>> },
    /// Grow (or shrink) by `rate` pixels per second relative to current size
    Growth { rate: f32 },
    /// Fixed rotation per update, independent of `dt`
    Spin { degrees: f32 },
    /// Kill on leaving (`inside`) or entering (`!inside`) a rectangle
    Boundary {
        rect: Rect,
        inside: bool,
        callback: Option<Callback>,
    },
    /// Kill on pixel contact with another entity
    CollideMask {
        other: Collider,
        callback: Option<Callback>,
    },
    /// Kill once `age >= max_age`
    Lifetime {
        max_age: f32,
        callback: Option<Callback>,
    },
    /// Horizontal push from shared wind
    Wind(SharedWind),
}

impl Force {
    pub fn age(rate: f32) -> Self {
        Force::Age { rate }
    }

    pub fn gravity(accel: Vec2) -> Self {
        Force::Gravity { accel }
    }

    /// Drag against still air
    pub fn drag(linear: f32, squared: f32) -> Self {
        Force::Drag {
            linear,
            squared,
            fluid: Fluid::Still(Vec2::ZERO),
            domain: None,
        }
    }

    /// Drag with every parameter spelled out
    pub fn drag_in(linear: f32, squared: f32, fluid: Fluid, domain: Option<Rect>) -> Self {
        Force::Drag {
            linear,
            squared,
            fluid,
            domain,
        }
    }

    /// Drag against air moving with the wind
    pub fn wind_drag(wind: SharedWind, linear: f32, squared: f32) -> Self {
        Self::drag_in(linear, squared, Fluid::Wind(wind), None)
    }

    pub fn colour_change(timeline: Rc<Timeline<Rgba>>) -> Self {
        Force::ColourChange { timeline }
    }

    /// Fade from fully opaque at `start` to invisible at `start + duration`
    pub fn fade_out(duration: f32, start: f32) -> Result<Self, TimelineError> {
        let timeline = Timeline::new([(start, 255.0), (start + duration, 0.0)])?;
        Ok(Force::Fade {
            timeline: Rc::new(timeline),
        })
    }

    pub fn growth(rate: f32) -> Self {
        Force::Growth { rate }
    }

    pub fn spin(degrees: f32) -> Self {
        Force::Spin { degrees }
    }

    pub fn boundary(rect: Rect, inside: bool, callback: Option<Callback>) -> Self {
        Force::Boundary {
            rect,
            inside,
            callback,
        }
    }

    pub fn collide_mask(other: Collider, callback: Option<Callback>) -> Self {
        Force::CollideMask { other, callback }
    }

    pub fn lifetime(max_age: f32, callback: Option<Callback>) -> Self {
        Force::Lifetime { max_age, callback }
    }

    pub fn wind(wind: SharedWind) -> Self {
        Force::Wind(wind)
    }

    /// Apply this force to one particle for one step
    pub fn apply(&self, particle: &mut Particle, step: Step) {
        match self {
            Force::Age { rate } => particle.advance_age(rate * step.dt),
            Force::Gravity { accel } => {
                particle.velocity += *accel * step.dt * step.speed;
            }
            Force::Drag {
                linear,
                squared,
                fluid,
                domain,
            } => apply_drag(particle, step, *linear, *squared, fluid.velocity(), domain.as_ref()),
            Force::ColourChange { timeline } => {
                particle.set_colour(Some(timeline.at(particle.age())));
            }
            Force::Fade { timeline } => {
                particle.alpha = timeline.at(particle.age());
            }
            Force::Growth { rate } => {
                let extent = particle.size().max_element().max(EPSILON);
                let factor = 1.0 + rate * step.dt / extent;
                particle.set_scale(particle.scale() * factor);
            }
            Force::Spin { degrees } => {
                particle.set_angle(particle.angle() + degrees);
            }
            Force::Boundary {
                rect,
                inside,
                callback,
            } => {
                let in_rect = rect.contains_point(particle.pos);
                if in_rect != *inside {
                    kill(particle, callback.as_ref());
                }
            }
            Force::CollideMask { other, callback } => {
                // Particles without an image have nothing to collide with
                if !particle.has_image() {
                    return;
                }
                let hit = {
                    let other = other.borrow();
                    collided(&*other, &*particle)
                };
                if hit {
                    kill(particle, callback.as_ref());
                }
            }
            Force::Lifetime { max_age, callback } => {
                if particle.age() >= *max_age {
                    kill(particle, callback.as_ref());
                }
            }
            Force::Wind(wind) => {
                let push = wind.borrow().velocity().x;
                particle.velocity.x += step.dt * push * step.speed;
            }
        }
    }
}

fn kill(particle: &mut Particle, callback: Option<&Callback>) {
    if particle.killed() {
        return;
    }
    if let Some(callback) = callback {
        callback(particle);
    }
    particle.kill();
}

fn apply_drag(
    particle: &mut Particle,
    step: Step,
    linear: f32,
    squared: f32,
    fluid_velocity: Vec2,
    domain: Option<&Rect>,
) {
    if particle.killed() {
        return;
    }
    if domain.is_some_and(|d| !d.contains_point(particle.pos)) {
        return;
    }

    let relative = particle.velocity - fluid_velocity;
    let m = relative.length_squared();
    if m <= EPSILON {
        return;
    }
    let speed = m.sqrt();

    let magnitude = (linear * speed + squared * m) * particle.drag_coefficient;
    let dv = magnitude / particle.mass.max(EPSILON) * step.dt * step.speed;

    // Drag can bring a particle to rest relative to the fluid but never reverse it
    let dv = dv.min(speed);
    particle.velocity -= relative / speed * dv;
}

impl fmt::Debug for Force {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Force::Age { rate } => f.debug_struct("Age").field("rate", rate).finish(),
            Force::Gravity { accel } => f.debug_struct("Gravity").field("accel", accel).finish(),
            Force::Drag {
                linear,
                squared,
                domain,
                ..
            } => f
                .debug_struct("Drag")
                .field("linear", linear)
                .field("squared", squared)
                .field("domain", domain)
                .finish_non_exhaustive(),
            Force::ColourChange { .. } => f.write_str("ColourChange"),
            Force::Fade { .. } => f.write_str("Fade"),
            Force::Growth { rate } => f.debug_struct("Growth").field("rate", rate).finish(),
            Force::Spin { degrees } => f.debug_struct("Spin").field("degrees", degrees).finish(),
            Force::Boundary { rect, inside, .. } => f
                .debug_struct("Boundary")
                .field("rect", rect)
                .field("inside", inside)
                .finish_non_exhaustive(),
            Force::CollideMask { .. } => f.write_str("CollideMask"),
            Force::Lifetime { max_age, .. } => f
                .debug_struct("Lifetime")
                .field("max_age", max_age)
                .finish_non_exhaustive(),
            Force::Wind(_) => f.write_str("Wind"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::Sprite;
    use crate::sim::collision::Collidable;
    use crate::sim::mask::Mask;
    use crate::sim::wind::{Wind, WindDirection};
    use std::borrow::Cow;
    use std::cell::{Cell, RefCell};

    fn step(dt: f32) -> Step {
        Step::new(dt, 1.0)
    }

    fn counter() -> (Rc<Cell<u32>>, Callback) {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let callback: Callback = Rc::new(move |_: &Particle| c.set(c.get() + 1));
        (count, callback)
    }

    #[test]
    fn test_age() {
        let mut p = Particle::new(Vec2::ZERO);
        Force::age(2.0).apply(&mut p, step(0.25));
        assert_eq!(p.age(), 0.5);
    }

    #[test]
    fn test_gravity_scaled_by_speed() {
        let mut p = Particle::new(Vec2::ZERO);
        Force::gravity(DEFAULT_GRAVITY).apply(&mut p, Step::new(0.5, 2.0));
        assert!((p.velocity.y - 9.8).abs() < 1e-5);
        assert_eq!(p.velocity.x, 0.0);
    }

    #[test]
    fn test_drag_slows_without_reversing() {
        let mut p = Particle::new(Vec2::ZERO).with_velocity(Vec2::new(10.0, 0.0)).with_mass(1.0);
        Force::drag(0.1, 0.0).apply(&mut p, step(1.0));
        assert!((p.velocity.x - 9.0).abs() < 1e-4);

        // Enormous drag stops the particle rather than flinging it backwards
        Force::drag(1000.0, 0.0).apply(&mut p, step(1.0));
        assert!(p.velocity.x.abs() < 1e-4);
    }

    #[test]
    fn test_drag_ignores_particles_at_rest_in_fluid() {
        let mut p = Particle::new(Vec2::ZERO).with_velocity(Vec2::new(3.0, 0.0));
        Force::drag_in(1.0, 1.0, Fluid::Still(Vec2::new(3.0, 0.0)), None).apply(&mut p, step(1.0));
        assert_eq!(p.velocity, Vec2::new(3.0, 0.0));
        assert!(p.velocity.is_finite());
    }

    #[test]
    fn test_drag_domain() {
        let domain = Rect::new(100.0, 100.0, 10.0, 10.0);
        let mut p = Particle::new(Vec2::ZERO).with_velocity(Vec2::new(10.0, 0.0)).with_mass(1.0);
        Force::drag_in(0.1, 0.0, Fluid::Still(Vec2::ZERO), Some(domain)).apply(&mut p, step(1.0));
        assert_eq!(p.velocity.x, 10.0);
    }

    #[test]
    fn test_drag_coefficient_scales() {
        let mut p = Particle::new(Vec2::ZERO)
            .with_velocity(Vec2::new(10.0, 0.0))
            .with_mass(1.0)
            .with_drag(0.5);
        Force::drag(0.1, 0.0).apply(&mut p, step(1.0));
        assert!((p.velocity.x - 9.5).abs() < 1e-4);
    }

    #[test]
    fn test_colour_change() {
        let timeline = Timeline::new([(0.0, Rgba::BLACK), (2.0, Rgba::WHITE)]).unwrap();
        let mut p = Particle::new(Vec2::ZERO);
        p.advance_age(2.0);
        Force::colour_change(Rc::new(timeline)).apply(&mut p, step(0.0));
        assert_eq!(p.colour(), Some(Rgba::WHITE));
    }

    #[test]
    fn test_fade_out() {
        let fade = Force::fade_out(2.0, 1.0).unwrap();
        let mut p = Particle::new(Vec2::ZERO);
        fade.apply(&mut p, step(0.0));
        assert_eq!(p.alpha, 255.0);
        p.advance_age(2.0);
        fade.apply(&mut p, step(0.0));
        assert_eq!(p.alpha, 127.5);
        p.advance_age(5.0);
        fade.apply(&mut p, step(0.0));
        assert_eq!(p.alpha, 0.0);
    }

    #[test]
    fn test_growth() {
        let mut p = Particle::new(Vec2::ZERO).with_size(Vec2::new(10.0, 10.0));
        Force::growth(5.0).apply(&mut p, step(1.0));
        assert!((p.size().x - 15.0).abs() < 1e-4);

        // Zero-sized particles don't blow up
        let mut p = Particle::new(Vec2::ZERO).with_size(Vec2::ZERO);
        Force::growth(5.0).apply(&mut p, step(1.0));
        assert!(p.scale().is_finite());
    }

    #[test]
    fn test_spin_ignores_dt() {
        let mut p = Particle::new(Vec2::ZERO);
        Force::spin(5.0).apply(&mut p, step(0.001));
        Force::spin(5.0).apply(&mut p, step(10.0));
        assert_eq!(p.angle(), 10.0);
    }

    #[test]
    fn test_boundary_inside() {
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        let (count, callback) = counter();
        let force = Force::boundary(rect, true, Some(callback));

        let mut stays = Particle::new(Vec2::new(50.0, 50.0)).with_velocity(Vec2::new(1.0, 0.0));
        for _ in 0..10 {
            stays.update(step(1.0));
            force.apply(&mut stays, step(1.0));
        }
        assert!(!stays.killed());

        let mut leaves = Particle::new(Vec2::new(95.0, 50.0))
            .with_velocity(Vec2::new(10.0, 0.0))
            .with_force(force.clone());
        leaves.update(step(1.0));
        assert!(!leaves.killed());
        leaves.update(step(1.0));
        assert!(leaves.killed());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_boundary_outside() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let force = Force::boundary(rect, false, None);
        let mut p = Particle::new(Vec2::new(20.0, 5.0));
        force.apply(&mut p, step(1.0));
        assert!(!p.killed());
        p.pos = Vec2::new(5.0, 5.0);
        force.apply(&mut p, step(1.0));
        assert!(p.killed());
    }

    #[test]
    fn test_lifetime_after_three_ticks() {
        let (count, callback) = counter();
        let mut p = Particle::new(Vec2::ZERO)
            .with_force(Force::age(1.0))
            .with_force(Force::lifetime(3.0, Some(callback)));
        p.update(step(1.0));
        p.update(step(1.0));
        assert!(!p.killed());
        p.update(step(1.0));
        assert!(p.killed());
        p.update(step(1.0));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_wind_pushes_horizontally() {
        let wind = Wind::shared(8.0);
        wind.borrow_mut().change(Some(4.0), Some(WindDirection::Left));
        let mut p = Particle::new(Vec2::ZERO);
        Force::wind(wind).apply(&mut p, Step::new(0.5, 2.0));
        assert_eq!(p.velocity, Vec2::new(-4.0, 0.0));
    }

    #[test]
    fn test_wind_drag_tracks_wind() {
        let wind = Wind::shared(8.0);
        let drag = Force::wind_drag(wind.clone(), 1000.0, 0.0);
        let mut p = Particle::new(Vec2::ZERO).with_mass(1.0);
        wind.borrow_mut().change(Some(3.0), Some(WindDirection::Right));
        drag.apply(&mut p, step(1.0));
        // Heavy drag drags the particle up to wind speed
        assert!((p.velocity.x - 3.0).abs() < 1e-4);
    }

    struct Wall {
        rect: Rect,
        mask: Mask,
    }

    impl Collidable for Wall {
        fn rect(&self) -> Rect {
            self.rect
        }

        fn mask(&self) -> Option<Cow<'_, Mask>> {
            Some(Cow::Borrowed(&self.mask))
        }
    }

    fn wall() -> Collider {
        Rc::new(RefCell::new(Wall {
            rect: Rect::new(50.0, 0.0, 10.0, 100.0),
            mask: Mask::full(10, 100),
        }))
    }

    #[test]
    fn test_collide_mask_hits() {
        let (count, callback) = counter();
        let force = Force::collide_mask(wall(), Some(callback));
        let sprite = Rc::new(Sprite::filled(4, 4, Rgba::WHITE));

        let mut p = Particle::from_sprite(Vec2::new(10.0, 50.0), sprite.clone());
        force.apply(&mut p, step(1.0));
        assert!(!p.killed());

        p.pos = Vec2::new(50.0, 50.0);
        force.apply(&mut p, step(1.0));
        assert!(p.killed());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_collide_mask_skips_imageless_particles() {
        let (count, callback) = counter();
        let force = Force::collide_mask(wall(), Some(callback));
        let mut p = Particle::new(Vec2::new(55.0, 50.0)).with_size(Vec2::new(4.0, 4.0));
        force.apply(&mut p, step(1.0));
        assert!(!p.killed());
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_callback_sees_live_particle() {
        let seen_alive = Rc::new(Cell::new(false));
        let s = seen_alive.clone();
        let callback: Callback = Rc::new(move |p: &Particle| s.set(!p.killed()));
        let mut p = Particle::new(Vec2::ZERO).with_force(Force::lifetime(0.0, Some(callback)));
        p.update(step(1.0));
        assert!(p.killed());
        assert!(seen_alive.get());
    }
}
