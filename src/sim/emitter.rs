//! Particle pools
//!
//! An [`Emitter`] owns a bounded pool of live particles and the streams that
//! feed it. Each update pulls one batch from every stream, steps every live
//! particle, then drops the dead ones, always in that order.

use glam::Vec2;

use super::particle::{Particle, Step};
use super::stream::Stream;
use crate::renderer::{Canvas, Translation};

pub struct Emitter {
    /// Offset added to every particle spawned through this emitter
    position: Vec2,
    /// Spawns beyond this many live particles are dropped
    capacity: usize,
    speed_multiplier: f32,
    particles: Vec<Particle>,
    streams: Vec<Box<dyn Stream>>,
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new(Vec2::ZERO)
    }
}

impl Emitter {
    /// Unbounded emitter at `position`
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            capacity: usize::MAX,
            speed_multiplier: 1.0,
            particles: Vec::new(),
            streams: Vec::new(),
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_speed_multiplier(mut self, speed: f32) -> Self {
        self.speed_multiplier = speed;
        self
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Move the spawn origin. Live particles stay where they are.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Live particles, in spawn order
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// No live particles and nothing left to spawn
    pub fn is_finished(&self) -> bool {
        self.particles.is_empty() && self.streams.iter().all(|s| s.is_exhausted())
    }

    /// Register a stream and immediately pull up to `pre_fill` batches from it,
    /// so ambient effects can start out already populated
    pub fn add_stream(&mut self, stream: impl Stream + 'static, pre_fill: usize) {
        let mut stream: Box<dyn Stream> = Box::new(stream);
        for _ in 0..pre_fill {
            if stream.is_exhausted() {
                break;
            }
            let batch = stream.next_batch();
            self.admit(batch);
        }
        if pre_fill > 0 {
            log::debug!(
                "Stream pre-filled {} batch(es), {} live particle(s)",
                pre_fill,
                self.particles.len()
            );
        }
        self.streams.push(stream);
    }

    /// Insert an already-built particle as-is (no position offset), subject to capacity
    pub fn insert(&mut self, particle: Particle) -> bool {
        if self.particles.len() >= self.capacity {
            return false;
        }
        self.particles.push(particle);
        true
    }

    /// Offset and admit a batch, dropping whatever doesn't fit
    fn admit(&mut self, batch: Vec<Particle>) {
        let mut dropped = 0;
        for mut particle in batch {
            if self.particles.len() >= self.capacity {
                dropped += 1;
                continue;
            }
            particle.pos += self.position;
            self.particles.push(particle);
        }
        if dropped > 0 {
            log::trace!("Emitter at capacity {}: dropped {} spawn(s)", self.capacity, dropped);
        }
    }

    /// Advance one frame: spawn, step, reap
    pub fn update(&mut self, dt: f32) {
        for i in 0..self.streams.len() {
            let batch = self.streams[i].next_batch();
            self.admit(batch);
        }

        let step = Step::new(dt, self.speed_multiplier);
        for particle in self.particles.iter_mut() {
            particle.update(step);
        }

        self.particles.retain(|p| !p.killed());
    }

    /// Draw every live particle
    pub fn render(&self, canvas: &mut dyn Canvas, translate: Translation<'_>) {
        for particle in &self.particles {
            particle.render(canvas, translate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{Sprite, identity};
    use crate::sim::force::Force;
    use crate::sim::stream::{Burst, Limited};
    use crate::{Rect, Rgba};

    fn batch(n: usize) -> Vec<Particle> {
        vec![Particle::new(Vec2::ZERO); n]
    }

    #[test]
    fn test_capacity_single_batch() {
        let mut emitter = Emitter::new(Vec2::ZERO).with_capacity(100);
        emitter.add_stream(Burst::new(batch(150)), 0);
        emitter.update(0.1);
        assert_eq!(emitter.len(), 100);
    }

    #[test]
    fn test_capacity_many_batches() {
        let mut emitter = Emitter::new(Vec2::ZERO).with_capacity(100);
        emitter.add_stream(Limited::new(|| batch(10), 150), 0);
        for _ in 0..20 {
            emitter.update(0.1);
            assert!(emitter.len() <= 100);
        }
        assert_eq!(emitter.len(), 100);
    }

    #[test]
    fn test_every_stream_pulled_once_per_update() {
        use std::cell::Cell;
        use std::rc::Rc;

        let pulls = Rc::new(Cell::new(0));
        let mut emitter = Emitter::new(Vec2::ZERO);
        for _ in 0..3 {
            let p = pulls.clone();
            emitter.add_stream(
                move || -> Vec<Particle> {
                    p.set(p.get() + 1);
                    Vec::new()
                },
                0,
            );
        }
        emitter.update(0.1);
        assert_eq!(pulls.get(), 3);
        emitter.update(0.1);
        assert_eq!(pulls.get(), 6);
    }

    #[test]
    fn test_pre_fill_applies_offset_and_capacity() {
        let mut emitter = Emitter::new(Vec2::new(10.0, 20.0)).with_capacity(5);
        emitter.add_stream(|| batch(2), 4);
        assert_eq!(emitter.len(), 5);
        assert!(emitter.particles().iter().all(|p| p.pos == Vec2::new(10.0, 20.0)));
    }

    #[test]
    fn test_pre_fill_stops_at_exhaustion() {
        let mut emitter = Emitter::new(Vec2::ZERO);
        emitter.add_stream(Burst::new(batch(3)), 10);
        assert_eq!(emitter.len(), 3);
    }

    #[test]
    fn test_dead_particles_reaped_same_frame() {
        let mut emitter = Emitter::new(Vec2::ZERO);
        let bounds = Rect::new(0.0, 0.0, 10.0, 10.0);
        let particles = (0..10)
            .map(|i| {
                // Even ones start outside the bounds and die on their first step
                let x = if i % 2 == 0 { -5.0 } else { 5.0 };
                Particle::new(Vec2::new(x, 5.0)).with_force(Force::boundary(bounds, true, None))
            })
            .collect();
        emitter.add_stream(Burst::new(particles), 0);
        emitter.update(0.1);
        assert_eq!(emitter.len(), 5);
        assert!(emitter.particles().iter().all(|p| p.pos.x == 5.0));
    }

    #[test]
    fn test_speed_multiplier_reaches_particles() {
        let mut emitter = Emitter::new(Vec2::ZERO).with_speed_multiplier(3.0);
        emitter.add_stream(
            Burst::new(vec![Particle::new(Vec2::ZERO).with_velocity(Vec2::new(1.0, 0.0))]),
            0,
        );
        emitter.update(1.0);
        assert_eq!(emitter.particles()[0].pos, Vec2::new(3.0, 0.0));
    }

    #[test]
    fn test_is_finished() {
        let mut emitter = Emitter::new(Vec2::ZERO);
        let p = Particle::new(Vec2::ZERO)
            .with_force(Force::age(1.0))
            .with_force(Force::lifetime(2.0, None));
        emitter.add_stream(Burst::new(vec![p]), 0);
        assert!(!emitter.is_finished());
        emitter.update(1.0);
        assert!(!emitter.is_finished());
        emitter.update(1.0);
        assert!(emitter.is_empty());
        assert!(emitter.is_finished());
    }

    #[test]
    fn test_render_passes_through() {
        let mut emitter = Emitter::new(Vec2::ZERO);
        emitter.insert(
            Particle::new(Vec2::new(2.0, 2.0))
                .with_size(Vec2::new(1.0, 1.0))
                .with_colour(Rgba::WHITE),
        );
        let mut canvas = Sprite::new(4, 4);
        emitter.render(&mut canvas, &identity);
        assert_eq!(canvas.get(2, 2), Some(Rgba::WHITE));
    }
}
