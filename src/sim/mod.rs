//! Particle/force simulation engine
//!
//! Every moving thing in the game is a [`Particle`] driven by an ordered list
//! of [`Force`]s and owned by exactly one [`Emitter`]:
//! - Single-threaded and frame-stepped; nothing advances outside `Emitter::update`
//! - Per update: pull one batch from every stream, step particles, reap the dead
//! - Shared mutable state is limited to the [`Wind`]

pub mod collision;
pub mod emitter;
pub mod force;
pub mod mask;
pub mod particle;
pub mod stream;
pub mod timeline;
pub mod wind;

pub use collision::{Collidable, Collider, collided};
pub use emitter::Emitter;
pub use force::{Callback, DEFAULT_GRAVITY, Fluid, Force};
pub use mask::Mask;
pub use particle::{KILLED, Particle, Step};
pub use stream::{Burst, Limited, Stream};
pub use timeline::{Keyframe, Lerp, Timeline};
pub use wind::{SharedWind, Wind, WindDirection, WindGauge};
