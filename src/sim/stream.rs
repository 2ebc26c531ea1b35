//! Spawn schedules
//!
//! A [`Stream`] yields one batch of new particles each time it is pulled. Most
//! streams never end; an empty batch just means "nothing this frame".

use super::particle::Particle;

/// A producer of particle batches, pulled once per emitter update
pub trait Stream {
    /// Particles to spawn this frame (possibly none)
    fn next_batch(&mut self) -> Vec<Particle>;

    /// Whether this stream will never produce anything again
    fn is_exhausted(&self) -> bool {
        false
    }
}

/// Any `FnMut() -> Vec<Particle>` closure is an endless stream
impl<F> Stream for F
where
    F: FnMut() -> Vec<Particle>,
{
    fn next_batch(&mut self) -> Vec<Particle> {
        self()
    }
}

/// Stops a stream after it has produced `limit` particles in total.
/// The batch that crosses the limit is truncated.
#[derive(Debug)]
pub struct Limited<S> {
    inner: S,
    remaining: usize,
}

impl<S: Stream> Limited<S> {
    pub fn new(inner: S, limit: usize) -> Self {
        Self {
            inner,
            remaining: limit,
        }
    }
}

impl<S: Stream> Stream for Limited<S> {
    fn next_batch(&mut self) -> Vec<Particle> {
        if self.is_exhausted() {
            return Vec::new();
        }
        let mut batch = self.inner.next_batch();
        batch.truncate(self.remaining);
        self.remaining -= batch.len();
        batch
    }

    fn is_exhausted(&self) -> bool {
        self.remaining == 0 || self.inner.is_exhausted()
    }
}

/// A single prepared batch, released on the first pull
#[derive(Debug, Default)]
pub struct Burst {
    batch: Option<Vec<Particle>>,
}

impl Burst {
    pub fn new(batch: Vec<Particle>) -> Self {
        Self { batch: Some(batch) }
    }
}

impl Stream for Burst {
    fn next_batch(&mut self) -> Vec<Particle> {
        self.batch.take().unwrap_or_default()
    }

    fn is_exhausted(&self) -> bool {
        self.batch.is_none()
    }
}
