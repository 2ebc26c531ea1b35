//! Keyframe interpolation
//!
//! A [`Timeline`] maps a time value to an interpolated value from a sorted set
//! of keyframes. It is immutable once built and clamps outside its range.

use glam::Vec2;

use crate::error::TimelineError;

/// Values that know how to blend toward another value
pub trait Lerp {
    /// Blend from `self` (t = 0) to `other` (t = 1)
    fn lerp(&self, other: &Self, t: f32) -> Self;
}

impl Lerp for f32 {
    #[inline]
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + t * (other - self)
    }
}

impl Lerp for f64 {
    #[inline]
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + t as f64 * (other - self)
    }
}

impl Lerp for Vec2 {
    #[inline]
    fn lerp(&self, other: &Self, t: f32) -> Self {
        *self + (*other - *self) * t
    }
}

/// Interpolation function used between two keyframes
pub type LerpFn<T> = fn(&T, &T, f32) -> T;

/// A value at a point in time
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframe<T> {
    pub timestamp: f32,
    pub value: T,
}

/// Ascending keyframes plus the function used to blend between them
#[derive(Debug, Clone)]
pub struct Timeline<T> {
    keyframes: Vec<Keyframe<T>>,
    lerp: LerpFn<T>,
}

impl<T: Lerp + Clone> Timeline<T> {
    /// Build a timeline that blends with the value type's own [`Lerp`].
    /// Keyframes may be given in any order.
    pub fn new(keyframes: impl IntoIterator<Item = (f32, T)>) -> Result<Self, TimelineError> {
        Self::with_lerp(keyframes, T::lerp)
    }
}

impl<T: Clone> Timeline<T> {
    /// Build a timeline with an explicit interpolation function
    pub fn with_lerp(
        keyframes: impl IntoIterator<Item = (f32, T)>,
        lerp: LerpFn<T>,
    ) -> Result<Self, TimelineError> {
        let mut keyframes: Vec<Keyframe<T>> = keyframes
            .into_iter()
            .map(|(timestamp, value)| Keyframe { timestamp, value })
            .collect();

        if keyframes.is_empty() {
            return Err(TimelineError::Empty);
        }
        if let Some(bad) = keyframes.iter().find(|k| !k.timestamp.is_finite()) {
            return Err(TimelineError::NonFiniteTimestamp(bad.timestamp));
        }

        // Stable: equal timestamps keep their input order
        keyframes.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));

        Ok(Self { keyframes, lerp })
    }

    /// Value at `timestamp`. Clamps to the first/last keyframe outside the range.
    pub fn at(&self, timestamp: f32) -> T {
        let first = &self.keyframes[0];
        if timestamp <= first.timestamp {
            return first.value.clone();
        }
        let last = &self.keyframes[self.keyframes.len() - 1];
        if timestamp >= last.timestamp || timestamp.is_nan() {
            return last.value.clone();
        }

        // first.timestamp < timestamp < last.timestamp, so 1 <= idx < len
        let idx = self.keyframes.partition_point(|k| k.timestamp <= timestamp);
        let start = &self.keyframes[idx - 1];
        let end = &self.keyframes[idx];

        let quotient = (timestamp - start.timestamp) / (end.timestamp - start.timestamp);
        (self.lerp)(&start.value, &end.value, quotient)
    }

    /// Keyframes in ascending timestamp order
    pub fn keyframes(&self) -> &[Keyframe<T>] {
        &self.keyframes
    }

    /// Timestamp of the first keyframe
    pub fn start(&self) -> f32 {
        self.keyframes[0].timestamp
    }

    /// Timestamp of the last keyframe
    pub fn end(&self) -> f32 {
        self.keyframes[self.keyframes.len() - 1].timestamp
    }
}
