//! Wind: one horizontal airflow shared by every effect
//!
//! Emitters hold the same [`SharedWind`] so clouds, debris and projectiles all
//! react to a change on the same frame. Listeners registered with
//! [`Wind::on_change`] are told about every change, in registration order.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use glam::Vec2;
use rand::Rng;

/// Handle used by forces and the scene
pub type SharedWind = Rc<RefCell<Wind>>;

/// Called after every change with the wind's new state
pub type WindListener = Box<dyn Fn(&Wind)>;

/// Which way the wind blows along x
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindDirection {
    Left,
    #[default]
    Right,
}

impl WindDirection {
    /// -1 for left, +1 for right
    #[inline]
    pub fn sign(&self) -> f32 {
        match self {
            WindDirection::Left => -1.0,
            WindDirection::Right => 1.0,
        }
    }
}

pub struct Wind {
    speed: f32,
    direction: WindDirection,
    max_speed: f32,
    listeners: Vec<WindListener>,
}

impl Wind {
    /// Calm wind that can later blow up to `max_speed`
    pub fn new(max_speed: f32) -> Self {
        Self {
            speed: 0.0,
            direction: WindDirection::default(),
            max_speed: max_speed.max(0.0),
            listeners: Vec::new(),
        }
    }

    /// Calm wind behind a shared handle
    pub fn shared(max_speed: f32) -> SharedWind {
        Rc::new(RefCell::new(Self::new(max_speed)))
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    #[inline]
    pub fn direction(&self) -> WindDirection {
        self.direction
    }

    #[inline]
    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    /// Air velocity (purely horizontal)
    #[inline]
    pub fn velocity(&self) -> Vec2 {
        Vec2::new(self.speed * self.direction.sign(), 0.0)
    }

    /// Register a listener. Listeners receive the wind, already updated, and
    /// must not borrow the shared handle themselves.
    pub fn on_change(&mut self, listener: impl Fn(&Wind) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Set speed and direction, sampling whatever isn't given: speed uniformly
    /// in `[0, max_speed]`, direction left or right with equal odds. Explicit
    /// speeds are clamped into range. Listeners are always notified, even if
    /// nothing changed.
    pub fn change(&mut self, speed: Option<f32>, direction: Option<WindDirection>) {
        let mut rng = rand::rng();
        self.speed = match speed {
            Some(speed) if speed.is_finite() => speed.clamp(0.0, self.max_speed),
            Some(_) => 0.0,
            None => rng.random_range(0.0..=self.max_speed),
        };
        self.direction = direction.unwrap_or_else(|| {
            if rng.random_bool(0.5) {
                WindDirection::Left
            } else {
                WindDirection::Right
            }
        });

        log::debug!("Wind changed: {:.2} {:?}", self.speed, self.direction);

        for listener in &self.listeners {
            listener(self);
        }
    }
}

impl fmt::Debug for Wind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wind")
            .field("speed", &self.speed)
            .field("direction", &self.direction)
            .field("max_speed", &self.max_speed)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// HUD reading of the wind, kept current through a listener
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WindGauge {
    /// Signed fraction of max speed, -1.0 (full left) to 1.0 (full right)
    pub level: f32,
}

impl WindGauge {
    /// Gauge that follows `wind` from now on
    pub fn attach(wind: &SharedWind) -> Rc<RefCell<WindGauge>> {
        let gauge = Rc::new(RefCell::new(WindGauge::default()));
        let g = gauge.clone();
        wind.borrow_mut().on_change(move |wind| {
            g.borrow_mut().read(wind);
        });
        gauge.borrow_mut().read(&wind.borrow());
        gauge
    }

    fn read(&mut self, wind: &Wind) {
        self.level = if wind.max_speed() > 0.0 {
            wind.speed() / wind.max_speed() * wind.direction().sign()
        } else {
            0.0
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_explicit_change_notifies_once_with_new_state() {
        let mut wind = Wind::new(8.0);
        let calls = Rc::new(RefCell::new(Vec::new()));
        let c = calls.clone();
        wind.on_change(move |w| c.borrow_mut().push((w.speed(), w.direction())));

        wind.change(Some(5.0), Some(WindDirection::Left));
        assert_eq!(*calls.borrow(), vec![(5.0, WindDirection::Left)]);
        assert_eq!(wind.velocity(), Vec2::new(-5.0, 0.0));
    }

    #[test]
    fn test_listeners_run_in_registration_order() {
        let mut wind = Wind::new(8.0);
        let order = Rc::new(RefCell::new(Vec::new()));
        for i in 0..3 {
            let o = order.clone();
            wind.on_change(move |_| o.borrow_mut().push(i));
        }
        wind.change(None, None);
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn test_unchanged_values_still_notify() {
        let mut wind = Wind::new(8.0);
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        wind.on_change(move |_| c.set(c.get() + 1));
        wind.change(Some(2.0), Some(WindDirection::Right));
        wind.change(Some(2.0), Some(WindDirection::Right));
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_random_change_in_range() {
        let mut wind = Wind::new(3.0);
        for _ in 0..100 {
            wind.change(None, None);
            assert!(wind.speed() >= 0.0 && wind.speed() <= 3.0);
        }
    }

    #[test]
    fn test_explicit_speed_clamped() {
        let mut wind = Wind::new(3.0);
        wind.change(Some(10.0), None);
        assert_eq!(wind.speed(), 3.0);
    }

    #[test]
    fn test_non_finite_speed_becomes_calm() {
        let mut wind = Wind::new(3.0);
        wind.change(Some(f32::NAN), Some(WindDirection::Left));
        assert_eq!(wind.speed(), 0.0);
        assert!(wind.velocity().is_finite());
        wind.change(Some(f32::INFINITY), None);
        assert_eq!(wind.speed(), 0.0);
    }

    #[test]
    fn test_gauge_follows_wind() {
        let wind = Wind::shared(8.0);
        let gauge = WindGauge::attach(&wind);
        assert_eq!(gauge.borrow().level, 0.0);
        wind.borrow_mut().change(Some(4.0), Some(WindDirection::Left));
        assert_eq!(gauge.borrow().level, -0.5);
    }
}
