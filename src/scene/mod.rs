//! The game world: skyline, gorillas, weather and the banana in flight
//!
//! Everything that moves is a particle in one of the scene's emitters. A throw
//! reports its outcome through force callbacks, which queue [`ThrowEvent`]s
//! that [`Scene::update`] hands back to the caller once the frame is stepped.

pub mod effects;
pub mod gorilla;
pub mod sky;
pub mod skyline;

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::BANANA_SPIN;
use crate::error::SceneError;
use crate::renderer::{Canvas, Sprite, Translation};
use crate::settings::Settings;
use crate::sim::{
    Burst, Callback, Collider, Emitter, Force, Particle, SharedWind, Wind, WindDirection, WindGauge,
};
use crate::{Rect, launch_velocity};

pub use effects::{CloudStream, DebrisStream, ExplosionStyle};
pub use gorilla::{Crater, Gorilla};
pub use sky::{Gradient, Sky};
pub use skyline::{Building, Skyline};

/// Ambient effects may drift this far past either side of the screen
const AMBIENT_MARGIN: f32 = 150.0;
const BANANA_MASS: f32 = 2.0;
const BANANA_DRAG: f32 = 0.3;
const AIR_DRAG_LINEAR: f32 = 0.01;
const AIR_DRAG_SQUARED: f32 = 0.0005;

/// How a throw ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThrowEvent {
    /// The banana struck a building at `pos`
    HitSkyline { pos: Vec2 },
    /// `player`'s banana struck the other gorilla
    HitOpponent { player: usize },
    /// The banana left the playfield
    OutOfBounds,
}

pub struct Scene {
    settings: Settings,
    rng: Pcg32,
    wind: SharedWind,
    wind_gauge: Rc<RefCell<WindGauge>>,
    sky: Sky,
    skyline: Rc<RefCell<Skyline>>,
    gorillas: [Rc<RefCell<Gorilla>>; 2],
    clouds: Emitter,
    debris: Emitter,
    explosions: Vec<Emitter>,
    explosion_style: ExplosionStyle,
    banana: Option<Emitter>,
    banana_sprite: Rc<Sprite>,
    events: Rc<RefCell<Vec<ThrowEvent>>>,
    current_player: usize,
}

impl Scene {
    /// Build a fresh world. Everything random derives from `seed`, except
    /// wind changes which sample the thread rng.
    pub fn new(settings: Settings, seed: u64) -> Result<Self, SceneError> {
        settings.validate()?;
        let mut rng = Pcg32::seed_from_u64(seed);
        let (width, height) = (settings.width, settings.height);
        let ambient = Rect::new(-AMBIENT_MARGIN, 0.0, width + AMBIENT_MARGIN * 2.0, height);

        let wind = Wind::shared(settings.max_wind_speed);
        let wind_gauge = WindGauge::attach(&wind);
        let sky = Sky::new(12.0, rng.random())?;

        let skyline = Skyline::generate(width as u32, height as u32, &mut rng);
        let gorillas = place_gorillas(&skyline);

        let speed = settings.speed_multiplier;
        let max_clouds = settings.quality.max_clouds();
        let mut clouds = Emitter::new(Vec2::ZERO)
            .with_capacity(max_clouds)
            .with_speed_multiplier(speed);
        clouds.add_stream(
            CloudStream::new(wind.clone(), ambient, rng.random()).scattered(max_clouds),
            max_clouds,
        );
        let mut debris = Emitter::new(Vec2::ZERO)
            .with_capacity(settings.quality.max_debris())
            .with_speed_multiplier(speed);
        debris.add_stream(DebrisStream::new(wind.clone(), ambient, rng.random()), 0);

        let explosion_style = ExplosionStyle::new(settings.gravity, ambient)?;

        log::info!(
            "Scene ready: {}x{}, quality {}, speed x{}",
            width,
            height,
            settings.quality.as_str(),
            speed
        );

        Ok(Self {
            settings,
            rng,
            wind,
            wind_gauge,
            sky,
            skyline: Rc::new(RefCell::new(skyline)),
            gorillas: gorillas.map(|g| Rc::new(RefCell::new(g))),
            clouds,
            debris,
            explosions: Vec::new(),
            explosion_style,
            banana: None,
            banana_sprite: Rc::new(effects::banana_sprite()),
            events: Rc::new(RefCell::new(Vec::new())),
            current_player: 0,
        })
    }

    #[inline]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn wind(&self) -> &SharedWind {
        &self.wind
    }

    /// Signed wind reading for the HUD, -1.0 to 1.0
    pub fn wind_level(&self) -> f32 {
        self.wind_gauge.borrow().level
    }

    pub fn sky(&self) -> &Sky {
        &self.sky
    }

    pub fn skyline(&self) -> &Rc<RefCell<Skyline>> {
        &self.skyline
    }

    pub fn gorilla_pos(&self, player: usize) -> Vec2 {
        self.gorillas[player % 2].borrow().pos
    }

    #[inline]
    pub fn current_player(&self) -> usize {
        self.current_player
    }

    /// Hand the turn to the other player
    pub fn next_player(&mut self) {
        self.current_player = (self.current_player + 1) % 2;
        log::debug!("Player {} to throw", self.current_player + 1);
    }

    /// New random wind
    pub fn change_wind(&mut self) {
        self.wind.borrow_mut().change(None, None);
    }

    /// Set the wind explicitly
    pub fn set_wind(&mut self, speed: f32, direction: WindDirection) {
        self.wind.borrow_mut().change(Some(speed), Some(direction));
    }

    pub fn set_hour(&mut self, hour: f32) {
        self.sky.set_hour(hour);
    }

    /// Fresh skyline with both gorillas back on their roofs. Any throw in
    /// flight and all explosions are discarded.
    pub fn rebuild(&mut self) {
        let skyline = Skyline::generate(
            self.settings.width as u32,
            self.settings.height as u32,
            &mut self.rng,
        );
        let [left, right] = place_gorillas(&skyline);
        *self.skyline.borrow_mut() = skyline;
        *self.gorillas[0].borrow_mut() = left;
        *self.gorillas[1].borrow_mut() = right;
        self.banana = None;
        self.explosions.clear();
        self.events.borrow_mut().clear();
        log::info!("Skyline rebuilt");
    }

    #[inline]
    pub fn throw_in_flight(&self) -> bool {
        self.banana.is_some()
    }

    /// The banana, while it flies
    pub fn banana(&self) -> Option<&Particle> {
        self.banana.as_ref().and_then(|e| e.particles().first())
    }

    pub fn explosion_count(&self) -> usize {
        self.explosions.len()
    }

    pub fn cloud_count(&self) -> usize {
        self.clouds.len()
    }

    pub fn debris_count(&self) -> usize {
        self.debris.len()
    }

    /// Launch a banana from the current player. `angle` is in radians,
    /// counter-clockwise from the positive x axis. Returns false while a
    /// throw is already in flight.
    pub fn throw_banana(&mut self, angle: f32, power: f32) -> bool {
        if self.banana.is_some() {
            log::warn!("Throw ignored: banana already in flight");
            return false;
        }

        let player = self.current_player;
        let thrower = self.gorilla_pos(player);
        let skyline: Collider = self.skyline.clone();
        let opponent: Collider = self.gorillas[(player + 1) % 2].clone();
        let field = Rect::new(
            0.0,
            -self.settings.height,
            self.settings.width,
            self.settings.height * 2.0,
        );

        let banana = Particle::from_sprite(Vec2::ZERO, self.banana_sprite.clone())
            .with_velocity(launch_velocity(angle, power))
            .with_mass(BANANA_MASS)
            .with_drag(BANANA_DRAG)
            .with_forces([
                Force::wind_drag(self.wind.clone(), AIR_DRAG_LINEAR, AIR_DRAG_SQUARED),
                Force::boundary(field, true, Some(self.report(|_| ThrowEvent::OutOfBounds))),
                Force::collide_mask(
                    skyline,
                    Some(self.report(|p| ThrowEvent::HitSkyline { pos: p.pos })),
                ),
                Force::collide_mask(
                    opponent,
                    Some(self.report(move |_| ThrowEvent::HitOpponent { player })),
                ),
                Force::gravity(Vec2::new(0.0, self.settings.gravity)),
                Force::spin(BANANA_SPIN),
            ]);

        let mut emitter = Emitter::new(thrower)
            .with_capacity(1)
            .with_speed_multiplier(self.settings.speed_multiplier);
        emitter.add_stream(Burst::new(vec![banana]), 1);
        self.banana = Some(emitter);

        log::info!(
            "Player {} throws: angle {:.1}°, power {:.0}",
            player + 1,
            angle.to_degrees(),
            power
        );
        true
    }

    /// Callback that queues the event built from the dying particle
    fn report(&self, event: impl Fn(&Particle) -> ThrowEvent + 'static) -> Callback {
        let events = self.events.clone();
        Rc::new(move |particle: &Particle| events.borrow_mut().push(event(particle)))
    }

    /// Advance the world by `dt` seconds and return how any throw ended
    pub fn update(&mut self, dt: f32) -> Vec<ThrowEvent> {
        self.clouds.update(dt);
        self.debris.update(dt);
        for explosion in &mut self.explosions {
            explosion.update(dt);
        }
        if let Some(banana) = &mut self.banana {
            banana.update(dt);
        }

        let events: Vec<ThrowEvent> = self.events.borrow_mut().drain(..).collect();
        for event in &events {
            match *event {
                ThrowEvent::HitSkyline { pos } => {
                    log::info!("Banana hit the skyline at ({:.0}, {:.0})", pos.x, pos.y);
                    self.explode(pos);
                }
                ThrowEvent::HitOpponent { player } => {
                    log::info!("Player {} hit the opponent", player + 1);
                }
                ThrowEvent::OutOfBounds => log::info!("Banana flew out of bounds"),
            }
        }

        if self.banana.as_ref().is_some_and(Emitter::is_finished) {
            self.banana = None;
        }
        let before = self.explosions.len();
        self.explosions.retain(|e| !e.is_finished());
        if self.explosions.len() < before {
            log::debug!("Retired {} explosion(s)", before - self.explosions.len());
        }

        events
    }

    /// Blow a crater out of the skyline and throw sparks
    fn explode(&mut self, pos: Vec2) {
        let crater = Crater::new(pos);
        self.skyline
            .borrow_mut()
            .destroy(crater.shape(), crater.topleft());

        let sparks = self
            .explosion_style
            .sparks(self.settings.quality.explosion_particles(), &mut self.rng);
        let mut emitter = Emitter::new(pos).with_speed_multiplier(self.settings.speed_multiplier);
        emitter.add_stream(Burst::new(sparks), 0);
        self.explosions.push(emitter);
        log::debug!("Explosion at ({:.0}, {:.0}), {} burning", pos.x, pos.y, self.explosions.len());
    }

    /// Draw back to front: sky, skyline, effects, gorillas
    pub fn render(&self, canvas: &mut dyn Canvas, translate: Translation<'_>) {
        let sky = self
            .sky
            .backdrop(self.settings.width as u32, self.settings.height as u32);
        canvas.blit(&sky, translate(Vec2::ZERO), 255);
        self.skyline.borrow().render(canvas, translate);
        self.clouds.render(canvas, translate);
        self.debris.render(canvas, translate);
        for explosion in &self.explosions {
            explosion.render(canvas, translate);
        }
        if let Some(banana) = &self.banana {
            banana.render(canvas, translate);
        }
        for gorilla in &self.gorillas {
            gorilla.borrow().render(canvas, translate);
        }
    }
}

/// One gorilla on the first roof, one on the last
fn place_gorillas(skyline: &Skyline) -> [Gorilla; 2] {
    let buildings = skyline.buildings();
    let height = gorilla::GORILLA_SIZE as f32;
    let spot = |b: Option<&Building>| b.map(|b| b.roof_spot(height)).unwrap_or_default();
    [
        Gorilla::new(spot(buildings.first())),
        Gorilla::new(spot(buildings.last())),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigError;
    use crate::consts::SIM_DT;
    use crate::renderer::identity;
    use std::f32::consts::FRAC_PI_2;

    fn scene() -> Scene {
        let mut scene = Scene::new(Settings::default(), 42).unwrap();
        scene.set_wind(0.0, WindDirection::Right);
        scene
    }

    /// Step until the throw ends, returning its events
    fn fly(scene: &mut Scene) -> Vec<ThrowEvent> {
        for _ in 0..3600 {
            let events = scene.update(SIM_DT);
            if !events.is_empty() {
                return events;
            }
        }
        panic!("throw never ended");
    }

    #[test]
    fn test_new_rejects_invalid_settings() {
        let settings = Settings {
            max_wind_speed: f32::INFINITY,
            ..Settings::default()
        };
        assert!(matches!(
            Scene::new(settings, 1),
            Err(SceneError::Config(ConfigError::Invalid(_)))
        ));

        let settings = Settings {
            height: 0.0,
            ..Settings::default()
        };
        assert!(matches!(
            Scene::new(settings, 1),
            Err(SceneError::Config(ConfigError::Invalid(_)))
        ));
    }

    #[test]
    fn test_gorillas_on_outer_roofs() {
        let scene = scene();
        let skyline = scene.skyline().borrow();
        let first = skyline.buildings()[0];
        let last = *skyline.buildings().last().unwrap();
        assert_eq!(scene.gorilla_pos(0).x, first.rect.center().x);
        assert_eq!(scene.gorilla_pos(1).x, last.rect.center().x);
        assert!(scene.gorilla_pos(0).y < first.rect.top());
    }

    #[test]
    fn test_clouds_prefilled() {
        let scene = scene();
        assert_eq!(scene.cloud_count(), scene.settings().quality.max_clouds());
    }

    #[test]
    fn test_straight_up_leaves_bounds() {
        let mut scene = scene();
        assert!(scene.throw_banana(FRAC_PI_2, 200.0));
        assert!(scene.throw_in_flight());
        assert_eq!(fly(&mut scene), vec![ThrowEvent::OutOfBounds]);
        assert!(!scene.throw_in_flight());
        assert_eq!(scene.explosion_count(), 0);
    }

    #[test]
    fn test_one_throw_at_a_time() {
        let mut scene = scene();
        assert!(scene.throw_banana(FRAC_PI_2, 200.0));
        assert!(!scene.throw_banana(0.0, 50.0));
    }

    #[test]
    fn test_lob_onto_own_roof_makes_crater() {
        let mut scene = scene();
        let before = scene.skyline().borrow().solid_pixels();
        scene.throw_banana(0.0, 10.0);
        let events = fly(&mut scene);
        assert!(matches!(events[..], [ThrowEvent::HitSkyline { .. }]));
        assert!(scene.skyline().borrow().solid_pixels() < before);
        assert_eq!(scene.explosion_count(), 1);
        assert!(!scene.throw_in_flight());

        // Sparks burn out and the explosion is retired
        for _ in 0..300 {
            scene.update(SIM_DT);
        }
        assert_eq!(scene.explosion_count(), 0);
    }

    #[test]
    fn test_hit_opponent() {
        let mut scene = scene();
        // Stand the opponent right where the banana is released
        let thrower = scene.gorilla_pos(0);
        scene.gorillas[1].borrow_mut().pos = thrower;
        scene.throw_banana(0.0, 100.0);
        assert_eq!(fly(&mut scene), vec![ThrowEvent::HitOpponent { player: 0 }]);
    }

    #[test]
    fn test_next_player_throws_from_other_side() {
        let mut scene = scene();
        scene.next_player();
        assert_eq!(scene.current_player(), 1);
        scene.throw_banana(FRAC_PI_2, 200.0);
        let banana = scene.banana().unwrap();
        assert_eq!(banana.pos, scene.gorilla_pos(1));
        scene.next_player();
        assert_eq!(scene.current_player(), 0);
    }

    #[test]
    fn test_wind_gauge_follows_wind() {
        let mut scene = scene();
        scene.set_wind(4.0, WindDirection::Left);
        assert_eq!(scene.wind_level(), -0.5);
    }

    #[test]
    fn test_rebuild_resets_throw() {
        let mut scene = scene();
        scene.throw_banana(FRAC_PI_2, 200.0);
        scene.rebuild();
        assert!(!scene.throw_in_flight());
        let first = scene.skyline().borrow().buildings()[0];
        assert_eq!(scene.gorilla_pos(0).x, first.rect.center().x);
    }

    #[test]
    fn test_render_draws_gorillas() {
        let scene = scene();
        let mut canvas = Sprite::new(800, 600);
        scene.render(&mut canvas, &identity);
        let pos = scene.gorilla_pos(0);
        assert!(canvas.get(pos.x as i32, pos.y as i32).is_some_and(|c| c.a == 255));
    }
}
