//! Headless gorilla duel
//!
//! Plays a few throws with random aim and logs how each one ends.
//!
//! Usage: `gorilla-duel [settings.json] [throws] [low|medium|high]`
//! Set `RUST_LOG=debug` for engine detail.

use std::f32::consts::PI;

use gorilla_duel::consts::{MAX_SUBSTEPS, SIM_DT};
use gorilla_duel::scene::{Scene, ThrowEvent};
use gorilla_duel::{QualityPreset, Settings};
use rand::Rng;

const DEFAULT_THROWS: usize = 6;
/// Frame time of the pretend display, off the sim step
const FRAME_DT: f32 = 1.0 / 45.0;
/// Give up on a throw after this much simulated time
const MAX_FLIGHT_SECS: f32 = 60.0;

/// Fixed-timestep stepping over a variable frame clock
struct Driver {
    scene: Scene,
    accumulator: f32,
}

impl Driver {
    fn new(scene: Scene) -> Self {
        Self {
            scene,
            accumulator: 0.0,
        }
    }

    /// Run whole sim steps for one display frame, collecting throw outcomes
    fn frame(&mut self, dt: f32) -> Vec<ThrowEvent> {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut events = Vec::new();
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            events.extend(self.scene.update(SIM_DT));
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        events
    }
}

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let mut settings = match args.next() {
        Some(path) => match Settings::load(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("Failed to load settings from {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => Settings::default(),
    };
    let throws = args
        .next()
        .and_then(|n| n.parse().ok())
        .unwrap_or(DEFAULT_THROWS);
    if let Some(name) = args.next() {
        match QualityPreset::from_str(&name) {
            Some(quality) => settings.quality = quality,
            None => log::warn!("Unknown quality preset '{}', keeping {}", name, settings.quality.as_str()),
        }
    }

    let seed: u64 = rand::random();
    let scene = match Scene::new(settings, seed) {
        Ok(scene) => scene,
        Err(e) => {
            log::error!("Failed to build scene: {}", e);
            std::process::exit(1);
        }
    };
    log::info!("Gorilla duel starting with seed: {}", seed);

    let mut driver = Driver::new(scene);
    let mut rng = rand::rng();
    let mut score = [0u32; 2];

    for round in 0..throws {
        driver.scene.change_wind();
        driver.scene.set_hour(rng.random_range(0.0..24.0));

        let player = driver.scene.current_player();
        // Aim across the skyline toward the opponent
        let elevation = rng.random_range(0.2..1.2);
        let angle = if player == 0 {
            elevation
        } else {
            PI - elevation
        };
        let power = rng.random_range(40.0..160.0);
        driver.scene.throw_banana(angle, power);

        let mut flight = 0.0;
        while driver.scene.throw_in_flight() && flight < MAX_FLIGHT_SECS {
            for event in driver.frame(FRAME_DT) {
                if let ThrowEvent::HitOpponent { player } = event {
                    score[player] += 1;
                }
            }
            flight += FRAME_DT;
        }
        if driver.scene.throw_in_flight() {
            log::warn!("Throw {} still airborne after {}s, rebuilding", round + 1, MAX_FLIGHT_SECS);
            driver.scene.rebuild();
        }

        log::info!(
            "After throw {}: {} - {} (wind {:+.2}, {} explosion(s) burning)",
            round + 1,
            score[0],
            score[1],
            driver.scene.wind_level(),
            driver.scene.explosion_count()
        );
        driver.scene.next_player();
    }

    log::info!("Final score: {} - {}", score[0], score[1]);
}
