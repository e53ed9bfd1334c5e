#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawning system that answers spawn timer firings with new mosquitoes.

use dengue_patrol_core::{Command, Event, Point, Rules};
use dengue_patrol_system_mosquito_ai::{retarget_delay, wander_velocity};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Pure system that places mosquitoes whenever the world's spawn timer fires.
///
/// The cadence itself lives in the world so that spawning stops the moment a
/// session ends; this system only decides where and how each mosquito starts.
#[derive(Debug)]
pub struct Spawning {
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a spawning system with a reproducible random stream.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Consumes events to emit spawn commands.
    pub fn handle(&mut self, events: &[Event], rules: &Rules, out: &mut Vec<Command>) {
        let due = events
            .iter()
            .filter(|event| matches!(event, Event::SpawnDue))
            .count();

        for _ in 0..due {
            let position = Point::new(
                self.coordinate(rules.arena_width, rules.spawn_padding),
                self.coordinate(rules.arena_height, rules.spawn_padding),
            );
            out.push(Command::SpawnMosquito {
                position,
                velocity: wander_velocity(&mut self.rng, rules.mosquito_speed),
                retarget_in: retarget_delay(&mut self.rng, rules),
            });
        }
    }

    fn coordinate(&mut self, extent: f32, padding: f32) -> f32 {
        let span = (extent - padding * 2.0).max(0.0);
        padding + self.rng.gen::<f32>() * span
    }
}
