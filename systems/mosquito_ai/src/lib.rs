#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that steers mosquitoes between wandering and chasing.
//!
//! Two mechanisms run side by side. Retarget timers owned by the world ask for
//! a fresh wander vector every few seconds, while every tick each hunting
//! mosquito draws against a distance-dependent chase probability and, on
//! success, turns toward the player. The result is a noisy mix of wander and
//! pursuit rather than a straight chase.

use std::time::Duration;

use dengue_patrol_core::{Command, Event, MosquitoView, PlayerSnapshot, Rules, Velocity};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Draws a uniformly random wander vector within `[-speed, speed]` on each axis.
pub fn wander_velocity<R: Rng>(rng: &mut R, speed: f32) -> Velocity {
    let speed = speed.abs();
    Velocity::new(
        rng.gen_range(-1.0f32..=1.0) * speed,
        rng.gen_range(-1.0f32..=1.0) * speed,
    )
}

/// Draws the delay until the next wander retarget.
pub fn retarget_delay<R: Rng>(rng: &mut R, rules: &Rules) -> Duration {
    let low = rules.retarget_min_ms.min(rules.retarget_max_ms);
    let high = rules.retarget_min_ms.max(rules.retarget_max_ms);
    Duration::from_millis(rng.gen_range(low..=high))
}

/// Draws the flight vector of a mosquito fleeing after a bite.
pub fn flee_velocity<R: Rng>(rng: &mut R, rules: &Rules) -> Velocity {
    let drift = rules.flee_drift_speed.abs();
    Velocity::new(rng.gen_range(-1.0f32..=1.0) * drift, -rules.flee_rise_speed)
}

/// Probability that a mosquito at `distance` from the player chases this tick.
#[must_use]
pub fn chase_probability(distance: f32, rules: &Rules) -> f32 {
    if distance < rules.chase_threshold_distance {
        rules.chase_probability_near
    } else {
        rules.chase_probability_far
    }
}

/// Mosquito behaviour system backed by a seeded random stream.
#[derive(Debug)]
pub struct MosquitoAi {
    rng: ChaCha8Rng,
}

impl MosquitoAi {
    /// Creates the system with a reproducible random stream.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Consumes world events and snapshots to emit steering commands.
    ///
    /// Retarget and flee commands are emitted before chase commands so that a
    /// successful chase draw overrides a wander vector assigned in the same tick.
    pub fn handle(
        &mut self,
        events: &[Event],
        mosquitoes: &MosquitoView,
        player: &PlayerSnapshot,
        rules: &Rules,
        out: &mut Vec<Command>,
    ) {
        let mut ticked = false;
        for event in events {
            match event {
                Event::TimeAdvanced { .. } => ticked = true,
                Event::MosquitoRetargetDue { mosquito } => {
                    let hunting = mosquitoes
                        .get(*mosquito)
                        .is_some_and(|snapshot| !snapshot.state.is_absorbing());
                    if hunting {
                        out.push(Command::RetargetMosquito {
                            mosquito: *mosquito,
                            velocity: wander_velocity(&mut self.rng, rules.mosquito_speed),
                            next_retarget_in: retarget_delay(&mut self.rng, rules),
                        });
                    }
                }
                Event::MosquitoFled { mosquito } => {
                    out.push(Command::FleeMosquito {
                        mosquito: *mosquito,
                        velocity: flee_velocity(&mut self.rng, rules),
                    });
                }
                _ => {}
            }
        }

        if !ticked {
            return;
        }

        for snapshot in mosquitoes.iter() {
            if snapshot.state.is_absorbing() {
                continue;
            }
            let distance = snapshot.position.distance(player.position);
            let draw: f32 = self.rng.gen();
            if draw < chase_probability(distance, rules) {
                out.push(Command::SteerMosquito {
                    mosquito: snapshot.id,
                    velocity: Velocity::toward(
                        snapshot.position,
                        player.position,
                        rules.mosquito_speed,
                    ),
                });
            }
        }
    }
}
