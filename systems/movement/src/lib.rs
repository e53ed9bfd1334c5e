#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Movement system that turns held direction keys into player velocity.

use dengue_patrol_core::{Command, MovementIntent, PlayerSnapshot, Rules, Velocity};

/// Pure system that converts directional input into steering commands.
#[derive(Debug, Default)]
pub struct Movement;

impl Movement {
    /// Creates a new movement system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Emits `Command::SteerPlayer` when the desired velocity differs from the current one.
    ///
    /// Input is ignored while the player is flashing after a bite.
    pub fn handle(
        &mut self,
        intent: MovementIntent,
        player: &PlayerSnapshot,
        rules: &Rules,
        out: &mut Vec<Command>,
    ) {
        if player.flashing {
            return;
        }

        let velocity = desired_velocity(intent, rules.player_speed);
        if velocity != player.velocity {
            out.push(Command::SteerPlayer { velocity });
        }
    }
}

/// Velocity requested by the held keys; diagonals keep the straight-line speed.
#[must_use]
pub fn desired_velocity(intent: MovementIntent, speed: f32) -> Velocity {
    let (x, y) = intent.axes();
    let raw = Velocity::new(x * speed, y * speed);
    if x != 0.0 && y != 0.0 {
        raw.with_speed(speed)
    } else {
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dengue_patrol_core::Point;

    fn player(velocity: Velocity, flashing: bool) -> PlayerSnapshot {
        PlayerSnapshot {
            position: Point::new(400.0, 300.0),
            velocity,
            health: 5,
            flashing,
        }
    }

    #[test]
    fn diagonal_speed_matches_straight_speed() {
        let velocity = desired_velocity(
            MovementIntent {
                right: true,
                down: true,
                ..MovementIntent::default()
            },
            160.0,
        );
        assert!((velocity.speed() - 160.0).abs() < 1e-3);
        assert!(velocity.x > 0.0 && velocity.y > 0.0);
    }

    #[test]
    fn releasing_keys_stops_the_player() {
        let mut movement = Movement::new();
        let mut out = Vec::new();
        movement.handle(
            MovementIntent::default(),
            &player(Velocity::new(160.0, 0.0), false),
            &Rules::default(),
            &mut out,
        );
        assert_eq!(
            out,
            vec![Command::SteerPlayer {
                velocity: Velocity::ZERO
            }]
        );
    }

    #[test]
    fn flashing_player_ignores_input() {
        let mut movement = Movement::new();
        let mut out = Vec::new();
        movement.handle(
            MovementIntent {
                left: true,
                ..MovementIntent::default()
            },
            &player(Velocity::ZERO, true),
            &Rules::default(),
            &mut out,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn unchanged_velocity_emits_nothing() {
        let mut movement = Movement::new();
        let mut out = Vec::new();
        movement.handle(
            MovementIntent {
                up: true,
                ..MovementIntent::default()
            },
            &player(Velocity::new(0.0, -160.0), false),
            &Rules::default(),
            &mut out,
        );
        assert!(out.is_empty());
    }
}
