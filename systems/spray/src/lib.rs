#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns the spray key into spray commands.

use dengue_patrol_core::{Command, SprayCooldownSnapshot};

/// Edge-detecting spray trigger gated by the world's cooldown readiness.
#[derive(Debug)]
pub struct SprayTrigger {
    was_held: bool,
    repeat_while_held: bool,
}

impl Default for SprayTrigger {
    fn default() -> Self {
        Self::new()
    }
}

impl SprayTrigger {
    /// Creates a trigger that keeps firing while the key is held, once per cooldown.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            was_held: false,
            repeat_while_held: true,
        }
    }

    /// Creates a trigger that fires only on the press edge.
    #[must_use]
    pub const fn edge_only() -> Self {
        Self {
            was_held: false,
            repeat_while_held: false,
        }
    }

    /// Emits `Command::Spray` when the key is pressed and the cooldown allows it.
    pub fn handle(&mut self, held: bool, cooldown: SprayCooldownSnapshot, out: &mut Vec<Command>) {
        let pressed = held && !self.was_held;
        self.was_held = held;

        if !held || !cooldown.ready {
            return;
        }
        if pressed || self.repeat_while_held {
            out.push(Command::Spray);
        }
    }
}
