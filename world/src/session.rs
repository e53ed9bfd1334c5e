//! Score, countdown and terminal bookkeeping for a session.

use dengue_patrol_core::{Difficulty, Outcome};

use crate::scheduler::TimerId;

#[derive(Debug, Default)]
pub(crate) struct SessionState {
    pub(crate) started: bool,
    pub(crate) difficulty: Difficulty,
    pub(crate) sound_enabled: bool,
    pub(crate) score: u32,
    pub(crate) time_left: u32,
    pub(crate) cleared: u32,
    pub(crate) total: u32,
    pub(crate) outcome: Option<Outcome>,
    pub(crate) countdown_timer: Option<TimerId>,
    pub(crate) spawn_timer: Option<TimerId>,
}

impl SessionState {
    pub(crate) fn new(
        difficulty: Difficulty,
        sound_enabled: bool,
        time_left: u32,
        total: u32,
    ) -> Self {
        Self {
            started: true,
            difficulty,
            sound_enabled,
            time_left,
            total,
            ..Self::default()
        }
    }

    pub(crate) fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Reports whether commands may still mutate the session.
    pub(crate) fn is_active(&self) -> bool {
        self.started && !self.is_over()
    }

    /// Adds points and returns the new score.
    pub(crate) fn award(&mut self, points: u32) -> u32 {
        self.score = self.score.saturating_add(points);
        self.score
    }

    /// Removes one second from the countdown and returns the seconds left.
    pub(crate) fn tick_countdown(&mut self) -> u32 {
        self.time_left = self.time_left.saturating_sub(1);
        self.time_left
    }

    /// Counts a cleared site and reports whether every site is now cleared.
    pub(crate) fn record_cleared(&mut self) -> bool {
        self.cleared = self.cleared.saturating_add(1).min(self.total);
        self.total > 0 && self.cleared == self.total
    }

    /// Performs the one-way terminal transition. Later calls are no-ops.
    pub(crate) fn conclude(&mut self, outcome: Outcome) -> bool {
        if self.is_over() {
            return false;
        }
        self.outcome = Some(outcome);
        true
    }
}
