//! Tunable constants that govern a session.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Arena, Difficulty, Point};

/// Upper bound on the player's health.
pub const MAX_HEALTH: u8 = 5;

/// Every fixed constant the simulation consults.
///
/// The defaults reproduce the reference tuning. Deserialisation fills any
/// missing field from the defaults so rules files only need to list overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Total arena width including the border walls.
    pub arena_width: f32,
    /// Total arena height including the border walls.
    pub arena_height: f32,
    /// Thickness of the invisible wall along every arena edge.
    pub arena_border: f32,
    /// Player movement speed in units per second.
    pub player_speed: f32,
    /// Half extent of the player's collision box.
    pub player_half_extent: f32,
    /// Half extent of a mosquito's collision box.
    pub mosquito_half_extent: f32,
    /// Half extent of a breeding site's collision box.
    pub site_half_extent: f32,
    /// Number of breeding sites laid out at session start.
    pub total_breeding_sites: u32,
    /// Health the player starts with.
    pub initial_health: u8,
    /// Countdown length in whole seconds.
    pub initial_time_left_secs: u32,
    /// Minimum time between two spray triggers.
    pub spray_cooldown_ms: u64,
    /// Radius around the player inside which the spray kills.
    pub spray_radius: f32,
    /// Maximum player-to-site distance tolerated while clearing.
    pub clearing_proximity_radius: f32,
    /// Number of consecutive in-range progress ticks needed to clear a site.
    pub clearing_duration_ticks: u32,
    /// Period of the clearing progress timer.
    pub clearing_tick_ms: u64,
    /// Health removed by a single bite.
    pub bite_damage: u8,
    /// Score awarded for clearing a breeding site.
    pub site_cleared_reward: u32,
    /// Score awarded per mosquito killed by the spray.
    pub mosquito_killed_reward: u32,
    /// Mosquito speed in units per second.
    pub mosquito_speed: f32,
    /// Distance under which mosquitoes favour chasing.
    pub chase_threshold_distance: f32,
    /// Chase probability applied within the threshold distance.
    pub chase_probability_near: f32,
    /// Chase probability applied beyond the threshold distance.
    pub chase_probability_far: f32,
    /// Spawn cadence on easy difficulty.
    pub spawn_interval_easy_ms: u64,
    /// Spawn cadence on medium difficulty.
    pub spawn_interval_medium_ms: u64,
    /// Spawn cadence on hard difficulty.
    pub spawn_interval_hard_ms: u64,
    /// Margin kept between spawn positions and the arena edges.
    pub spawn_padding: f32,
    /// Shortest delay before a mosquito picks a new wander vector.
    pub retarget_min_ms: u64,
    /// Longest delay before a mosquito picks a new wander vector.
    pub retarget_max_ms: u64,
    /// Pause between a bite and the mosquito flying off.
    pub bite_flee_delay_ms: u64,
    /// Flight time of a fleeing mosquito before removal.
    pub flee_duration_ms: u64,
    /// Upward speed of a fleeing mosquito.
    pub flee_rise_speed: f32,
    /// Largest horizontal drift speed of a fleeing mosquito.
    pub flee_drift_speed: f32,
    /// Length of the descent and fade played by a killed mosquito.
    pub dying_duration_ms: u64,
    /// Distance a killed mosquito appears to sink while fading out.
    pub dying_sink_distance: f32,
    /// Input lock applied to the player after a bite.
    pub flash_duration_ms: u64,
    /// Margin kept between breeding sites and the arena edges.
    pub site_padding: f32,
    /// Preferred minimum spacing between two breeding sites.
    pub site_min_distance: f32,
    /// Placement attempts per site before the spacing rule is waived.
    pub site_placement_attempts: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            arena_width: 800.0,
            arena_height: 600.0,
            arena_border: 32.0,
            player_speed: 160.0,
            player_half_extent: 16.0,
            mosquito_half_extent: 10.0,
            site_half_extent: 18.0,
            total_breeding_sites: 6,
            initial_health: 5,
            initial_time_left_secs: 180,
            spray_cooldown_ms: 1_000,
            spray_radius: 100.0,
            clearing_proximity_radius: 50.0,
            clearing_duration_ticks: 5,
            clearing_tick_ms: 1_000,
            bite_damage: 1,
            site_cleared_reward: 5,
            mosquito_killed_reward: 2,
            mosquito_speed: 50.0,
            chase_threshold_distance: 200.0,
            chase_probability_near: 0.7,
            chase_probability_far: 0.3,
            spawn_interval_easy_ms: 5_000,
            spawn_interval_medium_ms: 3_000,
            spawn_interval_hard_ms: 2_000,
            spawn_padding: 80.0,
            retarget_min_ms: 2_000,
            retarget_max_ms: 4_000,
            bite_flee_delay_ms: 500,
            flee_duration_ms: 1_500,
            flee_rise_speed: 200.0,
            flee_drift_speed: 100.0,
            dying_duration_ms: 500,
            dying_sink_distance: 50.0,
            flash_duration_ms: 600,
            site_padding: 100.0,
            site_min_distance: 120.0,
            site_placement_attempts: 50,
        }
    }
}

impl Rules {
    /// Arena geometry described by these rules.
    #[must_use]
    pub const fn arena(&self) -> Arena {
        Arena::new(self.arena_width, self.arena_height, self.arena_border)
    }

    /// Where the player appears when a session starts.
    #[must_use]
    pub fn player_start(&self) -> Point {
        self.arena().center()
    }

    /// Spawn cadence for the provided difficulty.
    #[must_use]
    pub const fn spawn_interval(&self, difficulty: Difficulty) -> Duration {
        let millis = match difficulty {
            Difficulty::Easy => self.spawn_interval_easy_ms,
            Difficulty::Medium => self.spawn_interval_medium_ms,
            Difficulty::Hard => self.spawn_interval_hard_ms,
        };
        Duration::from_millis(millis)
    }

    /// Minimum time between two spray triggers.
    #[must_use]
    pub const fn spray_cooldown(&self) -> Duration {
        Duration::from_millis(self.spray_cooldown_ms)
    }

    /// Period of the clearing progress timer.
    #[must_use]
    pub const fn clearing_tick(&self) -> Duration {
        Duration::from_millis(self.clearing_tick_ms)
    }

    /// Pause between a bite and the flight away from the player.
    #[must_use]
    pub const fn bite_flee_delay(&self) -> Duration {
        Duration::from_millis(self.bite_flee_delay_ms)
    }

    /// Flight time before a fleeing mosquito is removed.
    #[must_use]
    pub const fn flee_duration(&self) -> Duration {
        Duration::from_millis(self.flee_duration_ms)
    }

    /// Length of the dying sequence.
    #[must_use]
    pub const fn dying_duration(&self) -> Duration {
        Duration::from_millis(self.dying_duration_ms)
    }

    /// Input lock applied after a bite.
    #[must_use]
    pub const fn flash_duration(&self) -> Duration {
        Duration::from_millis(self.flash_duration_ms)
    }

    fn distances(&self) -> [(&'static str, f32); 17] {
        [
            ("arena_width", self.arena_width),
            ("arena_height", self.arena_height),
            ("arena_border", self.arena_border),
            ("player_speed", self.player_speed),
            ("player_half_extent", self.player_half_extent),
            ("mosquito_half_extent", self.mosquito_half_extent),
            ("site_half_extent", self.site_half_extent),
            ("spray_radius", self.spray_radius),
            ("clearing_proximity_radius", self.clearing_proximity_radius),
            ("mosquito_speed", self.mosquito_speed),
            ("chase_threshold_distance", self.chase_threshold_distance),
            ("spawn_padding", self.spawn_padding),
            ("flee_rise_speed", self.flee_rise_speed),
            ("flee_drift_speed", self.flee_drift_speed),
            ("dying_sink_distance", self.dying_sink_distance),
            ("site_padding", self.site_padding),
            ("site_min_distance", self.site_min_distance),
        ]
    }

    /// Checks the rules for values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), RulesError> {
        for (field, value) in self.distances() {
            if !value.is_finite() {
                return Err(RulesError::NotFinite { field, value });
            }
            if value < 0.0 {
                return Err(RulesError::Negative { field, value });
            }
        }
        if !(self.arena_width > 0.0 && self.arena_height > 0.0) {
            return Err(RulesError::EmptyArena {
                width: self.arena_width,
                height: self.arena_height,
            });
        }
        if self.arena_border * 2.0 >= self.arena_width.min(self.arena_height) {
            return Err(RulesError::BorderTooThick {
                border: self.arena_border,
            });
        }
        if self.total_breeding_sites == 0 {
            return Err(RulesError::NoBreedingSites);
        }
        if self.initial_health == 0 {
            return Err(RulesError::NoHealth);
        }
        if self.initial_health > MAX_HEALTH {
            return Err(RulesError::TooMuchHealth {
                health: self.initial_health,
            });
        }
        if self.clearing_duration_ticks == 0 {
            return Err(RulesError::ZeroValue {
                field: "clearing_duration_ticks",
            });
        }
        let periods = [
            ("spawn_interval_easy_ms", self.spawn_interval_easy_ms),
            ("spawn_interval_medium_ms", self.spawn_interval_medium_ms),
            ("spawn_interval_hard_ms", self.spawn_interval_hard_ms),
            ("clearing_tick_ms", self.clearing_tick_ms),
            ("retarget_min_ms", self.retarget_min_ms),
        ];
        if let Some((field, _)) = periods.iter().find(|(_, value)| *value == 0) {
            return Err(RulesError::ZeroValue { field });
        }
        if self.retarget_max_ms < self.retarget_min_ms {
            return Err(RulesError::InvertedRange {
                field: "retarget_max_ms",
            });
        }
        for (field, probability) in [
            ("chase_probability_near", self.chase_probability_near),
            ("chase_probability_far", self.chase_probability_far),
        ] {
            if !(0.0..=1.0).contains(&probability) {
                return Err(RulesError::ProbabilityOutOfRange { field, probability });
            }
        }
        Ok(())
    }
}

/// Reasons a set of rules is rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum RulesError {
    /// The arena has no playable area.
    #[error("arena must have a positive size (received {width}x{height})")]
    EmptyArena {
        /// Configured width.
        width: f32,
        /// Configured height.
        height: f32,
    },
    /// The border walls cover the whole arena.
    #[error("arena border of {border} leaves no playable interior")]
    BorderTooThick {
        /// Configured border thickness.
        border: f32,
    },
    /// A session needs at least one breeding site to be winnable.
    #[error("total_breeding_sites must be positive")]
    NoBreedingSites,
    /// A session needs the player to start alive.
    #[error("initial_health must be positive")]
    NoHealth,
    /// The player may not start with more hearts than the HUD holds.
    #[error("initial_health must not exceed {max} (received {health})", max = MAX_HEALTH)]
    TooMuchHealth {
        /// Configured starting health.
        health: u8,
    },
    /// A distance or speed is NaN or infinite.
    #[error("{field} must be a finite number (received {value})")]
    NotFinite {
        /// Name of the offending field.
        field: &'static str,
        /// Value that failed validation.
        value: f32,
    },
    /// A distance or speed is below zero.
    #[error("{field} must not be negative (received {value})")]
    Negative {
        /// Name of the offending field.
        field: &'static str,
        /// Value that failed validation.
        value: f32,
    },
    /// A duration or count that drives a timer is zero.
    #[error("{field} must be positive")]
    ZeroValue {
        /// Name of the offending field.
        field: &'static str,
    },
    /// The upper bound of a range lies below its lower bound.
    #[error("{field} must not be below its minimum counterpart")]
    InvertedRange {
        /// Name of the offending field.
        field: &'static str,
    },
    /// A probability lies outside `0.0..=1.0`.
    #[error("{field} must lie within 0.0..=1.0 (received {probability})")]
    ProbabilityOutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// Value that failed validation.
        probability: f32,
    },
}
