#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Dengue Patrol engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command batches.
//! The presentation layer only ever sees the [`Notification`] subset of events.

mod geometry;
mod rules;

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use geometry::{Aabb, Arena, Clamped, Point, Velocity};
pub use rules::{Rules, RulesError, MAX_HEALTH};

/// Canonical banner shown when a session starts.
pub const WELCOME_BANNER: &str = "Eliminate all breeding sites!";

/// How long the welcome banner stays on screen.
pub const WELCOME_BANNER_DURATION: Duration = Duration::from_millis(3_000);

/// How long score-bearing transient messages stay on screen.
pub const REWARD_MESSAGE_DURATION: Duration = Duration::from_millis(1_500);

/// Session difficulty, fixed for the lifetime of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Slowest spawn cadence.
    Easy,
    /// Default spawn cadence.
    #[default]
    Medium,
    /// Fastest spawn cadence.
    Hard,
}

impl Difficulty {
    /// Every difficulty in ascending order.
    pub const ALL: [Self; 3] = [Self::Easy, Self::Medium, Self::Hard];

    /// Lowercase name used by configuration surfaces.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a difficulty name is not recognised.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown difficulty `{0}` (expected easy, medium or hard)")]
pub struct ParseDifficultyError(String);

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|difficulty| difficulty.name().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| ParseDifficultyError(value.to_owned()))
    }
}

/// Terminal result of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Every breeding site was cleared before the countdown expired.
    Won,
    /// Health reached zero or the countdown expired.
    Lost,
}

impl Outcome {
    /// Reports whether the outcome is a victory.
    #[must_use]
    pub const fn is_won(self) -> bool {
        matches!(self, Self::Won)
    }
}

/// Cosmetic kind of a breeding site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SiteKind {
    /// Discarded tire holding rain water.
    Tire,
    /// Open water container.
    WaterContainer,
    /// Potted plant with standing water.
    Plant,
}

impl SiteKind {
    /// Every site kind, used for uniform draws.
    pub const ALL: [Self; 3] = [Self::Tire, Self::WaterContainer, Self::Plant];

    /// Human readable label shown next to the site.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Tire => "Tire with water",
            Self::WaterContainer => "Water container",
            Self::Plant => "Plant with water",
        }
    }
}

/// Behavioural state of a mosquito.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MosquitoState {
    /// Drifting along its current wander vector.
    Wandering,
    /// Flying toward the player after a successful chase draw.
    Chasing,
    /// Has bitten the player and hovers before fleeing.
    Biting,
    /// Killed by the spray and playing its exit sequence.
    Dying,
    /// Flying away after a bite until removal.
    Fled,
}

impl MosquitoState {
    /// Reports whether the state can only be left through removal.
    #[must_use]
    pub const fn is_absorbing(self) -> bool {
        matches!(self, Self::Biting | Self::Dying | Self::Fled)
    }
}

/// Progress state of a breeding site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SiteState {
    /// Waiting to be cleared.
    Active,
    /// The player is currently clearing the site.
    Clearing,
    /// Neutralised for the rest of the session.
    Cleared,
}

/// Unique identifier assigned to a mosquito.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MosquitoId(u32);

impl MosquitoId {
    /// Creates a new identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a breeding site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SiteId(u32);

impl SiteId {
    /// Creates a new identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Directional keys held by the player during a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MovementIntent {
    /// Move toward negative x.
    pub left: bool,
    /// Move toward positive x.
    pub right: bool,
    /// Move toward negative y.
    pub up: bool,
    /// Move toward positive y.
    pub down: bool,
}

impl MovementIntent {
    /// Resolves the held keys into unit axis values.
    ///
    /// Left wins over right and up wins over down when both are held.
    #[must_use]
    pub const fn axes(&self) -> (f32, f32) {
        let x = if self.left {
            -1.0
        } else if self.right {
            1.0
        } else {
            0.0
        };
        let y = if self.up {
            -1.0
        } else if self.down {
            1.0
        } else {
            0.0
        };
        (x, y)
    }

    /// Reports whether no direction is held.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        !(self.left || self.right || self.up || self.down)
    }
}

/// Placement of a breeding site decided before the session starts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SiteSeed {
    /// Cosmetic kind of the site.
    pub kind: SiteKind,
    /// Centre of the site.
    pub position: Point,
}

/// Everything the world needs to start a session.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    /// Difficulty fixed for the session.
    pub difficulty: Difficulty,
    /// Pass-through flag for the audio collaborator.
    pub sound_enabled: bool,
    /// Tunable constants used throughout the session.
    pub rules: Rules,
    /// Breeding sites to lay out, in id order.
    pub sites: Vec<SiteSeed>,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Resets the world and starts a fresh session.
    StartSession {
        /// Configuration applied to the new session.
        config: SessionConfig,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Replaces the player's velocity.
    SteerPlayer {
        /// New player velocity.
        velocity: Velocity,
    },
    /// Introduces a new wandering mosquito.
    SpawnMosquito {
        /// Spawn location.
        position: Point,
        /// Initial wander velocity.
        velocity: Velocity,
        /// Delay before the first retarget.
        retarget_in: Duration,
    },
    /// Points a mosquito at the player after a successful chase draw.
    SteerMosquito {
        /// Mosquito to steer.
        mosquito: MosquitoId,
        /// Chase velocity.
        velocity: Velocity,
    },
    /// Assigns a new wander vector and re-arms the retarget timer.
    RetargetMosquito {
        /// Mosquito to retarget.
        mosquito: MosquitoId,
        /// New wander velocity.
        velocity: Velocity,
        /// Delay before the next retarget.
        next_retarget_in: Duration,
    },
    /// Sets the flight vector of a mosquito that fled after biting.
    FleeMosquito {
        /// Mosquito that fled.
        mosquito: MosquitoId,
        /// Flight velocity.
        velocity: Velocity,
    },
    /// Triggers the spray around the player.
    Spray,
    /// Runs the interaction resolver once.
    ResolveInteractions,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A new session began.
    SessionStarted {
        /// Difficulty of the session.
        difficulty: Difficulty,
        /// Pass-through audio flag.
        sound_enabled: bool,
    },
    /// Reports that the simulation clock advanced.
    TimeAdvanced {
        /// Amount of simulated time that elapsed.
        dt: Duration,
    },
    /// The spawn timer fired and one mosquito should be spawned.
    SpawnDue,
    /// A mosquito entered the arena.
    MosquitoSpawned {
        /// Identifier allocated to the mosquito.
        mosquito: MosquitoId,
        /// Spawn location.
        position: Point,
    },
    /// A mosquito's retarget timer fired.
    MosquitoRetargetDue {
        /// Mosquito that needs a new wander vector.
        mosquito: MosquitoId,
    },
    /// A mosquito bit the player.
    MosquitoBit {
        /// Mosquito that bit.
        mosquito: MosquitoId,
    },
    /// A mosquito was killed by the spray.
    MosquitoKilled {
        /// Mosquito that died.
        mosquito: MosquitoId,
    },
    /// A biting mosquito started to flee.
    MosquitoFled {
        /// Mosquito that fled.
        mosquito: MosquitoId,
    },
    /// A mosquito left the registry.
    MosquitoRemoved {
        /// Mosquito that was removed.
        mosquito: MosquitoId,
    },
    /// The player's input lock toggled.
    PlayerFlashingChanged {
        /// Whether the player is now flashing.
        flashing: bool,
    },
    /// The score changed.
    ScoreChanged {
        /// New score.
        score: u32,
    },
    /// The countdown changed.
    TimerChanged {
        /// Whole seconds left.
        seconds_left: u32,
    },
    /// The player's health changed.
    HealthChanged {
        /// New health.
        health: u8,
    },
    /// The spray cooldown progressed.
    SprayCooldownChanged {
        /// Fraction of the cooldown elapsed in `0.0..=1.0`.
        fraction: f32,
    },
    /// The spray fired.
    SprayActivated {
        /// Centre of the spray.
        origin: Point,
        /// Radius covered by the spray.
        radius: f32,
    },
    /// A message should be shown for a while.
    TransientMessage {
        /// Text of the message.
        text: String,
        /// How long the message stays visible.
        duration: Duration,
    },
    /// The player started clearing a site.
    SiteClearingStarted {
        /// Site being cleared.
        site: SiteId,
        /// Whole seconds until completion.
        seconds_remaining: u32,
    },
    /// A clearing process completed one in-range tick.
    SiteClearingProgress {
        /// Site being cleared.
        site: SiteId,
        /// Whole seconds until completion.
        seconds_remaining: u32,
    },
    /// A clearing process was abandoned.
    SiteClearingCancelled {
        /// Site that returned to active.
        site: SiteId,
    },
    /// A site was cleared.
    SiteCleared {
        /// Site that was cleared.
        site: SiteId,
        /// Number of sites cleared so far.
        cleared: u32,
        /// Number of sites in the session.
        total: u32,
    },
    /// The spray killed at least one mosquito.
    MosquitoesEliminated {
        /// Number of mosquitoes killed.
        count: u32,
        /// Points awarded for the kills.
        points: u32,
    },
    /// The session ended.
    GameOver {
        /// Score at the end of the session.
        final_score: u32,
        /// How the session ended.
        outcome: Outcome,
    },
}

impl Event {
    /// Projects the event onto the outbound notification surface.
    #[must_use]
    pub fn notification(&self) -> Option<Notification> {
        let notification = match self {
            Self::ScoreChanged { score } => Notification::ScoreChanged { score: *score },
            Self::TimerChanged { seconds_left } => Notification::TimerChanged {
                seconds_left: *seconds_left,
            },
            Self::HealthChanged { health } => Notification::HealthChanged { health: *health },
            Self::SprayCooldownChanged { fraction } => Notification::SprayCooldownChanged {
                fraction: *fraction,
            },
            Self::SprayActivated { origin, radius } => Notification::SprayActivated {
                origin: *origin,
                radius: *radius,
            },
            Self::TransientMessage { text, duration } => Notification::TransientMessage {
                text: text.clone(),
                duration: *duration,
            },
            Self::SiteClearingStarted {
                site,
                seconds_remaining,
            } => Notification::SiteClearingStarted {
                site: *site,
                seconds_remaining: *seconds_remaining,
            },
            Self::SiteClearingProgress {
                site,
                seconds_remaining,
            } => Notification::SiteClearingProgress {
                site: *site,
                seconds_remaining: *seconds_remaining,
            },
            Self::SiteClearingCancelled { site } => {
                Notification::SiteClearingCancelled { site: *site }
            }
            Self::SiteCleared {
                site,
                cleared,
                total,
            } => Notification::SiteCleared {
                site: *site,
                cleared: *cleared,
                total: *total,
            },
            Self::MosquitoesEliminated { count, points } => Notification::MosquitoesEliminated {
                count: *count,
                points: *points,
            },
            Self::GameOver {
                final_score,
                outcome,
            } => Notification::GameOver {
                final_score: *final_score,
                won: outcome.is_won(),
            },
            Self::SessionStarted { .. }
            | Self::TimeAdvanced { .. }
            | Self::SpawnDue
            | Self::MosquitoSpawned { .. }
            | Self::MosquitoRetargetDue { .. }
            | Self::MosquitoBit { .. }
            | Self::MosquitoKilled { .. }
            | Self::MosquitoFled { .. }
            | Self::MosquitoRemoved { .. }
            | Self::PlayerFlashingChanged { .. } => return None,
        };
        Some(notification)
    }
}

/// Fire-and-forget messages delivered to the presentation layer.
#[derive(Clone, Debug, PartialEq)]
pub enum Notification {
    /// The score changed.
    ScoreChanged {
        /// New score.
        score: u32,
    },
    /// The countdown changed.
    TimerChanged {
        /// Whole seconds left.
        seconds_left: u32,
    },
    /// The player's health changed.
    HealthChanged {
        /// New health.
        health: u8,
    },
    /// The spray cooldown progressed.
    SprayCooldownChanged {
        /// Fraction of the cooldown elapsed in `0.0..=1.0`.
        fraction: f32,
    },
    /// The spray fired; anchors the cosmetic spray effect.
    SprayActivated {
        /// Centre of the spray.
        origin: Point,
        /// Radius covered by the spray.
        radius: f32,
    },
    /// A message should be shown for a while.
    TransientMessage {
        /// Text of the message.
        text: String,
        /// How long the message stays visible.
        duration: Duration,
    },
    /// The player started clearing a site.
    SiteClearingStarted {
        /// Site being cleared.
        site: SiteId,
        /// Whole seconds until completion.
        seconds_remaining: u32,
    },
    /// A clearing process completed one in-range tick.
    SiteClearingProgress {
        /// Site being cleared.
        site: SiteId,
        /// Whole seconds until completion.
        seconds_remaining: u32,
    },
    /// A clearing process was abandoned.
    SiteClearingCancelled {
        /// Site that returned to active.
        site: SiteId,
    },
    /// A site was cleared.
    SiteCleared {
        /// Site that was cleared.
        site: SiteId,
        /// Number of sites cleared so far.
        cleared: u32,
        /// Number of sites in the session.
        total: u32,
    },
    /// The spray killed at least one mosquito.
    MosquitoesEliminated {
        /// Number of mosquitoes killed.
        count: u32,
        /// Points awarded for the kills.
        points: u32,
    },
    /// The session ended. Emitted exactly once per session.
    GameOver {
        /// Score at the end of the session.
        final_score: u32,
        /// Whether the player won.
        won: bool,
    },
}

/// Immutable representation of the player used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Centre of the player.
    pub position: Point,
    /// Current velocity.
    pub velocity: Velocity,
    /// Remaining health.
    pub health: u8,
    /// Whether the post-bite input lock is active.
    pub flashing: bool,
}

/// Immutable representation of a single mosquito used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MosquitoSnapshot {
    /// Unique identifier assigned to the mosquito.
    pub id: MosquitoId,
    /// Centre of the mosquito.
    pub position: Point,
    /// Current velocity.
    pub velocity: Velocity,
    /// Behavioural state.
    pub state: MosquitoState,
    /// Session time at which the mosquito spawned.
    pub spawned_at: Duration,
    /// Time spent in the current state.
    pub state_elapsed: Duration,
}

/// Read-only snapshot describing all live mosquitoes.
#[derive(Clone, Debug, Default)]
pub struct MosquitoView {
    snapshots: Vec<MosquitoSnapshot>,
}

impl MosquitoView {
    /// Creates a new mosquito view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<MosquitoSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured mosquito snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &MosquitoSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a single mosquito.
    #[must_use]
    pub fn get(&self, id: MosquitoId) -> Option<&MosquitoSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Number of captured mosquitoes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<MosquitoSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a breeding site used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SiteSnapshot {
    /// Unique identifier assigned to the site.
    pub id: SiteId,
    /// Cosmetic kind.
    pub kind: SiteKind,
    /// Centre of the site.
    pub position: Point,
    /// Progress state.
    pub state: SiteState,
}

/// Read-only snapshot describing every breeding site.
#[derive(Clone, Debug, Default)]
pub struct SiteView {
    snapshots: Vec<SiteSnapshot>,
}

impl SiteView {
    /// Creates a new site view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<SiteSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured site snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &SiteSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a single site.
    #[must_use]
    pub fn get(&self, id: SiteId) -> Option<&SiteSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<SiteSnapshot> {
        self.snapshots
    }
}

/// Progress of the in-flight clearing process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClearingSnapshot {
    /// Site being cleared.
    pub site: SiteId,
    /// In-range ticks completed so far.
    pub elapsed_ticks: u32,
    /// Whole seconds until completion.
    pub seconds_remaining: u32,
}

/// Session bookkeeping exposed to systems and adapters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionSnapshot {
    /// Whether a session has been started.
    pub started: bool,
    /// Current score.
    pub score: u32,
    /// Mirrors the player's health.
    pub health: u8,
    /// Whole seconds left on the countdown.
    pub time_left: u32,
    /// Number of sites cleared.
    pub cleared: u32,
    /// Number of sites in the session.
    pub total: u32,
    /// Difficulty of the session.
    pub difficulty: Difficulty,
    /// Pass-through audio flag.
    pub sound_enabled: bool,
    /// Whether the terminal transition happened.
    pub is_over: bool,
    /// Terminal result, present once `is_over` is set.
    pub outcome: Option<Outcome>,
}

/// Readiness of the spray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SprayCooldownSnapshot {
    /// Fraction of the cooldown elapsed in `0.0..=1.0`.
    pub fraction: f32,
    /// Whether a trigger would fire now.
    pub ready: bool,
}
