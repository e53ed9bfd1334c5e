#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame orchestration for Dengue Patrol sessions.
//!
//! A [`Session`] owns the authoritative world together with every system and
//! drives them in a fixed order each frame: the clock tick, the systems
//! reacting to it, the commands they produced, interaction resolution and
//! finally notification publishing.

mod bus;

use std::time::Duration;

use dengue_patrol_core::{Command, Difficulty, Event, MovementIntent, Rules, RulesError};
use dengue_patrol_system_bootstrap::Bootstrap;
use dengue_patrol_system_mosquito_ai::MosquitoAi;
use dengue_patrol_system_movement::Movement;
use dengue_patrol_system_spawning::Spawning;
use dengue_patrol_system_spray::SprayTrigger;
use dengue_patrol_world::{self as world, query, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

pub use bus::Subscription;
use bus::EventBus;

/// Configuration chosen before a session starts.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSettings {
    /// Difficulty selecting the spawn cadence.
    pub difficulty: Difficulty,
    /// Sound preference carried through to the presentation layer.
    pub sound_enabled: bool,
    /// Seed from which every random stream of the session derives.
    pub seed: u64,
    /// Tunable constants.
    pub rules: Rules,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            sound_enabled: true,
            seed: 0,
            rules: Rules::default(),
        }
    }
}

/// Raw input sampled by an adapter for a single frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlayerInput {
    /// Direction keys held this frame.
    pub movement: MovementIntent,
    /// Whether the spray key is held this frame.
    pub spray_held: bool,
}

/// Single-player session wiring the world to its systems.
#[derive(Debug)]
pub struct Session {
    settings: SessionSettings,
    world: World,
    bootstrap: Bootstrap,
    movement: Movement,
    spawning: Spawning,
    mosquito_ai: MosquitoAi,
    spray: SprayTrigger,
    bus: EventBus,
    events: Vec<Event>,
    commands: Vec<Command>,
}

impl Session {
    /// Creates an idle session. Fails when the rules are unusable.
    pub fn new(settings: SessionSettings) -> Result<Self, RulesError> {
        settings.rules.validate()?;

        let mut seeds = ChaCha8Rng::seed_from_u64(settings.seed);
        let bootstrap = Bootstrap::new(seeds.gen());
        let spawning = Spawning::new(seeds.gen());
        let mosquito_ai = MosquitoAi::new(seeds.gen());

        Ok(Self {
            settings,
            world: World::new(),
            bootstrap,
            movement: Movement::new(),
            spawning,
            mosquito_ai,
            spray: SprayTrigger::new(),
            bus: EventBus::default(),
            events: Vec::new(),
            commands: Vec::new(),
        })
    }

    /// Registers a new notification subscriber.
    ///
    /// Subscriptions close once the session reports game over or is dropped.
    pub fn subscribe(&mut self) -> Subscription {
        self.bus.subscribe()
    }

    /// Starts a round with a fresh breeding-site layout.
    ///
    /// Calling this again after a round ends starts another one; the layout
    /// stream continues so every round differs while staying reproducible.
    pub fn start(&mut self) {
        self.events.clear();
        self.spray = SprayTrigger::new();
        let command = self.bootstrap.session_command(
            self.settings.difficulty,
            self.settings.sound_enabled,
            self.settings.rules.clone(),
        );
        world::apply(&mut self.world, command, &mut self.events);
        info!(
            difficulty = %self.settings.difficulty,
            seed = self.settings.seed,
            "round started"
        );
        self.publish();
    }

    /// Advances the session by `dt` and returns every event the frame produced.
    pub fn step(&mut self, input: PlayerInput, dt: Duration) -> &[Event] {
        self.events.clear();
        self.commands.clear();

        world::apply(&mut self.world, Command::Tick { dt }, &mut self.events);

        let rules = query::rules(&self.world);
        let player = query::player(&self.world);
        self.movement
            .handle(input.movement, &player, rules, &mut self.commands);
        self.spawning.handle(&self.events, rules, &mut self.commands);
        let mosquitoes = query::mosquito_view(&self.world);
        self.mosquito_ai.handle(
            &self.events,
            &mosquitoes,
            &player,
            rules,
            &mut self.commands,
        );
        self.spray.handle(
            input.spray_held,
            query::spray_cooldown(&self.world),
            &mut self.commands,
        );

        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
        world::apply(
            &mut self.world,
            Command::ResolveInteractions,
            &mut self.events,
        );

        self.publish();
        &self.events
    }

    /// Read-only access to the authoritative world for snapshot queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Settings the session was created with.
    #[must_use]
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Reports whether the current round has ended.
    #[must_use]
    pub fn is_over(&self) -> bool {
        query::session(&self.world).is_over
    }

    fn publish(&mut self) {
        let mut published = 0usize;
        for notification in self.events.iter().filter_map(Event::notification) {
            self.bus.publish(notification);
            published += 1;
        }
        if published > 0 {
            debug!(
                notifications = published,
                subscribers = self.bus.subscriber_count(),
                "notifications published"
            );
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.bus.close();
    }
}
