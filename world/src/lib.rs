#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Dengue Patrol.
//!
//! The world owns the virtual clock, every entity, the clearing process and
//! the session bookkeeping. It is mutated exclusively through [`apply`] and
//! observed through the read-only [`query`] module.

mod interactions;
mod mosquitoes;
mod scheduler;
mod session;
mod sites;

use std::time::Duration;

use dengue_patrol_core::{
    Arena, Command, Event, MosquitoId, MosquitoState, Outcome, Point, Rules, SessionConfig,
    SiteId, Velocity, REWARD_MESSAGE_DURATION, WELCOME_BANNER, WELCOME_BANNER_DURATION,
};
use tracing::{debug, info};

use mosquitoes::MosquitoRegistry;
use scheduler::{Scheduler, TimerId, TimerPurpose};
use session::SessionState;
use sites::{ClearingStep, SiteRegistry};

const COUNTDOWN_PERIOD: Duration = Duration::from_secs(1);

/// Represents the authoritative Dengue Patrol world state.
#[derive(Debug)]
pub struct World {
    rules: Rules,
    arena: Arena,
    scheduler: Scheduler,
    player: Player,
    mosquitoes: MosquitoRegistry,
    sites: SiteRegistry,
    overlapped_sites: Vec<SiteId>,
    session: SessionState,
    spray: SprayState,
}

#[derive(Clone, Debug)]
struct Player {
    position: Point,
    velocity: Velocity,
    health: u8,
    flashing: bool,
    flash_timer: Option<TimerId>,
}

impl Player {
    fn spawned(position: Point, health: u8) -> Self {
        Self {
            position,
            velocity: Velocity::ZERO,
            health,
            flashing: false,
            flash_timer: None,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct SprayState {
    last_trigger: Option<Duration>,
    reported_fraction: f32,
}

impl Default for SprayState {
    fn default() -> Self {
        Self {
            last_trigger: None,
            reported_fraction: 1.0,
        }
    }
}

impl SprayState {
    fn fraction(&self, now: Duration, cooldown: Duration) -> f32 {
        match self.last_trigger {
            None => 1.0,
            Some(_) if cooldown.is_zero() => 1.0,
            Some(last) => {
                let elapsed = now.saturating_sub(last).as_secs_f32();
                (elapsed / cooldown.as_secs_f32()).clamp(0.0, 1.0)
            }
        }
    }

    fn is_ready(&self, now: Duration, cooldown: Duration) -> bool {
        self.last_trigger
            .map_or(true, |last| now.saturating_sub(last) >= cooldown)
    }
}

impl World {
    /// Creates an idle world; nothing happens until a session is started.
    #[must_use]
    pub fn new() -> Self {
        let rules = Rules::default();
        Self {
            arena: rules.arena(),
            player: Player::spawned(rules.player_start(), rules.initial_health),
            rules,
            scheduler: Scheduler::new(),
            mosquitoes: MosquitoRegistry::new(),
            sites: SiteRegistry::default(),
            overlapped_sites: Vec::new(),
            session: SessionState::default(),
            spray: SprayState::default(),
        }
    }

    fn start(&mut self, config: SessionConfig, out_events: &mut Vec<Event>) {
        let SessionConfig {
            difficulty,
            sound_enabled,
            rules,
            sites,
        } = config;

        self.scheduler = Scheduler::new();
        self.arena = rules.arena();
        self.player = Player::spawned(rules.player_start(), rules.initial_health);
        self.mosquitoes = MosquitoRegistry::new();
        self.sites = SiteRegistry::from_seeds(&sites);
        self.overlapped_sites.clear();
        self.spray = SprayState::default();

        let total = u32::try_from(self.sites.len()).unwrap_or(u32::MAX);
        self.session =
            SessionState::new(difficulty, sound_enabled, rules.initial_time_left_secs, total);
        self.session.countdown_timer = Some(
            self.scheduler
                .schedule_repeating(COUNTDOWN_PERIOD, TimerPurpose::Countdown),
        );
        self.session.spawn_timer = Some(
            self.scheduler
                .schedule_repeating(rules.spawn_interval(difficulty), TimerPurpose::Spawn),
        );
        self.rules = rules;

        info!(
            %difficulty,
            sites = total,
            seconds = self.session.time_left,
            "session started"
        );
        out_events.push(Event::SessionStarted {
            difficulty,
            sound_enabled,
        });
        out_events.push(Event::TransientMessage {
            text: WELCOME_BANNER.to_owned(),
            duration: WELCOME_BANNER_DURATION,
        });
        out_events.push(Event::HealthChanged {
            health: self.player.health,
        });
        out_events.push(Event::TimerChanged {
            seconds_left: self.session.time_left,
        });
        out_events.push(Event::ScoreChanged {
            score: self.session.score,
        });
        out_events.push(Event::SprayCooldownChanged {
            fraction: self.spray.reported_fraction,
        });
    }

    fn advance(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        out_events.push(Event::TimeAdvanced { dt });

        self.scheduler.begin_advance(dt);
        while let Some((timer, purpose)) = self.scheduler.pop_due() {
            self.fire(timer, purpose, out_events);
        }
        self.scheduler.finish_advance();

        if self.session.is_over() {
            return;
        }
        self.integrate(dt);
        self.report_cooldown(out_events);
    }

    fn integrate(&mut self, dt: Duration) {
        let arena = self.arena;

        let clamped = arena.clamp(
            self.player.position.advanced(self.player.velocity, dt),
            self.rules.player_half_extent,
        );
        self.player.position = clamped.position;
        if clamped.hit_x {
            self.player.velocity.x = 0.0;
        }
        if clamped.hit_y {
            self.player.velocity.y = 0.0;
        }

        let half_extent = self.rules.mosquito_half_extent;
        for mosquito in self.mosquitoes.iter_mut() {
            let next = mosquito.position.advanced(mosquito.velocity, dt);
            let clamped = arena.clamp(next, half_extent);
            mosquito.position = clamped.position;
            if clamped.hit_x {
                mosquito.velocity.x = 0.0;
            }
            if clamped.hit_y {
                mosquito.velocity.y = 0.0;
            }
        }
    }

    fn fire(&mut self, timer: TimerId, purpose: TimerPurpose, out_events: &mut Vec<Event>) {
        let now = self.scheduler.now();
        match purpose {
            TimerPurpose::Countdown => {
                let seconds_left = self.session.tick_countdown();
                out_events.push(Event::TimerChanged { seconds_left });
                if seconds_left == 0 {
                    self.finish(Outcome::Lost, out_events);
                }
            }
            TimerPurpose::Spawn => out_events.push(Event::SpawnDue),
            TimerPurpose::Retarget(mosquito) => {
                if let Some(record) = self.mosquitoes.get_mut(mosquito) {
                    if record.retarget_timer == Some(timer) {
                        record.retarget_timer = None;
                        out_events.push(Event::MosquitoRetargetDue { mosquito });
                    }
                }
            }
            TimerPurpose::Flee(mosquito) => {
                let rise = Velocity::new(0.0, -self.rules.flee_rise_speed);
                let Some(record) = self.mosquitoes.get_mut(mosquito) else {
                    return;
                };
                if record.lifecycle_timer != Some(timer) || !record.flee(rise, now) {
                    return;
                }
                record.lifecycle_timer = Some(
                    self.scheduler
                        .schedule_once(self.rules.flee_duration(), TimerPurpose::Removal(mosquito)),
                );
                debug!(mosquito = mosquito.get(), "mosquito fled");
                out_events.push(Event::MosquitoFled { mosquito });
            }
            TimerPurpose::Removal(mosquito) => {
                let due = self
                    .mosquitoes
                    .get(mosquito)
                    .is_some_and(|record| record.lifecycle_timer == Some(timer));
                if due && self.mosquitoes.remove(mosquito).is_some() {
                    debug!(mosquito = mosquito.get(), "mosquito removed");
                    out_events.push(Event::MosquitoRemoved { mosquito });
                }
            }
            TimerPurpose::Clearing(site) => self.sample_clearing(site, out_events),
            TimerPurpose::FlashEnd => {
                if self.player.flash_timer == Some(timer) {
                    self.player.flash_timer = None;
                    self.player.flashing = false;
                    out_events.push(Event::PlayerFlashingChanged { flashing: false });
                }
            }
        }
    }

    fn report_cooldown(&mut self, out_events: &mut Vec<Event>) {
        let fraction = self
            .spray
            .fraction(self.scheduler.now(), self.rules.spray_cooldown());
        if (fraction - self.spray.reported_fraction).abs() > f32::EPSILON {
            self.spray.reported_fraction = fraction;
            out_events.push(Event::SprayCooldownChanged { fraction });
        }
    }

    fn spray(&mut self, out_events: &mut Vec<Event>) {
        let now = self.scheduler.now();
        if !self.spray.is_ready(now, self.rules.spray_cooldown()) {
            return;
        }
        self.spray.last_trigger = Some(now);

        let origin = self.player.position;
        let radius = self.rules.spray_radius;
        out_events.push(Event::SprayActivated { origin, radius });

        let targets: Vec<MosquitoId> = self
            .mosquitoes
            .hunting_ids()
            .into_iter()
            .filter(|id| {
                self.mosquitoes
                    .get(*id)
                    .is_some_and(|mosquito| mosquito.position.distance(origin) <= radius)
            })
            .collect();

        let mut count: u32 = 0;
        for mosquito in targets {
            if self.kill_mosquito(mosquito, out_events) {
                count = count.saturating_add(1);
            }
        }

        self.report_cooldown(out_events);
        if count == 0 {
            return;
        }

        let points = count.saturating_mul(self.rules.mosquito_killed_reward);
        let score = self.session.award(points);
        out_events.push(Event::ScoreChanged { score });
        out_events.push(Event::MosquitoesEliminated { count, points });
        out_events.push(Event::TransientMessage {
            text: elimination_message(count, points),
            duration: REWARD_MESSAGE_DURATION,
        });
    }

    fn kill_mosquito(&mut self, mosquito: MosquitoId, out_events: &mut Vec<Event>) -> bool {
        let now = self.scheduler.now();
        let Some(record) = self.mosquitoes.get_mut(mosquito) else {
            return false;
        };
        if !record.kill(now) {
            return false;
        }
        if let Some(timer) = record.retarget_timer.take() {
            let _ = self.scheduler.cancel(timer);
        }
        record.lifecycle_timer = Some(
            self.scheduler
                .schedule_once(self.rules.dying_duration(), TimerPurpose::Removal(mosquito)),
        );
        debug!(mosquito = mosquito.get(), "mosquito killed");
        out_events.push(Event::MosquitoKilled { mosquito });
        true
    }

    fn spawn_mosquito(
        &mut self,
        position: Point,
        velocity: Velocity,
        retarget_in: Duration,
        out_events: &mut Vec<Event>,
    ) {
        let now = self.scheduler.now();
        let position = self
            .arena
            .clamp(position, self.rules.mosquito_half_extent)
            .position;
        let mosquito = self.mosquitoes.spawn(position, velocity, now);
        let timer = self
            .scheduler
            .schedule_once(retarget_in, TimerPurpose::Retarget(mosquito));
        if let Some(record) = self.mosquitoes.get_mut(mosquito) {
            record.retarget_timer = Some(timer);
        }
        debug!(mosquito = mosquito.get(), x = position.x, y = position.y, "mosquito spawned");
        out_events.push(Event::MosquitoSpawned { mosquito, position });
    }

    fn retarget_mosquito(
        &mut self,
        mosquito: MosquitoId,
        velocity: Velocity,
        next_retarget_in: Duration,
    ) {
        let now = self.scheduler.now();
        let Some(record) = self.mosquitoes.get_mut(mosquito) else {
            return;
        };
        if !record.wander(velocity, now) {
            return;
        }
        if let Some(timer) = record.retarget_timer.take() {
            let _ = self.scheduler.cancel(timer);
        }
        record.retarget_timer = Some(
            self.scheduler
                .schedule_once(next_retarget_in, TimerPurpose::Retarget(mosquito)),
        );
    }

    fn sample_clearing(&mut self, site: SiteId, out_events: &mut Vec<Event>) {
        if self.sites.clearing().map(|process| process.site) != Some(site) {
            return;
        }
        if !self.within_clearing_range(site) {
            self.cancel_clearing(out_events);
            return;
        }
        match self.sites.step_clearing(site) {
            Some(ClearingStep::Progress { seconds_remaining }) => {
                out_events.push(Event::SiteClearingProgress {
                    site,
                    seconds_remaining,
                });
            }
            Some(ClearingStep::Completed { timer }) => {
                let _ = self.scheduler.cancel(timer);
                self.complete_site(site, out_events);
            }
            None => {}
        }
    }

    fn within_clearing_range(&self, site: SiteId) -> bool {
        self.sites.get(site).is_some_and(|record| {
            record.position.distance(self.player.position) <= self.rules.clearing_proximity_radius
        })
    }

    fn start_clearing(&mut self, site: SiteId, out_events: &mut Vec<Event>) {
        self.cancel_clearing(out_events);
        let ticks = self.rules.clearing_duration_ticks;
        let timer = self
            .scheduler
            .schedule_repeating(self.rules.clearing_tick(), TimerPurpose::Clearing(site));
        if self.sites.begin_clearing(site, ticks, timer) {
            debug!(site = site.get(), "clearing started");
            out_events.push(Event::SiteClearingStarted {
                site,
                seconds_remaining: ticks,
            });
        } else {
            let _ = self.scheduler.cancel(timer);
        }
    }

    fn cancel_clearing(&mut self, out_events: &mut Vec<Event>) {
        if let Some(process) = self.sites.abandon_clearing() {
            let _ = self.scheduler.cancel(process.timer);
            debug!(
                site = process.site.get(),
                ticks = process.elapsed,
                "clearing cancelled"
            );
            out_events.push(Event::SiteClearingCancelled { site: process.site });
        }
    }

    fn complete_site(&mut self, site: SiteId, out_events: &mut Vec<Event>) {
        let reward = self.rules.site_cleared_reward;
        let score = self.session.award(reward);
        let won = self.session.record_cleared();
        info!(
            site = site.get(),
            cleared = self.session.cleared,
            total = self.session.total,
            "breeding site cleared"
        );
        out_events.push(Event::ScoreChanged { score });
        out_events.push(Event::TransientMessage {
            text: format!("Breeding site cleared! +{reward} points"),
            duration: REWARD_MESSAGE_DURATION,
        });
        out_events.push(Event::SiteCleared {
            site,
            cleared: self.session.cleared,
            total: self.session.total,
        });
        if won {
            self.finish(Outcome::Won, out_events);
        }
    }

    /// Performs the terminal transition. Only the first call has any effect.
    fn finish(&mut self, outcome: Outcome, out_events: &mut Vec<Event>) {
        if !self.session.conclude(outcome) {
            return;
        }
        let owned = [
            self.session.countdown_timer.take(),
            self.session.spawn_timer.take(),
        ];
        for timer in owned.into_iter().flatten() {
            let _ = self.scheduler.cancel(timer);
        }
        self.cancel_clearing(out_events);
        self.scheduler.cancel_all();

        let final_score = self.session.score;
        info!(?outcome, final_score, "session over");
        out_events.push(Event::GameOver {
            final_score,
            outcome,
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

fn elimination_message(count: u32, points: u32) -> String {
    let noun = if count == 1 { "mosquito" } else { "mosquitoes" };
    format!("{count} {noun} eliminated! +{points} points")
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Before a session starts and after it ends every command other than
/// [`Command::StartSession`] is ignored.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartSession { config } => world.start(config, out_events),
        _ if !world.session.is_active() => {}
        Command::Tick { dt } => world.advance(dt, out_events),
        Command::SteerPlayer { velocity } => {
            if !world.player.flashing {
                world.player.velocity = velocity;
            }
        }
        Command::SpawnMosquito {
            position,
            velocity,
            retarget_in,
        } => world.spawn_mosquito(position, velocity, retarget_in, out_events),
        Command::SteerMosquito { mosquito, velocity } => {
            let now = world.scheduler.now();
            if let Some(record) = world.mosquitoes.get_mut(mosquito) {
                let _ = record.chase(velocity, now);
            }
        }
        Command::RetargetMosquito {
            mosquito,
            velocity,
            next_retarget_in,
        } => world.retarget_mosquito(mosquito, velocity, next_retarget_in),
        Command::FleeMosquito { mosquito, velocity } => {
            if let Some(record) = world.mosquitoes.get_mut(mosquito) {
                if record.state == MosquitoState::Fled {
                    record.velocity = velocity;
                }
            }
        }
        Command::Spray => world.spray(out_events),
        Command::ResolveInteractions => world.resolve_interactions(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use dengue_patrol_core::{
        Arena, ClearingSnapshot, MosquitoView, PlayerSnapshot, Rules, SessionSnapshot,
        SiteView, SprayCooldownSnapshot,
    };

    use super::World;

    /// Rules governing the current session.
    #[must_use]
    pub fn rules(world: &World) -> &Rules {
        &world.rules
    }

    /// Arena geometry of the current session.
    #[must_use]
    pub fn arena(world: &World) -> Arena {
        world.arena
    }

    /// Simulated time elapsed since the session started.
    #[must_use]
    pub fn now(world: &World) -> Duration {
        world.scheduler.now()
    }

    /// Number of timers currently armed.
    #[must_use]
    pub fn pending_timers(world: &World) -> usize {
        world.scheduler.len()
    }

    /// Captures the session bookkeeping.
    #[must_use]
    pub fn session(world: &World) -> SessionSnapshot {
        let session = &world.session;
        SessionSnapshot {
            started: session.started,
            score: session.score,
            health: world.player.health,
            time_left: session.time_left,
            cleared: session.cleared,
            total: session.total,
            difficulty: session.difficulty,
            sound_enabled: session.sound_enabled,
            is_over: session.is_over(),
            outcome: session.outcome,
        }
    }

    /// Captures the player.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        PlayerSnapshot {
            position: world.player.position,
            velocity: world.player.velocity,
            health: world.player.health,
            flashing: world.player.flashing,
        }
    }

    /// Captures a read-only view of the live mosquitoes.
    #[must_use]
    pub fn mosquito_view(world: &World) -> MosquitoView {
        let now = world.scheduler.now();
        MosquitoView::from_snapshots(
            world
                .mosquitoes
                .iter()
                .map(|mosquito| mosquito.snapshot(now))
                .collect(),
        )
    }

    /// Captures a read-only view of every breeding site.
    #[must_use]
    pub fn site_view(world: &World) -> SiteView {
        SiteView::from_snapshots(world.sites.iter().map(|site| site.snapshot()).collect())
    }

    /// Progress of the in-flight clearing process, if any.
    #[must_use]
    pub fn clearing(world: &World) -> Option<ClearingSnapshot> {
        world.sites.clearing().map(|process| process.snapshot())
    }

    /// Readiness of the spray.
    #[must_use]
    pub fn spray_cooldown(world: &World) -> SprayCooldownSnapshot {
        let now = world.scheduler.now();
        let cooldown = world.rules.spray_cooldown();
        SprayCooldownSnapshot {
            fraction: world.spray.fraction(now, cooldown),
            ready: world.spray.is_ready(now, cooldown),
        }
    }
}
