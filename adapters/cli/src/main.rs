#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Dengue Patrol sessions.

mod autopilot;
mod best_score;
mod rules_file;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use dengue_patrol_core::{Difficulty, Notification, Rules};
use dengue_patrol_rendering::{ArenaPresentation, Color, Hud, Presentation, RenderingBackend, Scene};
use dengue_patrol_rendering_macroquad::MacroquadBackend;
use dengue_patrol_simulation::{PlayerInput, Session, SessionSettings, Subscription};
use dengue_patrol_world::query;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::best_score::BestScore;

/// Fixed step used by headless runs.
const HEADLESS_FRAME: Duration = Duration::from_millis(16);

/// Longest frame delta forwarded to the simulation in windowed play.
const MAX_FRAME: Duration = Duration::from_millis(100);

#[derive(Debug, Parser)]
#[command(name = "dengue-patrol", about = "Clear the breeding sites before the mosquitoes win")]
struct Cli {
    /// Spawn cadence preset.
    #[arg(long, default_value_t = Difficulty::Medium)]
    difficulty: Difficulty,
    /// Seed for layouts and mosquito behaviour; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// TOML file overriding individual rules.
    #[arg(long)]
    rules: Option<PathBuf>,
    /// Start with sound disabled.
    #[arg(long)]
    mute: bool,
    /// Let the autopilot play without opening a window.
    #[arg(long)]
    headless: bool,
    /// Rounds played by the autopilot in headless mode.
    #[arg(long, default_value_t = 1)]
    rounds: u32,
    /// Simulated seconds after which a headless round is abandoned.
    #[arg(long, default_value_t = 240)]
    max_seconds: u64,
    /// File that keeps the best final score between runs.
    #[arg(long)]
    best_score_file: Option<PathBuf>,
    /// Print frame timing once per second in windowed play.
    #[arg(long)]
    show_fps: bool,
}

/// Entry point for the Dengue Patrol command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let rules = match &cli.rules {
        Some(path) => rules_file::load(path)?,
        None => Rules::default(),
    };
    let seed = cli.seed.unwrap_or_else(rand::random);
    let settings = SessionSettings {
        difficulty: cli.difficulty,
        sound_enabled: !cli.mute,
        seed,
        rules,
    };
    let best = BestScore::load(cli.best_score_file.as_deref())?;
    info!(seed, difficulty = %cli.difficulty, "starting dengue patrol");

    if cli.headless {
        run_headless(settings, best, cli.rounds, Duration::from_secs(cli.max_seconds))
    } else {
        run_windowed(settings, best, cli.show_fps)
    }
}

fn run_headless(
    settings: SessionSettings,
    mut best: BestScore,
    rounds: u32,
    max_duration: Duration,
) -> Result<()> {
    let mut session = Session::new(settings).context("invalid session settings")?;

    for round in 1..=rounds {
        let mut subscription = session.subscribe();
        session.start();

        let mut elapsed = Duration::ZERO;
        let mut result = None;
        while result.is_none() && elapsed < max_duration {
            let input = autopilot::decide(session.world());
            let _ = session.step(input, HEADLESS_FRAME);
            elapsed += HEADLESS_FRAME;
            result = subscription
                .drain()
                .into_iter()
                .find_map(|notification| match notification {
                    Notification::GameOver { final_score, won } => Some((final_score, won)),
                    _ => None,
                });
        }

        let world = session.world();
        let snapshot = query::session(world);
        match result {
            Some((final_score, won)) => {
                let verdict = if won { "won" } else { "lost" };
                if best.record(final_score) {
                    info!(final_score, "new best score");
                }
                println!(
                    "round {round}: {verdict} with {final_score} points ({}/{} sites, {} health, {}s left)",
                    snapshot.cleared, snapshot.total, snapshot.health, snapshot.time_left
                );
            }
            None => println!(
                "round {round}: abandoned after {}s with {} points",
                elapsed.as_secs(),
                snapshot.score
            ),
        }
    }

    if let Some(score) = best.best() {
        println!("best score: {score}");
    }
    best.save()
}

fn run_windowed(settings: SessionSettings, mut best: BestScore, show_fps: bool) -> Result<()> {
    let arena = ArenaPresentation::from_rules(&settings.rules).context("invalid arena")?;
    let hud = Hud::new(settings.rules.initial_health);
    let mut session = Session::new(settings).context("invalid session settings")?;
    let mut subscription = session.subscribe();
    session.start();

    let presentation = Presentation::new(
        "Dengue Patrol",
        Color::from_rgb_u8(24, 32, 24),
        Scene::new(arena, hud),
    );

    MacroquadBackend::new()
        .with_vsync(true)
        .with_show_fps(show_fps)
        .run(presentation, move |dt, input, scene| {
            if input.restart && session.is_over() {
                scene.hud.reset();
                subscription = session.subscribe();
                session.start();
            }

            let _ = session.step(
                PlayerInput {
                    movement: input.movement,
                    spray_held: input.spray_held,
                },
                dt.min(MAX_FRAME),
            );
            forward_notifications(&mut subscription, scene, &mut best);

            scene.hud.advance(dt);
            let world = session.world();
            scene.refresh(
                query::rules(world),
                &query::player(world),
                &query::mosquito_view(world),
                &query::site_view(world),
                query::now(world),
            );
        })
}

fn forward_notifications(subscription: &mut Subscription, scene: &mut Scene, best: &mut BestScore) {
    for notification in subscription.drain() {
        if let Notification::GameOver { final_score, .. } = notification {
            if best.record(final_score) {
                info!(final_score, "new best score");
                if let Err(error) = best.save() {
                    warn!(%error, "could not store best score");
                }
            }
        }
        scene.hud.apply(&notification);
    }
}
