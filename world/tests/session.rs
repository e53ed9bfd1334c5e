use std::time::Duration;

use dengue_patrol_core::{
    Command, Difficulty, Event, MosquitoState, Outcome, Point, Rules, SessionConfig, SiteId,
    SiteKind, SiteSeed, SiteState, Velocity,
};
use dengue_patrol_world::{self as world, query, World};

fn start(sites: &[Point]) -> (World, Vec<Event>) {
    let mut world = World::new();
    let mut events = Vec::new();
    let sites = sites
        .iter()
        .map(|position| SiteSeed {
            kind: SiteKind::Plant,
            position: *position,
        })
        .collect();
    world::apply(
        &mut world,
        Command::StartSession {
            config: SessionConfig {
                difficulty: Difficulty::Easy,
                sound_enabled: true,
                rules: Rules::default(),
                sites,
            },
        },
        &mut events,
    );
    (world, events)
}

fn run(world: &mut World, command: Command, log: &mut Vec<Event>) {
    world::apply(world, command, log);
}

fn tick(world: &mut World, millis: u64, log: &mut Vec<Event>) {
    run(
        world,
        Command::Tick {
            dt: Duration::from_millis(millis),
        },
        log,
    );
}

fn walk_to(world: &mut World, destination: Point, log: &mut Vec<Event>) {
    let position = query::player(world).position;
    run(
        world,
        Command::SteerPlayer {
            velocity: Velocity::new(destination.x - position.x, destination.y - position.y),
        },
        log,
    );
    tick(world, 1_000, log);
    run(
        world,
        Command::SteerPlayer {
            velocity: Velocity::ZERO,
        },
        log,
    );
}

fn spawn(world: &mut World, position: Point, log: &mut Vec<Event>) {
    run(
        world,
        Command::SpawnMosquito {
            position,
            velocity: Velocity::ZERO,
            retarget_in: Duration::from_secs(60),
        },
        log,
    );
}

fn game_overs(log: &[Event]) -> usize {
    log.iter()
        .filter(|event| matches!(event, Event::GameOver { .. }))
        .count()
}

fn site_state(world: &World, site: u32) -> Option<SiteState> {
    query::site_view(world)
        .get(SiteId::new(site))
        .map(|snapshot| snapshot.state)
}

#[test]
fn spray_kills_only_mosquitoes_within_radius() {
    let (mut world, mut log) = start(&[]);
    walk_to(&mut world, Point::new(100.0, 100.0), &mut log);
    assert_eq!(query::player(&world).position, Point::new(100.0, 100.0));

    spawn(&mut world, Point::new(120.0, 100.0), &mut log);
    spawn(&mut world, Point::new(190.0, 100.0), &mut log);
    spawn(&mut world, Point::new(250.0, 100.0), &mut log);

    log.clear();
    run(&mut world, Command::Spray, &mut log);

    assert!(log.contains(&Event::MosquitoesEliminated {
        count: 2,
        points: 4
    }));
    assert_eq!(query::session(&world).score, 4);
    let states: Vec<MosquitoState> = query::mosquito_view(&world)
        .iter()
        .map(|snapshot| snapshot.state)
        .collect();
    assert_eq!(
        states,
        vec![
            MosquitoState::Dying,
            MosquitoState::Dying,
            MosquitoState::Wandering
        ]
    );
}

#[test]
fn spray_respects_cooldown() {
    let (mut world, mut log) = start(&[]);
    spawn(&mut world, Point::new(450.0, 300.0), &mut log);
    run(&mut world, Command::Spray, &mut log);
    assert_eq!(query::session(&world).score, 2);
    assert!(!query::spray_cooldown(&world).ready);

    tick(&mut world, 500, &mut log);
    spawn(&mut world, Point::new(350.0, 300.0), &mut log);
    log.clear();
    run(&mut world, Command::Spray, &mut log);
    assert!(log.is_empty());
    assert_eq!(query::session(&world).score, 2);
    let cooldown = query::spray_cooldown(&world);
    assert!((cooldown.fraction - 0.5).abs() < 1e-4);

    tick(&mut world, 500, &mut log);
    assert!(query::spray_cooldown(&world).ready);
    run(&mut world, Command::Spray, &mut log);
    assert_eq!(query::session(&world).score, 4);
}

#[test]
fn missed_spray_still_starts_the_cooldown() {
    let (mut world, mut log) = start(&[]);
    log.clear();
    run(&mut world, Command::Spray, &mut log);
    assert!(log.contains(&Event::SprayActivated {
        origin: Point::new(400.0, 300.0),
        radius: 100.0
    }));
    assert!(!log
        .iter()
        .any(|event| matches!(event, Event::MosquitoesEliminated { .. })));
    assert!(!query::spray_cooldown(&world).ready);
}

#[test]
fn absorbed_mosquitoes_are_never_matched_again() {
    let (mut world, mut log) = start(&[]);
    spawn(&mut world, Point::new(405.0, 300.0), &mut log);

    for _ in 0..4 {
        run(&mut world, Command::ResolveInteractions, &mut log);
    }
    run(&mut world, Command::Spray, &mut log);

    let bites = log
        .iter()
        .filter(|event| matches!(event, Event::MosquitoBit { .. }))
        .count();
    assert_eq!(bites, 1);
    assert_eq!(query::player(&world).health, 4);
    assert_eq!(query::session(&world).score, 0);
    assert!(!log
        .iter()
        .any(|event| matches!(event, Event::MosquitoKilled { .. })));
}

#[test]
fn killed_mosquitoes_cannot_bite() {
    let (mut world, mut log) = start(&[]);
    spawn(&mut world, Point::new(405.0, 300.0), &mut log);
    run(&mut world, Command::Spray, &mut log);
    run(&mut world, Command::ResolveInteractions, &mut log);

    assert_eq!(query::player(&world).health, 5);
    tick(&mut world, 500, &mut log);
    assert!(query::mosquito_view(&world).is_empty());
}

#[test]
fn health_never_drops_below_zero_and_game_over_fires_once() {
    let (mut world, mut log) = start(&[]);
    for offset in 0..8 {
        spawn(
            &mut world,
            Point::new(395.0 + offset as f32, 300.0),
            &mut log,
        );
    }

    run(&mut world, Command::ResolveInteractions, &mut log);
    run(&mut world, Command::ResolveInteractions, &mut log);
    tick(&mut world, 200_000, &mut log);

    let session = query::session(&world);
    assert_eq!(session.health, 0);
    assert_eq!(session.outcome, Some(Outcome::Lost));
    assert_eq!(game_overs(&log), 1);
    let bites = log
        .iter()
        .filter(|event| matches!(event, Event::MosquitoBit { .. }))
        .count();
    assert_eq!(bites, 5);
}

#[test]
fn countdown_expiry_loses_exactly_once() {
    let (mut world, mut log) = start(&[Point::new(150.0, 150.0)]);
    tick(&mut world, 500_000, &mut log);
    tick(&mut world, 1_000, &mut log);
    run(&mut world, Command::Spray, &mut log);

    let session = query::session(&world);
    assert_eq!(session.time_left, 0);
    assert!(session.is_over);
    assert_eq!(session.outcome, Some(Outcome::Lost));
    assert_eq!(game_overs(&log), 1);
    assert_eq!(query::pending_timers(&world), 0);
    assert!(log.contains(&Event::TimerChanged { seconds_left: 0 }));
}

#[test]
fn leaving_range_cancels_clearing_without_reward() {
    let (mut world, mut log) = start(&[Point::new(400.0, 300.0)]);
    run(&mut world, Command::ResolveInteractions, &mut log);
    assert_eq!(site_state(&world, 0), Some(SiteState::Clearing));

    for _ in 0..3 {
        tick(&mut world, 1_000, &mut log);
    }
    assert_eq!(
        query::clearing(&world).map(|clearing| clearing.elapsed_ticks),
        Some(3)
    );

    run(
        &mut world,
        Command::SteerPlayer {
            velocity: Velocity::new(600.0, 0.0),
        },
        &mut log,
    );
    tick(&mut world, 100, &mut log);
    tick(&mut world, 900, &mut log);

    assert!(log.contains(&Event::SiteClearingCancelled {
        site: SiteId::new(0)
    }));
    assert_eq!(site_state(&world, 0), Some(SiteState::Active));
    assert!(query::clearing(&world).is_none());
    assert_eq!(query::session(&world).score, 0);
    assert_eq!(query::session(&world).cleared, 0);
}

#[test]
fn walking_away_then_onto_another_site_starts_fresh() {
    let (mut world, mut log) = start(&[Point::new(400.0, 300.0), Point::new(600.0, 300.0)]);
    run(&mut world, Command::ResolveInteractions, &mut log);
    for _ in 0..4 {
        tick(&mut world, 1_000, &mut log);
    }
    assert_eq!(
        query::clearing(&world).map(|clearing| clearing.seconds_remaining),
        Some(1)
    );

    run(
        &mut world,
        Command::SteerPlayer {
            velocity: Velocity::new(2_000.0, 0.0),
        },
        &mut log,
    );
    tick(&mut world, 100, &mut log);
    run(
        &mut world,
        Command::SteerPlayer {
            velocity: Velocity::ZERO,
        },
        &mut log,
    );
    run(&mut world, Command::ResolveInteractions, &mut log);

    assert_eq!(site_state(&world, 0), Some(SiteState::Active));
    assert_eq!(site_state(&world, 1), Some(SiteState::Clearing));
    let clearing = query::clearing(&world).expect("second site clearing");
    assert_eq!(clearing.site, SiteId::new(1));
    assert_eq!(clearing.elapsed_ticks, 0);
    assert_eq!(clearing.seconds_remaining, 5);
    assert_eq!(query::session(&world).score, 0);
}

fn nudge_player(world: &mut World, dx: f32, log: &mut Vec<Event>) {
    run(
        world,
        Command::SteerPlayer {
            velocity: Velocity::new(dx * 10.0, 0.0),
        },
        log,
    );
    tick(world, 100, log);
    run(
        world,
        Command::SteerPlayer {
            velocity: Velocity::ZERO,
        },
        log,
    );
}

#[test]
fn stepping_onto_a_neighbour_switches_while_still_in_range() {
    let (mut world, mut log) = start(&[Point::new(400.0, 300.0), Point::new(440.0, 300.0)]);
    run(&mut world, Command::ResolveInteractions, &mut log);
    for _ in 0..4 {
        tick(&mut world, 1_000, &mut log);
    }
    assert_eq!(
        query::clearing(&world).map(|clearing| (clearing.site, clearing.elapsed_ticks)),
        Some((SiteId::new(0), 4))
    );

    nudge_player(&mut world, 15.0, &mut log);
    assert_eq!(
        query::clearing(&world).map(|clearing| clearing.site),
        Some(SiteId::new(0))
    );
    log.clear();
    run(&mut world, Command::ResolveInteractions, &mut log);

    assert!(log.contains(&Event::SiteClearingCancelled {
        site: SiteId::new(0)
    }));
    assert_eq!(site_state(&world, 0), Some(SiteState::Active));
    assert_eq!(site_state(&world, 1), Some(SiteState::Clearing));
    let clearing = query::clearing(&world).expect("neighbour clearing");
    assert_eq!(clearing.site, SiteId::new(1));
    assert_eq!(clearing.elapsed_ticks, 0);
    assert_eq!(clearing.seconds_remaining, 5);

    for _ in 0..5 {
        tick(&mut world, 1_000, &mut log);
    }
    assert_eq!(site_state(&world, 1), Some(SiteState::Cleared));
    assert_eq!(site_state(&world, 0), Some(SiteState::Active));
    assert_eq!(query::session(&world).score, 5);
}

#[test]
fn losing_overlap_hands_clearing_to_another_overlapped_site() {
    let (mut world, mut log) = start(&[Point::new(400.0, 300.0), Point::new(430.0, 300.0)]);
    run(&mut world, Command::ResolveInteractions, &mut log);
    assert_eq!(site_state(&world, 0), Some(SiteState::Clearing));
    assert_eq!(site_state(&world, 1), Some(SiteState::Active));
    for _ in 0..2 {
        tick(&mut world, 1_000, &mut log);
    }

    nudge_player(&mut world, 40.0, &mut log);
    run(&mut world, Command::ResolveInteractions, &mut log);

    assert_eq!(site_state(&world, 0), Some(SiteState::Active));
    let clearing = query::clearing(&world).expect("second site clearing");
    assert_eq!(clearing.site, SiteId::new(1));
    assert_eq!(clearing.elapsed_ticks, 0);
}

#[test]
fn clearing_every_site_wins() {
    let sites = [
        Point::new(150.0, 150.0),
        Point::new(400.0, 150.0),
        Point::new(650.0, 150.0),
        Point::new(150.0, 450.0),
        Point::new(400.0, 450.0),
        Point::new(650.0, 450.0),
    ];
    let (mut world, mut log) = start(&sites);

    for site in sites {
        walk_to(&mut world, site, &mut log);
        run(&mut world, Command::ResolveInteractions, &mut log);
        for _ in 0..5 {
            tick(&mut world, 1_000, &mut log);
        }
    }

    let session = query::session(&world);
    assert_eq!(session.cleared, 6);
    assert_eq!(session.score, 30);
    assert_eq!(session.outcome, Some(Outcome::Won));
    assert_eq!(game_overs(&log), 1);
    assert!(log.contains(&Event::GameOver {
        final_score: 30,
        outcome: Outcome::Won
    }));
    assert!(query::site_view(&world)
        .iter()
        .all(|site| site.state == SiteState::Cleared));

    tick(&mut world, 1_000, &mut log);
    assert_eq!(query::session(&world).time_left, session.time_left);
}

#[test]
fn cleared_sites_are_not_cleared_twice() {
    let (mut world, mut log) = start(&[Point::new(400.0, 300.0), Point::new(150.0, 150.0)]);
    run(&mut world, Command::ResolveInteractions, &mut log);
    for _ in 0..5 {
        tick(&mut world, 1_000, &mut log);
    }
    assert_eq!(site_state(&world, 0), Some(SiteState::Cleared));

    for _ in 0..3 {
        run(&mut world, Command::ResolveInteractions, &mut log);
        tick(&mut world, 1_000, &mut log);
    }

    let session = query::session(&world);
    assert_eq!(session.cleared, 1);
    assert_eq!(session.score, 5);
    assert!(query::clearing(&world).is_none());
}

#[test]
fn bites_lock_movement_while_flashing() {
    let (mut world, mut log) = start(&[]);
    spawn(&mut world, Point::new(400.0, 300.0), &mut log);
    run(&mut world, Command::ResolveInteractions, &mut log);
    assert!(query::player(&world).flashing);

    run(
        &mut world,
        Command::SteerPlayer {
            velocity: Velocity::new(160.0, 0.0),
        },
        &mut log,
    );
    assert_eq!(query::player(&world).velocity, Velocity::ZERO);

    tick(&mut world, 600, &mut log);
    assert!(!query::player(&world).flashing);
    assert!(log.contains(&Event::PlayerFlashingChanged { flashing: false }));
}
