use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use dengue_patrol_core::{Command, Difficulty, Event, Rules, SessionConfig};
use dengue_patrol_system_spawning::Spawning;
use dengue_patrol_world::{self as world, query, World};

fn started(difficulty: Difficulty) -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::StartSession {
            config: SessionConfig {
                difficulty,
                sound_enabled: true,
                rules: Rules::default(),
                sites: Vec::new(),
            },
        },
        &mut events,
    );
    world
}

fn advance(world: &mut World, spawning: &mut Spawning, dt: Duration) -> usize {
    let mut events = Vec::new();
    world::apply(world, Command::Tick { dt }, &mut events);
    let mut commands = Vec::new();
    spawning.handle(&events, query::rules(world), &mut commands);
    let spawned = commands.len();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    spawned
}

#[test]
fn emits_multiple_spawn_commands_for_large_dt() {
    let mut world = started(Difficulty::Hard);
    let mut spawning = Spawning::new(0x1234_5678);

    let spawned = advance(&mut world, &mut spawning, Duration::from_secs(10));

    assert_eq!(spawned, 5);
    assert_eq!(query::mosquito_view(&world).len(), 5);
}

#[test]
fn spawning_stops_once_the_session_is_over() {
    let mut world = started(Difficulty::Easy);
    let mut spawning = Spawning::new(3);

    let _ = advance(&mut world, &mut spawning, Duration::from_secs(180));
    assert!(query::session(&world).is_over);
    let before = query::mosquito_view(&world).len();

    assert_eq!(advance(&mut world, &mut spawning, Duration::from_secs(30)), 0);
    assert_eq!(query::mosquito_view(&world).len(), before);
}

#[test]
fn spawn_positions_replay_deterministically() {
    assert_eq!(replay_fingerprint(), replay_fingerprint());
}

fn replay_fingerprint() -> u64 {
    let mut world = started(Difficulty::Medium);
    let mut spawning = Spawning::new(0xdead_beef);
    for _ in 0..40 {
        let _ = advance(&mut world, &mut spawning, Duration::from_millis(500));
    }

    let mut hasher = DefaultHasher::new();
    for mosquito in query::mosquito_view(&world).iter() {
        mosquito.id.get().hash(&mut hasher);
        mosquito.position.x.to_bits().hash(&mut hasher);
        mosquito.position.y.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}
