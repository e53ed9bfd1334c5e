use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use dengue_patrol_core::{Difficulty, MovementIntent, Notification, Rules, RulesError};
use dengue_patrol_simulation::{PlayerInput, Session, SessionSettings};
use dengue_patrol_world::query;

const FRAME: Duration = Duration::from_millis(16);

fn settings(seed: u64, rules: Rules) -> SessionSettings {
    SessionSettings {
        difficulty: Difficulty::Hard,
        sound_enabled: false,
        seed,
        rules,
    }
}

fn scripted_input(frame: u32) -> PlayerInput {
    let movement = match (frame / 60) % 4 {
        0 => MovementIntent {
            right: true,
            ..MovementIntent::default()
        },
        1 => MovementIntent {
            down: true,
            ..MovementIntent::default()
        },
        2 => MovementIntent {
            left: true,
            ..MovementIntent::default()
        },
        _ => MovementIntent {
            up: true,
            ..MovementIntent::default()
        },
    };
    PlayerInput {
        movement,
        spray_held: frame % 45 < 5,
    }
}

fn replay_fingerprint(seed: u64) -> u64 {
    let mut session = Session::new(settings(seed, Rules::default())).expect("default rules");
    let mut subscription = session.subscribe();
    session.start();

    let mut hasher = DefaultHasher::new();
    for frame in 0..3_000 {
        let _ = session.step(scripted_input(frame), FRAME);
        for notification in subscription.drain() {
            format!("{notification:?}").hash(&mut hasher);
        }
    }

    let world = session.world();
    let snapshot = query::session(world);
    snapshot.score.hash(&mut hasher);
    snapshot.health.hash(&mut hasher);
    snapshot.time_left.hash(&mut hasher);
    for mosquito in query::mosquito_view(world).iter() {
        mosquito.id.get().hash(&mut hasher);
        mosquito.position.x.to_bits().hash(&mut hasher);
        mosquito.position.y.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}

#[test]
fn seeded_sessions_replay_identically() {
    assert_eq!(replay_fingerprint(7), replay_fingerprint(7));
}

#[test]
fn seeds_change_the_site_layout() {
    let layout = |seed| {
        let mut session = Session::new(settings(seed, Rules::default())).expect("default rules");
        session.start();
        query::site_view(session.world())
            .iter()
            .map(|site| (site.position.x.to_bits(), site.position.y.to_bits()))
            .collect::<Vec<_>>()
    };
    assert_eq!(layout(3).len(), 6);
    assert_ne!(layout(3), layout(4));
}

#[test]
fn unusable_rules_are_rejected() {
    let rules = Rules {
        initial_health: 0,
        ..Rules::default()
    };
    assert!(matches!(
        Session::new(settings(1, rules)),
        Err(RulesError::NoHealth)
    ));
}

#[test]
fn non_finite_rules_never_reach_the_systems() {
    let rules = Rules {
        mosquito_speed: f32::NAN,
        ..Rules::default()
    };
    assert!(matches!(
        Session::new(settings(1, rules)),
        Err(RulesError::NotFinite {
            field: "mosquito_speed",
            ..
        })
    ));
}

#[test]
fn huge_speeds_still_spawn_mosquitoes() {
    let rules = Rules {
        mosquito_speed: f32::MAX,
        flee_drift_speed: f32::MAX,
        spawn_interval_hard_ms: 100,
        ..Rules::default()
    };
    let mut session = Session::new(settings(5, rules)).expect("finite rules");
    session.start();
    for _ in 0..20 {
        let _ = session.step(PlayerInput::default(), FRAME);
    }
    assert!(!query::mosquito_view(session.world()).is_empty());
}

#[test]
fn subscriptions_close_after_game_over() {
    let rules = Rules {
        initial_time_left_secs: 2,
        ..Rules::default()
    };
    let mut session = Session::new(settings(11, rules)).expect("valid rules");
    let mut subscription = session.subscribe();
    session.start();

    let mut received = Vec::new();
    for _ in 0..150 {
        let _ = session.step(PlayerInput::default(), FRAME);
        received.extend(subscription.drain());
    }

    assert!(session.is_over());
    assert!(subscription.is_closed());
    assert_eq!(
        received
            .iter()
            .filter(|notification| matches!(notification, Notification::GameOver { .. }))
            .count(),
        1
    );
    assert!(matches!(
        received.last(),
        Some(Notification::GameOver { won: false, .. })
    ));
}

#[test]
fn a_new_round_can_start_after_game_over() {
    let rules = Rules {
        initial_time_left_secs: 1,
        ..Rules::default()
    };
    let mut session = Session::new(settings(5, rules)).expect("valid rules");
    session.start();
    for _ in 0..70 {
        let _ = session.step(PlayerInput::default(), FRAME);
    }
    assert!(session.is_over());

    let mut subscription = session.subscribe();
    session.start();
    assert!(!session.is_over());
    assert!(subscription
        .drain()
        .contains(&Notification::TimerChanged { seconds_left: 1 }));
    assert!(!subscription.is_closed());
}
