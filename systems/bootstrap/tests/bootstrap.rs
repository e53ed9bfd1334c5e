use dengue_patrol_core::{
    Difficulty, Event, Rules, SiteState, WELCOME_BANNER, WELCOME_BANNER_DURATION,
};
use dengue_patrol_system_bootstrap::Bootstrap;
use dengue_patrol_world::{self as world, query, World};

#[test]
fn session_command_starts_a_world_with_the_generated_layout() {
    let mut bootstrap = Bootstrap::new(11);
    let mut world = World::new();
    let mut events = Vec::new();

    let command = bootstrap.session_command(Difficulty::Hard, false, Rules::default());
    world::apply(&mut world, command, &mut events);

    assert!(events.contains(&Event::SessionStarted {
        difficulty: Difficulty::Hard,
        sound_enabled: false,
    }));
    let session = query::session(&world);
    assert_eq!(session.total, 6);
    assert_eq!(session.difficulty, Difficulty::Hard);
    assert!(query::site_view(&world)
        .iter()
        .all(|site| site.state == SiteState::Active));
    assert!(events.contains(&Event::TransientMessage {
        text: WELCOME_BANNER.to_owned(),
        duration: WELCOME_BANNER_DURATION,
    }));
}

#[test]
fn consecutive_sessions_draw_fresh_layouts() {
    let mut bootstrap = Bootstrap::new(5);
    let rules = Rules::default();
    let first = bootstrap.layout(&rules);
    let second = bootstrap.layout(&rules);
    assert_ne!(first, second);
}
