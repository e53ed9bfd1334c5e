//! Scripted player used by headless runs.

use dengue_patrol_core::{MovementIntent, Point, SiteState};
use dengue_patrol_simulation::PlayerInput;
use dengue_patrol_world::{query, World};

/// Distance per axis under which the autopilot stops steering toward a site.
const ARRIVAL_TOLERANCE: f32 = 6.0;

/// Share of the spray radius the autopilot waits for before spraying.
const SPRAY_REACH: f32 = 0.8;

/// Walks to the nearest uncleared breeding site and sprays nearby mosquitoes.
pub(crate) fn decide(world: &World) -> PlayerInput {
    let player = query::player(world);
    let rules = query::rules(world);

    let target = query::site_view(world)
        .iter()
        .filter(|site| site.state != SiteState::Cleared)
        .map(|site| site.position)
        .min_by(|left, right| {
            left.distance(player.position)
                .total_cmp(&right.distance(player.position))
        });
    let movement = target.map_or_else(MovementIntent::default, |target| {
        steer(player.position, target)
    });

    let reach = rules.spray_radius * SPRAY_REACH;
    let spray_held = query::mosquito_view(world).iter().any(|mosquito| {
        !mosquito.state.is_absorbing() && mosquito.position.distance(player.position) <= reach
    });

    PlayerInput {
        movement,
        spray_held,
    }
}

fn steer(from: Point, to: Point) -> MovementIntent {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    MovementIntent {
        left: dx < -ARRIVAL_TOLERANCE,
        right: dx > ARRIVAL_TOLERANCE,
        up: dy < -ARRIVAL_TOLERANCE,
        down: dy > ARRIVAL_TOLERANCE,
    }
}
