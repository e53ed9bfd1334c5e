//! Mosquito records, guarded state transitions, and the live registry.

use std::{collections::BTreeMap, time::Duration};

use dengue_patrol_core::{
    Aabb, Arena, MosquitoId, MosquitoSnapshot, MosquitoState, Point, Velocity,
};

use crate::scheduler::TimerId;

/// Authoritative state of a single mosquito.
#[derive(Clone, Debug)]
pub(crate) struct Mosquito {
    pub(crate) id: MosquitoId,
    pub(crate) position: Point,
    pub(crate) velocity: Velocity,
    pub(crate) state: MosquitoState,
    pub(crate) spawned_at: Duration,
    pub(crate) state_since: Duration,
    /// Pending wander retarget, armed only while the mosquito is not absorbed.
    pub(crate) retarget_timer: Option<TimerId>,
    /// Pending flee or removal step of an absorbing sequence.
    pub(crate) lifecycle_timer: Option<TimerId>,
}

impl Mosquito {
    fn is_absorbed(&self) -> bool {
        self.state.is_absorbing()
    }

    fn enter(&mut self, state: MosquitoState, now: Duration) {
        if self.state != state {
            self.state = state;
            self.state_since = now;
        }
    }

    /// Follows a chase vector until the next wander retarget.
    pub(crate) fn chase(&mut self, velocity: Velocity, now: Duration) -> bool {
        if self.is_absorbed() {
            return false;
        }
        self.velocity = velocity;
        self.enter(MosquitoState::Chasing, now);
        true
    }

    /// Adopts a fresh wander vector.
    pub(crate) fn wander(&mut self, velocity: Velocity, now: Duration) -> bool {
        if self.is_absorbed() {
            return false;
        }
        self.velocity = velocity;
        self.enter(MosquitoState::Wandering, now);
        true
    }

    /// Enters `Biting`. Returns `false` when the mosquito was already absorbed.
    pub(crate) fn bite(&mut self, now: Duration) -> bool {
        if self.is_absorbed() {
            return false;
        }
        self.velocity = Velocity::ZERO;
        self.enter(MosquitoState::Biting, now);
        true
    }

    /// Enters `Dying`. Returns `false` when the mosquito was already absorbed.
    pub(crate) fn kill(&mut self, now: Duration) -> bool {
        if self.is_absorbed() {
            return false;
        }
        self.velocity = Velocity::ZERO;
        self.enter(MosquitoState::Dying, now);
        true
    }

    /// Moves a biting mosquito into `Fled`.
    pub(crate) fn flee(&mut self, velocity: Velocity, now: Duration) -> bool {
        if self.state != MosquitoState::Biting {
            return false;
        }
        self.velocity = velocity;
        self.enter(MosquitoState::Fled, now);
        true
    }

    pub(crate) fn snapshot(&self, now: Duration) -> MosquitoSnapshot {
        MosquitoSnapshot {
            id: self.id,
            position: self.position,
            velocity: self.velocity,
            state: self.state,
            spawned_at: self.spawned_at,
            state_elapsed: now.saturating_sub(self.state_since),
        }
    }
}

/// Registry that stores live mosquitoes and manages identifier allocation.
#[derive(Debug, Default)]
pub(crate) struct MosquitoRegistry {
    entries: BTreeMap<MosquitoId, Mosquito>,
    next_id: u32,
}

impl MosquitoRegistry {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Inserts a wandering mosquito and returns its identifier.
    pub(crate) fn spawn(&mut self, position: Point, velocity: Velocity, now: Duration) -> MosquitoId {
        let id = MosquitoId::new(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        let _ = self.entries.insert(
            id,
            Mosquito {
                id,
                position,
                velocity,
                state: MosquitoState::Wandering,
                spawned_at: now,
                state_since: now,
                retarget_timer: None,
                lifecycle_timer: None,
            },
        );
        id
    }

    pub(crate) fn get(&self, id: MosquitoId) -> Option<&Mosquito> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: MosquitoId) -> Option<&mut Mosquito> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: MosquitoId) -> Option<Mosquito> {
        self.entries.remove(&id)
    }

    /// Live mosquitoes in identifier order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Mosquito> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Mosquito> {
        self.entries.values_mut()
    }

    /// Identifiers of mosquitoes that can still bite or be killed.
    pub(crate) fn hunting_ids(&self) -> Vec<MosquitoId> {
        self.entries
            .values()
            .filter(|mosquito| !mosquito.is_absorbed())
            .map(|mosquito| mosquito.id)
            .collect()
    }

    /// Pushes overlapping hunting mosquitoes apart along their shallowest axis.
    pub(crate) fn separate(&mut self, half_extent: f32, arena: Arena) {
        let mut bodies: Vec<(MosquitoId, Point)> = self
            .entries
            .values()
            .filter(|mosquito| !mosquito.is_absorbed())
            .map(|mosquito| (mosquito.id, mosquito.position))
            .collect();

        for first in 0..bodies.len() {
            for second in (first + 1)..bodies.len() {
                let a = Aabb::new(bodies[first].1, half_extent);
                let b = Aabb::new(bodies[second].1, half_extent);
                let Some((depth_x, depth_y)) = a.penetration(&b) else {
                    continue;
                };
                let (a_pos, b_pos) = (bodies[first].1, bodies[second].1);
                if depth_x <= depth_y {
                    let push = depth_x / 2.0;
                    let sign = if a_pos.x <= b_pos.x { 1.0 } else { -1.0 };
                    bodies[first].1.x -= push * sign;
                    bodies[second].1.x += push * sign;
                } else {
                    let push = depth_y / 2.0;
                    let sign = if a_pos.y <= b_pos.y { 1.0 } else { -1.0 };
                    bodies[first].1.y -= push * sign;
                    bodies[second].1.y += push * sign;
                }
            }
        }

        for (id, position) in bodies {
            if let Some(mosquito) = self.entries.get_mut(&id) {
                mosquito.position = arena.clamp(position, half_extent).position;
            }
        }
    }
}
