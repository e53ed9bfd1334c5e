//! Interaction resolver: player↔site, player↔mosquito, mosquito↔mosquito.

use dengue_patrol_core::{Aabb, Event, MosquitoId, Outcome, SiteId, SiteState};
use tracing::debug;

use crate::{scheduler::TimerPurpose, World};

impl World {
    /// Evaluates every overlap once, in site, bite, separation order.
    pub(crate) fn resolve_interactions(&mut self, out_events: &mut Vec<Event>) {
        self.resolve_sites(out_events);
        self.resolve_bites(out_events);
        if !self.session.is_over() {
            self.mosquitoes
                .separate(self.rules.mosquito_half_extent, self.arena);
        }
    }

    fn resolve_sites(&mut self, out_events: &mut Vec<Event>) {
        let current = self.sites.clearing().map(|process| process.site);
        if let Some(site) = current {
            if !self.within_clearing_range(site) {
                self.cancel_clearing(out_events);
            }
        }
        let current = self.sites.clearing().map(|process| process.site);

        let player = Aabb::new(self.player.position, self.rules.player_half_extent);
        let half_extent = self.rules.site_half_extent;
        let overlapped: Vec<SiteId> = self
            .sites
            .iter()
            .filter(|site| site.state != SiteState::Cleared)
            .filter(|site| player.overlaps(&Aabb::new(site.position, half_extent)))
            .map(|site| site.id)
            .collect();

        let entered = overlapped
            .iter()
            .copied()
            .find(|site| Some(*site) != current && !self.overlapped_sites.contains(site));
        let target = match current {
            None => overlapped.first().copied(),
            Some(site) if overlapped.contains(&site) => entered,
            Some(site) => entered.or_else(|| overlapped.iter().copied().find(|id| *id != site)),
        };
        self.overlapped_sites = overlapped;

        if let Some(site) = target {
            self.start_clearing(site, out_events);
        }
    }

    fn resolve_bites(&mut self, out_events: &mut Vec<Event>) {
        let player = Aabb::new(self.player.position, self.rules.player_half_extent);
        let half_extent = self.rules.mosquito_half_extent;
        let biters: Vec<MosquitoId> = self
            .mosquitoes
            .hunting_ids()
            .into_iter()
            .filter(|id| {
                self.mosquitoes.get(*id).is_some_and(|mosquito| {
                    player.overlaps(&Aabb::new(mosquito.position, half_extent))
                })
            })
            .collect();

        for mosquito in biters {
            if self.session.is_over() {
                break;
            }
            let _ = self.bite_mosquito(mosquito, out_events);
        }
    }

    /// Applies a bite from `mosquito`. Repeated calls for the same mosquito are no-ops.
    pub(crate) fn bite_mosquito(
        &mut self,
        mosquito: MosquitoId,
        out_events: &mut Vec<Event>,
    ) -> bool {
        if !self.session.is_active() {
            return false;
        }
        let now = self.scheduler.now();
        let Some(record) = self.mosquitoes.get_mut(mosquito) else {
            return false;
        };
        if !record.bite(now) {
            return false;
        }
        if let Some(timer) = record.retarget_timer.take() {
            let _ = self.scheduler.cancel(timer);
        }
        record.lifecycle_timer = Some(
            self.scheduler
                .schedule_once(self.rules.bite_flee_delay(), TimerPurpose::Flee(mosquito)),
        );
        out_events.push(Event::MosquitoBit { mosquito });

        self.player.health = self.player.health.saturating_sub(self.rules.bite_damage);
        debug!(
            mosquito = mosquito.get(),
            health = self.player.health,
            "player bitten"
        );
        out_events.push(Event::HealthChanged {
            health: self.player.health,
        });

        if !self.player.flashing {
            self.player.flashing = true;
            self.player.flash_timer = Some(
                self.scheduler
                    .schedule_once(self.rules.flash_duration(), TimerPurpose::FlashEnd),
            );
            out_events.push(Event::PlayerFlashingChanged { flashing: true });
        }

        if self.player.health == 0 {
            self.finish(Outcome::Lost, out_events);
        }
        true
    }
}
