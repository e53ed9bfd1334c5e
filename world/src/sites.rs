//! Breeding sites and the singleton clearing process.

use std::collections::BTreeMap;

use dengue_patrol_core::{
    ClearingSnapshot, Point, SiteId, SiteKind, SiteSeed, SiteSnapshot, SiteState,
};

use crate::scheduler::TimerId;

#[derive(Clone, Debug)]
pub(crate) struct BreedingSite {
    pub(crate) id: SiteId,
    pub(crate) kind: SiteKind,
    pub(crate) position: Point,
    pub(crate) state: SiteState,
}

impl BreedingSite {
    pub(crate) fn snapshot(&self) -> SiteSnapshot {
        SiteSnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            state: self.state,
        }
    }
}

/// In-flight attempt to clear a site.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ClearingProcess {
    pub(crate) site: SiteId,
    pub(crate) remaining: u32,
    pub(crate) elapsed: u32,
    pub(crate) timer: TimerId,
}

impl ClearingProcess {
    pub(crate) fn snapshot(&self) -> ClearingSnapshot {
        ClearingSnapshot {
            site: self.site,
            elapsed_ticks: self.elapsed,
            seconds_remaining: self.remaining,
        }
    }
}

/// Result of one clearing progress sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ClearingStep {
    /// The site needs more in-range ticks.
    Progress { seconds_remaining: u32 },
    /// The site is now cleared; the progress timer must be released.
    Completed { timer: TimerId },
}

/// Fixed set of breeding sites laid out at session start.
#[derive(Debug, Default)]
pub(crate) struct SiteRegistry {
    entries: BTreeMap<SiteId, BreedingSite>,
    clearing: Option<ClearingProcess>,
}

impl SiteRegistry {
    pub(crate) fn from_seeds(seeds: &[SiteSeed]) -> Self {
        let entries = seeds
            .iter()
            .zip(0u32..)
            .map(|(seed, index)| {
                let id = SiteId::new(index);
                (
                    id,
                    BreedingSite {
                        id,
                        kind: seed.kind,
                        position: seed.position,
                        state: SiteState::Active,
                    },
                )
            })
            .collect();
        Self {
            entries,
            clearing: None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn get(&self, id: SiteId) -> Option<&BreedingSite> {
        self.entries.get(&id)
    }

    /// Sites in identifier order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &BreedingSite> {
        self.entries.values()
    }

    pub(crate) fn clearing(&self) -> Option<&ClearingProcess> {
        self.clearing.as_ref()
    }

    /// Starts clearing an active site. Any previous process must be abandoned first.
    pub(crate) fn begin_clearing(&mut self, id: SiteId, ticks: u32, timer: TimerId) -> bool {
        if self.clearing.is_some() {
            return false;
        }
        let Some(site) = self.entries.get_mut(&id) else {
            return false;
        };
        if site.state != SiteState::Active {
            return false;
        }
        site.state = SiteState::Clearing;
        self.clearing = Some(ClearingProcess {
            site: id,
            remaining: ticks,
            elapsed: 0,
            timer,
        });
        true
    }

    /// Drops the in-flight process and returns its site to `Active`.
    pub(crate) fn abandon_clearing(&mut self) -> Option<ClearingProcess> {
        let process = self.clearing.take()?;
        if let Some(site) = self.entries.get_mut(&process.site) {
            if site.state == SiteState::Clearing {
                site.state = SiteState::Active;
            }
        }
        Some(process)
    }

    /// Records one in-range progress tick for `id`.
    pub(crate) fn step_clearing(&mut self, id: SiteId) -> Option<ClearingStep> {
        let process = self.clearing.as_mut().filter(|process| process.site == id)?;
        process.remaining = process.remaining.saturating_sub(1);
        process.elapsed = process.elapsed.saturating_add(1);
        if process.remaining > 0 {
            return Some(ClearingStep::Progress {
                seconds_remaining: process.remaining,
            });
        }

        let timer = process.timer;
        self.clearing = None;
        if let Some(site) = self.entries.get_mut(&id) {
            site.state = SiteState::Cleared;
        }
        Some(ClearingStep::Completed { timer })
    }
}
