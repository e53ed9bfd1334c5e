#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares a Dengue Patrol session.

use dengue_patrol_core::{Command, Difficulty, Point, Rules, SessionConfig, SiteKind, SiteSeed};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Produces the data required to start a session.
#[derive(Debug)]
pub struct Bootstrap {
    rng: ChaCha8Rng,
}

impl Bootstrap {
    /// Creates a bootstrap system whose layouts derive from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Lays out the breeding sites for a new session.
    ///
    /// Each site is drawn uniformly inside the padded arena. Candidates closer
    /// than `site_min_distance` to an earlier site are redrawn until
    /// `site_placement_attempts` is exhausted, after which the last candidate
    /// is kept.
    pub fn layout(&mut self, rules: &Rules) -> Vec<SiteSeed> {
        let capacity = usize::try_from(rules.total_breeding_sites).unwrap_or(0);
        let mut sites: Vec<SiteSeed> = Vec::with_capacity(capacity);

        for _ in 0..rules.total_breeding_sites {
            let mut attempts = 0;
            let position = loop {
                let candidate = Point::new(
                    self.coordinate(rules.arena_width, rules.site_padding),
                    self.coordinate(rules.arena_height, rules.site_padding),
                );
                attempts += 1;
                let crowded = sites
                    .iter()
                    .any(|site| site.position.distance(candidate) < rules.site_min_distance);
                if !crowded || attempts >= rules.site_placement_attempts {
                    break candidate;
                }
            };
            let kind = SiteKind::ALL[self.rng.gen_range(0..SiteKind::ALL.len())];
            sites.push(SiteSeed { kind, position });
        }

        sites
    }

    /// Builds the command that starts a fresh session with a new layout.
    pub fn session_command(
        &mut self,
        difficulty: Difficulty,
        sound_enabled: bool,
        rules: Rules,
    ) -> Command {
        let sites = self.layout(&rules);
        Command::StartSession {
            config: SessionConfig {
                difficulty,
                sound_enabled,
                rules,
                sites,
            },
        }
    }

    fn coordinate(&mut self, extent: f32, padding: f32) -> f32 {
        let span = (extent - padding * 2.0).max(0.0);
        padding + self.rng.gen::<f32>() * span
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_respects_padding_and_count() {
        let rules = Rules::default();
        let sites = Bootstrap::new(7).layout(&rules);

        assert_eq!(sites.len(), 6);
        for site in &sites {
            assert!(site.position.x >= 100.0 && site.position.x <= 700.0);
            assert!(site.position.y >= 100.0 && site.position.y <= 500.0);
        }
    }

    #[test]
    fn layout_is_reproducible_for_a_seed() {
        let rules = Rules::default();
        assert_eq!(
            Bootstrap::new(42).layout(&rules),
            Bootstrap::new(42).layout(&rules)
        );
    }

    #[test]
    fn crowded_arena_still_places_every_site() {
        let rules = Rules {
            total_breeding_sites: 12,
            site_min_distance: 10_000.0,
            ..Rules::default()
        };
        assert_eq!(Bootstrap::new(3).layout(&rules).len(), 12);
    }
}
