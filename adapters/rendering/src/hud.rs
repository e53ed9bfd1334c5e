//! Heads-up display state driven purely by bus notifications.

use std::time::Duration;

use dengue_patrol_core::{Notification, SiteId};
use glam::Vec2;

use crate::to_vec2;

/// Remaining seconds at or below which the clock is drawn as urgent.
pub const URGENT_SECONDS: u32 = 30;

const SPRAY_EFFECT_DURATION: Duration = Duration::from_millis(400);

/// Formats whole seconds as `m:ss`.
#[must_use]
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Expanding ring drawn where the spray was triggered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SprayEffect {
    /// Centre of the ring in world units.
    pub origin: Vec2,
    /// Radius the ring grows to.
    pub radius: f32,
    /// Animation progress in the range 0.0..=1.0.
    pub progress: f32,
    remaining: Duration,
}

/// Final result shown once the round ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameOverBanner {
    /// Score at the terminal transition.
    pub final_score: u32,
    /// Whether every breeding site was cleared.
    pub won: bool,
}

#[derive(Clone, Debug, PartialEq)]
struct TimedMessage {
    text: String,
    remaining: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ClearingIndicator {
    site: SiteId,
    seconds_remaining: u32,
}

/// Score, clock, hearts, spray dial and transient messages.
#[derive(Clone, Debug, PartialEq)]
pub struct Hud {
    score: u32,
    seconds_left: u32,
    health: u8,
    max_health: u8,
    spray_fraction: f32,
    cleared: u32,
    total: u32,
    message: Option<TimedMessage>,
    clearing: Option<ClearingIndicator>,
    spray_effects: Vec<SprayEffect>,
    game_over: Option<GameOverBanner>,
}

impl Hud {
    /// Creates a HUD showing `max_health` hearts.
    #[must_use]
    pub fn new(max_health: u8) -> Self {
        Self {
            score: 0,
            seconds_left: 0,
            health: max_health,
            max_health,
            spray_fraction: 1.0,
            cleared: 0,
            total: 0,
            message: None,
            clearing: None,
            spray_effects: Vec::new(),
            game_over: None,
        }
    }

    /// Forgets the previous round while keeping the heart capacity.
    pub fn reset(&mut self) {
        *self = Self::new(self.max_health);
    }

    /// Folds a notification into the displayed state.
    pub fn apply(&mut self, notification: &Notification) {
        match notification {
            Notification::ScoreChanged { score } => self.score = *score,
            Notification::TimerChanged { seconds_left } => self.seconds_left = *seconds_left,
            Notification::HealthChanged { health } => self.health = *health,
            Notification::SprayCooldownChanged { fraction } => {
                self.spray_fraction = fraction.clamp(0.0, 1.0);
            }
            Notification::SprayActivated { origin, radius } => {
                self.spray_effects.push(SprayEffect {
                    origin: to_vec2(*origin),
                    radius: *radius,
                    progress: 0.0,
                    remaining: SPRAY_EFFECT_DURATION,
                });
            }
            Notification::TransientMessage { text, duration } => {
                self.message = Some(TimedMessage {
                    text: text.clone(),
                    remaining: *duration,
                });
            }
            Notification::SiteClearingStarted {
                site,
                seconds_remaining,
            }
            | Notification::SiteClearingProgress {
                site,
                seconds_remaining,
            } => {
                self.clearing = Some(ClearingIndicator {
                    site: *site,
                    seconds_remaining: *seconds_remaining,
                });
            }
            Notification::SiteClearingCancelled { site } => {
                if self.clearing.map(|indicator| indicator.site) == Some(*site) {
                    self.clearing = None;
                }
            }
            Notification::SiteCleared {
                cleared, total, ..
            } => {
                self.clearing = None;
                self.cleared = *cleared;
                self.total = *total;
            }
            Notification::MosquitoesEliminated { .. } => {}
            Notification::GameOver { final_score, won } => {
                self.clearing = None;
                self.game_over = Some(GameOverBanner {
                    final_score: *final_score,
                    won: *won,
                });
            }
        }
    }

    /// Ages transient messages and effects by a frame.
    pub fn advance(&mut self, dt: Duration) {
        if let Some(message) = &mut self.message {
            message.remaining = message.remaining.saturating_sub(dt);
            if message.remaining.is_zero() {
                self.message = None;
            }
        }

        for effect in &mut self.spray_effects {
            effect.remaining = effect.remaining.saturating_sub(dt);
            let elapsed = SPRAY_EFFECT_DURATION.saturating_sub(effect.remaining);
            effect.progress = elapsed.as_secs_f32() / SPRAY_EFFECT_DURATION.as_secs_f32();
        }
        self.spray_effects.retain(|effect| !effect.remaining.is_zero());
    }

    /// Current score.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Score caption.
    #[must_use]
    pub fn score_text(&self) -> String {
        format!("Score: {}", self.score)
    }

    /// Remaining time formatted as `m:ss`.
    #[must_use]
    pub fn clock_text(&self) -> String {
        format_clock(self.seconds_left)
    }

    /// Whether the clock should be highlighted.
    #[must_use]
    pub fn clock_is_urgent(&self) -> bool {
        self.seconds_left <= URGENT_SECONDS
    }

    /// Hearts currently shown.
    #[must_use]
    pub fn hearts(&self) -> u8 {
        self.health.min(self.max_health)
    }

    /// Heart slots available.
    #[must_use]
    pub fn max_hearts(&self) -> u8 {
        self.max_health
    }

    /// Fill of the spray dial, 1.0 when ready.
    #[must_use]
    pub fn spray_fraction(&self) -> f32 {
        self.spray_fraction
    }

    /// Progress caption such as `Sites: 2/6`.
    #[must_use]
    pub fn sites_text(&self) -> String {
        format!("Sites: {}/{}", self.cleared, self.total)
    }

    /// Currently displayed transient message.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_ref().map(|message| message.text.as_str())
    }

    /// Clearing progress caption for the site being cleared.
    #[must_use]
    pub fn clearing_text(&self) -> Option<String> {
        self.clearing
            .map(|indicator| format!("Eliminating... {}s", indicator.seconds_remaining))
    }

    /// Identifier of the site whose clearing progress is displayed.
    #[must_use]
    pub fn clearing_site(&self) -> Option<SiteId> {
        self.clearing.map(|indicator| indicator.site)
    }

    /// Spray rings still animating.
    #[must_use]
    pub fn spray_effects(&self) -> &[SprayEffect] {
        &self.spray_effects
    }

    /// Result banner once the round ended.
    #[must_use]
    pub fn game_over(&self) -> Option<GameOverBanner> {
        self.game_over
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dengue_patrol_core::Point;

    #[test]
    fn clock_is_formatted_as_minutes_and_seconds() {
        assert_eq!(format_clock(180), "3:00");
        assert_eq!(format_clock(65), "1:05");
        assert_eq!(format_clock(9), "0:09");
    }

    #[test]
    fn clock_turns_urgent_at_thirty_seconds() {
        let mut hud = Hud::new(5);
        hud.apply(&Notification::TimerChanged { seconds_left: 31 });
        assert!(!hud.clock_is_urgent());
        hud.apply(&Notification::TimerChanged { seconds_left: 30 });
        assert!(hud.clock_is_urgent());
        assert_eq!(hud.clock_text(), "0:30");
    }

    #[test]
    fn messages_expire_after_their_duration() {
        let mut hud = Hud::new(5);
        hud.apply(&Notification::TransientMessage {
            text: "Breeding site cleared! +5 points".to_owned(),
            duration: Duration::from_millis(1_500),
        });
        hud.advance(Duration::from_millis(1_000));
        assert_eq!(hud.message(), Some("Breeding site cleared! +5 points"));
        hud.advance(Duration::from_millis(500));
        assert_eq!(hud.message(), None);
    }

    #[test]
    fn clearing_caption_tracks_progress_and_cancellation() {
        let mut hud = Hud::new(5);
        let site = SiteId::new(3);
        hud.apply(&Notification::SiteClearingStarted {
            site,
            seconds_remaining: 5,
        });
        hud.apply(&Notification::SiteClearingProgress {
            site,
            seconds_remaining: 4,
        });
        assert_eq!(hud.clearing_text().as_deref(), Some("Eliminating... 4s"));

        hud.apply(&Notification::SiteClearingCancelled {
            site: SiteId::new(1),
        });
        assert_eq!(hud.clearing_site(), Some(site));
        hud.apply(&Notification::SiteClearingCancelled { site });
        assert!(hud.clearing_text().is_none());
    }

    #[test]
    fn hearts_follow_health_and_reset_restores_them() {
        let mut hud = Hud::new(5);
        hud.apply(&Notification::HealthChanged { health: 2 });
        hud.apply(&Notification::GameOver {
            final_score: 12,
            won: false,
        });
        assert_eq!(hud.hearts(), 2);
        assert_eq!(
            hud.game_over(),
            Some(GameOverBanner {
                final_score: 12,
                won: false
            })
        );

        hud.reset();
        assert_eq!(hud.hearts(), 5);
        assert!(hud.game_over().is_none());
    }

    #[test]
    fn spray_rings_grow_then_disappear() {
        let mut hud = Hud::new(5);
        hud.apply(&Notification::SprayActivated {
            origin: Point::new(400.0, 300.0),
            radius: 100.0,
        });
        hud.advance(Duration::from_millis(200));
        let effects = hud.spray_effects();
        assert_eq!(effects.len(), 1);
        assert!((effects[0].progress - 0.5).abs() < 1e-4);
        assert_eq!(effects[0].origin, Vec2::new(400.0, 300.0));

        hud.advance(Duration::from_millis(200));
        assert!(hud.spray_effects().is_empty());
    }
}
