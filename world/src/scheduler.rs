//! Virtual clock and cancellable timers driven by simulation ticks.

use std::{collections::BTreeMap, time::Duration};

use dengue_patrol_core::{MosquitoId, SiteId};

/// Handle identifying a scheduled timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct TimerId(u64);

/// Reason a timer exists, dispatched by the world when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TimerPurpose {
    /// One-second session countdown.
    Countdown,
    /// Mosquito spawn cadence.
    Spawn,
    /// Mosquito wander retarget.
    Retarget(MosquitoId),
    /// Bite pause elapsed; the mosquito flees.
    Flee(MosquitoId),
    /// Exit sequence finished; the mosquito is removed.
    Removal(MosquitoId),
    /// Clearing progress sample.
    Clearing(SiteId),
    /// End of the player's input lock.
    FlashEnd,
}

#[derive(Clone, Copy, Debug)]
struct Timer {
    purpose: TimerPurpose,
    due: Duration,
    period: Option<Duration>,
}

/// Virtual clock that owns every timer of a session.
#[derive(Debug, Default)]
pub(crate) struct Scheduler {
    now: Duration,
    target: Duration,
    timers: BTreeMap<TimerId, Timer>,
    next_id: u64,
}

impl Scheduler {
    /// Creates a scheduler with the clock at zero and no timers.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Current session time.
    pub(crate) fn now(&self) -> Duration {
        self.now
    }

    /// Number of armed timers.
    pub(crate) fn len(&self) -> usize {
        self.timers.len()
    }

    /// Arms a timer that fires once after `delay`.
    pub(crate) fn schedule_once(&mut self, delay: Duration, purpose: TimerPurpose) -> TimerId {
        self.insert(Timer {
            purpose,
            due: self.now.saturating_add(delay),
            period: None,
        })
    }

    /// Arms a timer that fires every `period`, starting one period from now.
    pub(crate) fn schedule_repeating(
        &mut self,
        period: Duration,
        purpose: TimerPurpose,
    ) -> TimerId {
        self.insert(Timer {
            purpose,
            due: self.now.saturating_add(period),
            period: Some(period),
        })
    }

    fn insert(&mut self, timer: Timer) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        let _ = self.timers.insert(id, timer);
        id
    }

    /// Disarms a timer. Returns `false` when it had already fired or been cancelled.
    pub(crate) fn cancel(&mut self, id: TimerId) -> bool {
        self.timers.remove(&id).is_some()
    }

    /// Disarms every timer.
    pub(crate) fn cancel_all(&mut self) {
        self.timers.clear();
    }

    /// Starts advancing the clock by `dt`; timers are then drained with [`Self::pop_due`].
    pub(crate) fn begin_advance(&mut self, dt: Duration) {
        self.target = self.now.saturating_add(dt);
    }

    /// Pops the earliest timer due before the advance target.
    ///
    /// The clock moves to the firing time so handlers schedule relative to it.
    /// Repeating timers are re-armed one period later before being returned.
    pub(crate) fn pop_due(&mut self) -> Option<(TimerId, TimerPurpose)> {
        let (id, timer) = self
            .timers
            .iter()
            .filter(|(_, timer)| timer.due <= self.target)
            .min_by_key(|(id, timer)| (timer.due, **id))
            .map(|(id, timer)| (*id, *timer))?;

        self.now = self.now.max(timer.due);
        match timer.period {
            Some(period) if !period.is_zero() => {
                if let Some(entry) = self.timers.get_mut(&id) {
                    entry.due = timer.due.saturating_add(period);
                }
            }
            _ => {
                let _ = self.timers.remove(&id);
            }
        }
        Some((id, timer.purpose))
    }

    /// Completes the advance started by [`Self::begin_advance`].
    pub(crate) fn finish_advance(&mut self) {
        self.now = self.now.max(self.target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(scheduler: &mut Scheduler, dt: Duration) -> Vec<TimerPurpose> {
        scheduler.begin_advance(dt);
        let mut fired = Vec::new();
        while let Some((_, purpose)) = scheduler.pop_due() {
            fired.push(purpose);
        }
        scheduler.finish_advance();
        fired
    }

    #[test]
    fn one_shot_fires_once_at_due_time() {
        let mut scheduler = Scheduler::new();
        let _ = scheduler.schedule_once(Duration::from_millis(500), TimerPurpose::FlashEnd);

        assert!(drain(&mut scheduler, Duration::from_millis(499)).is_empty());
        assert_eq!(
            drain(&mut scheduler, Duration::from_millis(1)),
            vec![TimerPurpose::FlashEnd]
        );
        assert!(drain(&mut scheduler, Duration::from_secs(10)).is_empty());
        assert_eq!(scheduler.len(), 0);
    }

    #[test]
    fn repeating_timer_fires_once_per_period_in_large_steps() {
        let mut scheduler = Scheduler::new();
        let _ = scheduler.schedule_repeating(Duration::from_secs(1), TimerPurpose::Countdown);

        let fired = drain(&mut scheduler, Duration::from_millis(3_500));
        assert_eq!(fired.len(), 3);
        assert_eq!(scheduler.now(), Duration::from_millis(3_500));
        assert_eq!(drain(&mut scheduler, Duration::from_millis(500)).len(), 1);
    }

    #[test]
    fn timers_fire_in_due_then_creation_order() {
        let mut scheduler = Scheduler::new();
        let _ = scheduler.schedule_once(Duration::from_secs(2), TimerPurpose::Spawn);
        let _ = scheduler.schedule_once(Duration::from_secs(1), TimerPurpose::FlashEnd);
        let _ = scheduler.schedule_once(Duration::from_secs(1), TimerPurpose::Countdown);

        assert_eq!(
            drain(&mut scheduler, Duration::from_secs(2)),
            vec![
                TimerPurpose::FlashEnd,
                TimerPurpose::Countdown,
                TimerPurpose::Spawn
            ]
        );
    }

    #[test]
    fn cancellation_is_idempotent() {
        let mut scheduler = Scheduler::new();
        let id = scheduler.schedule_repeating(Duration::from_secs(1), TimerPurpose::Spawn);

        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        assert!(drain(&mut scheduler, Duration::from_secs(5)).is_empty());
    }

    #[test]
    fn cancelling_mid_advance_prevents_later_firings() {
        let mut scheduler = Scheduler::new();
        let countdown = scheduler.schedule_repeating(Duration::from_secs(1), TimerPurpose::Countdown);

        scheduler.begin_advance(Duration::from_secs(5));
        assert!(scheduler.pop_due().is_some());
        assert!(scheduler.cancel(countdown));
        assert!(scheduler.pop_due().is_none());
        scheduler.finish_advance();
        assert_eq!(scheduler.now(), Duration::from_secs(5));
    }
}
