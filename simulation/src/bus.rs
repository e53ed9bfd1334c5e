//! Typed publish/subscribe channel carrying notifications to the presentation layer.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use dengue_patrol_core::Notification;

/// Broadcasts notifications to every live subscription.
#[derive(Debug, Default)]
pub(crate) struct EventBus {
    subscribers: Vec<Sender<Notification>>,
}

impl EventBus {
    pub(crate) fn subscribe(&mut self) -> Subscription {
        let (sender, receiver) = mpsc::channel();
        self.subscribers.push(sender);
        Subscription {
            receiver,
            closed: false,
        }
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Delivers `notification` to every subscriber, dropping the disconnected ones.
    ///
    /// A game over notification is the last one a subscription receives.
    pub(crate) fn publish(&mut self, notification: Notification) {
        let terminal = matches!(notification, Notification::GameOver { .. });
        self.subscribers
            .retain(|subscriber| subscriber.send(notification.clone()).is_ok());
        if terminal {
            self.close();
        }
    }

    /// Closes every subscription after its queued notifications are drained.
    pub(crate) fn close(&mut self) {
        self.subscribers.clear();
    }
}

/// Receiving end of an [`EventBus`] subscription.
#[derive(Debug)]
pub struct Subscription {
    receiver: Receiver<Notification>,
    closed: bool,
}

impl Subscription {
    /// Takes the next queued notification without blocking.
    pub fn try_next(&mut self) -> Option<Notification> {
        match self.receiver.try_recv() {
            Ok(notification) => Some(notification),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.closed = true;
                None
            }
        }
    }

    /// Takes every queued notification.
    pub fn drain(&mut self) -> Vec<Notification> {
        let mut notifications = Vec::new();
        while let Some(notification) = self.try_next() {
            notifications.push(notification);
        }
        notifications
    }

    /// Reports whether the bus closed this subscription and nothing remains queued.
    ///
    /// Closure is observed while reading, so call this after [`Self::drain`].
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_subscriber_receives_published_notifications() {
        let mut bus = EventBus::default();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        bus.publish(Notification::ScoreChanged { score: 2 });

        assert_eq!(first.drain(), vec![Notification::ScoreChanged { score: 2 }]);
        assert_eq!(second.drain(), vec![Notification::ScoreChanged { score: 2 }]);
        assert!(!first.is_closed());
    }

    #[test]
    fn game_over_closes_subscriptions_after_delivery() {
        let mut bus = EventBus::default();
        let mut subscription = bus.subscribe();

        bus.publish(Notification::GameOver {
            final_score: 7,
            won: false,
        });
        bus.publish(Notification::ScoreChanged { score: 9 });

        assert_eq!(
            subscription.drain(),
            vec![Notification::GameOver {
                final_score: 7,
                won: false
            }]
        );
        assert!(subscription.is_closed());
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn dropped_subscriptions_are_pruned() {
        let mut bus = EventBus::default();
        let subscription = bus.subscribe();
        drop(subscription);

        bus.publish(Notification::TimerChanged { seconds_left: 10 });
        assert_eq!(bus.subscriber_count(), 0);
    }
}
