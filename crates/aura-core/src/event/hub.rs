// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt;

/// Identifies one subscription on an [`EventHub`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type EventFilter<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

struct Subscriber<T> {
    id: SubscriptionId,
    sender: flume::Sender<T>,
    filter: Option<EventFilter<T>>,
}

/// The receiving end handed to a subscriber.
///
/// Events queue up until they are received. A subscription from
/// [`EventHub::subscribe`] is unbounded, so a live subscriber must drain it
/// regularly (or be dropped). Use [`EventHub::subscribe_bounded`] when the
/// consumer may fall behind.
#[derive(Debug)]
pub struct Subscription<T> {
    id: SubscriptionId,
    receiver: flume::Receiver<T>,
}

impl<T> Subscription<T> {
    /// The id to pass to [`EventHub::unsubscribe`].
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// The underlying channel, for blocking or async consumption.
    pub fn receiver(&self) -> &flume::Receiver<T> {
        &self.receiver
    }

    /// Takes every event delivered so far without blocking.
    pub fn drain(&self) -> Vec<T> {
        self.receiver.try_iter().collect()
    }
}

/// A fan-out channel: every published event is cloned to each matching subscriber.
///
/// Subscribers whose receiving end has been dropped are pruned on the next
/// publish.
pub struct EventHub<T: Clone + Send + 'static> {
    subscribers: Vec<Subscriber<T>>,
    next_id: u64,
}

impl<T: Clone + Send + 'static> EventHub<T> {
    /// Creates a hub with no subscribers.
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    /// Subscribes to every event.
    pub fn subscribe(&mut self) -> Subscription<T> {
        self.add_subscriber(None)
    }

    /// Subscribes to every event through a channel holding at most `capacity` events.
    ///
    /// Events published while the channel is full are dropped for this subscriber.
    pub fn subscribe_bounded(&mut self, capacity: usize) -> Subscription<T> {
        self.add_subscriber_with(None, flume::bounded(capacity.max(1)))
    }

    /// Subscribes to the events accepted by `filter`.
    pub fn subscribe_filtered<F>(&mut self, filter: F) -> Subscription<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.add_subscriber(Some(Box::new(filter)))
    }

    /// Removes a subscription. Unknown ids are ignored.
    ///
    /// Returns `true` if a subscriber was removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        before != self.subscribers.len()
    }

    /// Delivers `event` to every matching subscriber.
    pub fn publish(&mut self, event: T) {
        log::trace!("Publishing an event to {} subscribers.", self.subscribers.len());

        self.subscribers.retain(|subscriber| {
            if let Some(filter) = &subscriber.filter {
                if !filter(&event) {
                    return true;
                }
            }
            match subscriber.sender.try_send(event.clone()) {
                Ok(()) => true,
                Err(flume::TrySendError::Full(_)) => {
                    log::trace!("Subscriber {:?} is full, event dropped.", subscriber.id);
                    true
                }
                Err(flume::TrySendError::Disconnected(_)) => {
                    log::debug!(
                        "Dropping subscriber {:?}: receiver disconnected.",
                        subscriber.id
                    );
                    false
                }
            }
        });
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Drops every subscription, closing their channels.
    pub fn clear(&mut self) {
        self.subscribers.clear();
    }

    fn add_subscriber(&mut self, filter: Option<EventFilter<T>>) -> Subscription<T> {
        self.add_subscriber_with(filter, flume::unbounded())
    }

    fn add_subscriber_with(
        &mut self,
        filter: Option<EventFilter<T>>,
        (sender, receiver): (flume::Sender<T>, flume::Receiver<T>),
    ) -> Subscription<T> {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber {
            id,
            sender,
            filter,
        });
        Subscription { id, receiver }
    }
}

impl<T: Clone + Send + 'static> Default for EventHub<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> fmt::Debug for EventHub<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHub")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flume::TryRecvError;

    #[derive(Debug, Clone, PartialEq)]
    enum Signal {
        Sampled { fps: u32, frame_ms: u32 },
        Teardown,
    }

    #[test]
    fn publish_reaches_every_subscriber() {
        let mut hub = EventHub::<Signal>::new();
        let a = hub.subscribe();
        let b = hub.subscribe();

        hub.publish(Signal::Teardown);

        assert_eq!(a.drain(), vec![Signal::Teardown]);
        assert_eq!(b.drain(), vec![Signal::Teardown]);
    }

    #[test]
    fn events_arrive_in_publish_order() {
        let mut hub = EventHub::<Signal>::new();
        let sub = hub.subscribe();
        let sampled = Signal::Sampled {
            fps: 60,
            frame_ms: 16,
        };

        hub.publish(sampled.clone());
        hub.publish(Signal::Teardown);

        assert_eq!(sub.drain(), vec![sampled, Signal::Teardown]);
        assert_eq!(sub.receiver().try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn filtered_subscriber_only_sees_matches() {
        let mut hub = EventHub::<Signal>::new();
        let teardowns = hub.subscribe_filtered(|e| matches!(e, Signal::Teardown));

        hub.publish(Signal::Sampled {
            fps: 30,
            frame_ms: 33,
        });
        hub.publish(Signal::Teardown);

        assert_eq!(teardowns.drain(), vec![Signal::Teardown]);
    }

    #[test]
    fn unsubscribe_closes_the_channel() {
        let mut hub = EventHub::<Signal>::new();
        let sub = hub.subscribe();

        assert!(hub.unsubscribe(sub.id()));
        assert!(!hub.unsubscribe(sub.id()));
        hub.publish(Signal::Teardown);

        assert_eq!(sub.receiver().try_recv(), Err(TryRecvError::Disconnected));
    }

    #[test]
    fn bounded_subscriber_keeps_oldest_and_stays_subscribed() {
        let mut hub = EventHub::<Signal>::new();
        let slow = hub.subscribe_bounded(2);
        let fast = hub.subscribe();

        for fps in [60, 59, 58] {
            hub.publish(Signal::Sampled { fps, frame_ms: 16 });
        }

        let kept: Vec<_> = slow.drain();
        assert_eq!(
            kept,
            vec![
                Signal::Sampled { fps: 60, frame_ms: 16 },
                Signal::Sampled { fps: 59, frame_ms: 16 },
            ]
        );
        assert_eq!(fast.drain().len(), 3);
        assert_eq!(hub.subscriber_count(), 2);

        hub.publish(Signal::Teardown);
        assert_eq!(slow.drain(), vec![Signal::Teardown]);
    }

    #[test]
    fn dropped_receivers_are_pruned() {
        let mut hub = EventHub::<Signal>::new();
        let sub = hub.subscribe();
        let _kept = hub.subscribe();
        drop(sub);

        hub.publish(Signal::Teardown);

        assert_eq!(hub.subscriber_count(), 1);
    }
}
