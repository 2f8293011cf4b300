use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

/// Receives every event published on the stream it is subscribed to.
#[async_trait]
pub trait Subscriber<E>: Send + Sync {
    async fn on_event(&self, event: &E);
}

/// Handle identifying one subscription; pass it back to
/// [`EventStream::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

/// Fan-out point for one normalized event type.
///
/// `publish` snapshots the handler list before delivering, so a handler
/// subscribed mid-publish never sees the in-flight event and an unsubscribe
/// mid-publish cannot skip the remaining handlers. Handlers are awaited one
/// after the other in subscription order, and `publish` returns only once
/// every handler has finished.
pub struct EventStream<E> {
    next_id: AtomicU64,
    handlers: Mutex<Vec<(u64, Arc<dyn Subscriber<E>>)>>,
}

impl<E> EventStream<E> {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            handlers: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe(&self, handler: Arc<dyn Subscriber<E>>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.handlers.lock().unwrap().push((id, handler));
        Subscription(id)
    }

    /// Returns `false` when the subscription was already gone.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut handlers = self.handlers.lock().unwrap();
        let before = handlers.len();
        handlers.retain(|(id, _)| *id != subscription.0);
        handlers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.lock().unwrap().len()
    }

    pub async fn publish(&self, event: &E) {
        let snapshot: Vec<Arc<dyn Subscriber<E>>> = {
            let handlers = self.handlers.lock().unwrap();
            handlers.iter().map(|(_, h)| h.clone()).collect()
        };

        for handler in snapshot {
            handler.on_event(event).await;
        }
    }
}

impl<E> Default for EventStream<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<u32>>,
    }

    #[async_trait]
    impl Subscriber<u32> for Recorder {
        async fn on_event(&self, event: &u32) {
            self.seen.lock().unwrap().push(*event);
        }
    }

    #[tokio::test]
    async fn publishes_in_subscription_order_to_every_handler() {
        let stream = EventStream::new();
        let first = Arc::new(Recorder::default());
        let second = Arc::new(Recorder::default());
        stream.subscribe(first.clone());
        stream.subscribe(second.clone());

        for n in 0..5u32 {
            stream.publish(&n).await;
        }

        let expected: Vec<u32> = (0..5).collect();
        assert_eq!(*first.seen.lock().unwrap(), expected);
        assert_eq!(*second.seen.lock().unwrap(), expected);
    }

    #[tokio::test]
    async fn unsubscribe_stops_delivery() {
        let stream = EventStream::new();
        let recorder = Arc::new(Recorder::default());
        let subscription = stream.subscribe(recorder.clone());

        stream.publish(&1).await;
        assert!(stream.unsubscribe(subscription));
        assert!(!stream.unsubscribe(subscription));
        stream.publish(&2).await;

        assert_eq!(*recorder.seen.lock().unwrap(), vec![1]);
        assert_eq!(stream.subscriber_count(), 0);
    }

    struct SubscribesAnother {
        stream: Arc<EventStream<u32>>,
        late: Arc<Recorder>,
    }

    #[async_trait]
    impl Subscriber<u32> for SubscribesAnother {
        async fn on_event(&self, _event: &u32) {
            self.stream.subscribe(self.late.clone());
        }
    }

    #[tokio::test]
    async fn handler_added_mid_publish_misses_the_inflight_event() {
        let stream = Arc::new(EventStream::new());
        let late = Arc::new(Recorder::default());
        stream.subscribe(Arc::new(SubscribesAnother {
            stream: stream.clone(),
            late: late.clone(),
        }));

        stream.publish(&7).await;
        assert!(late.seen.lock().unwrap().is_empty());

        stream.publish(&8).await;
        assert_eq!(*late.seen.lock().unwrap(), vec![8]);
    }
}
