use crate::types::{EventKind, OrientationEvent};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Callback invoked for each delivered event.
pub type Handler = Arc<dyn Fn(&OrientationEvent) + Send + Sync>;

/// Handle returned by [`EventSource::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Something that delivers orientation notifications.
///
/// Handlers must run to completion without blocking; sources may call them
/// at sensor rate.
pub trait EventSource: Send + Sync {
    /// Register `handler` for events of `kind`.
    fn subscribe(&self, kind: EventKind, handler: Handler) -> SubscriptionId;
    /// Remove a handler. Returns `false` if it was not registered.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
    /// The platform's current screen angle in degrees, if known.
    fn screen_orientation(&self) -> Option<f64>;
}

struct Subscriber {
    id: SubscriptionId,
    kind: EventKind,
    handler: Handler,
}

#[derive(Default)]
struct BusState {
    next_id: u64,
    subscribers: Vec<Subscriber>,
    screen_orientation: Option<f64>,
}

/// In-process event source with synchronous delivery.
///
/// Thread-safe, so a network reader task can dispatch while the frame loop
/// reads the latched state on another thread.
#[derive(Default)]
pub struct EventBus {
    state: Mutex<BusState>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bus whose platform screen angle is already known.
    pub fn with_screen_orientation(angle: f64) -> Self {
        let bus = Self::new();
        bus.state().screen_orientation = Some(angle);
        bus
    }

    /// Deliver `event` to every handler subscribed to its kind, in
    /// subscription order. Returns the number of handlers invoked.
    pub fn dispatch(&self, event: &OrientationEvent) -> usize {
        let kind = event.kind();
        let handlers: Vec<Handler> = {
            let mut state = self.state();
            if let OrientationEvent::OrientationChange(angle) = event {
                state.screen_orientation = *angle;
            }
            state
                .subscribers
                .iter()
                .filter(|s| s.kind == kind)
                .map(|s| Arc::clone(&s.handler))
                .collect()
        };

        // Lock released: handlers may subscribe or unsubscribe.
        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }

    /// Number of live subscriptions for `kind`.
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.state()
            .subscribers
            .iter()
            .filter(|s| s.kind == kind)
            .count()
    }

    fn state(&self) -> MutexGuard<'_, BusState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EventSource for EventBus {
    fn subscribe(&self, kind: EventKind, handler: Handler) -> SubscriptionId {
        let mut state = self.state();
        let id = SubscriptionId(state.next_id);
        state.next_id += 1;
        state.subscribers.push(Subscriber { id, kind, handler });
        tracing::trace!(?id, ?kind, "Handler subscribed");
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut state = self.state();
        let before = state.subscribers.len();
        state.subscribers.retain(|s| s.id != id);
        before != state.subscribers.len()
    }

    fn screen_orientation(&self) -> Option<f64> {
        self.state().screen_orientation
    }
}
