//! Typed change notifications.
//!
//! Each notification kind has its own [`Notifier`], so listeners receive a
//! concrete payload type instead of a string-keyed event bag.
//!
//! Listeners only see `&T`. They cannot reach the layer that emitted the
//! event, so a listener can never start a nested render pass.

use std::fmt;

use tracing::trace;

use crate::position::{Heading, SharedPosition};

/// Handle returned by [`Notifier::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Emitted after the position changed and was rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionChanged {
    /// The new position, `None` when cleared.
    pub position: Option<SharedPosition>,
}

/// Emitted after the heading changed and was rendered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingChanged {
    /// The new heading, `None` when cleared.
    pub heading: Option<Heading>,
}

/// Emitted after tracking was switched on or off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackingChanged {
    /// Whether the camera follows the position.
    pub track_user_location: bool,
}

/// Stable event names, matching the names hosts know from the JS world.
pub trait NamedEvent {
    /// Event name, e.g. `geolocation.position.changed`.
    const NAME: &'static str;
}

impl NamedEvent for PositionChanged {
    const NAME: &'static str = "geolocation.position.changed";
}

impl NamedEvent for HeadingChanged {
    const NAME: &'static str = "geolocation.heading.changed";
}

impl NamedEvent for TrackingChanged {
    const NAME: &'static str = "geolocation.trackUserLocation.changed";
}

type Listener<T> = Box<dyn FnMut(&T) + Send>;

/// Ordered list of listeners for one notification kind.
///
/// Listeners are called in subscription order. Emission is synchronous.
pub struct Notifier<T> {
    listeners: Vec<(SubscriptionId, Listener<T>)>,
    next_id: u64,
}

impl<T> Default for Notifier<T> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
        }
    }
}

impl<T> fmt::Debug for Notifier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<T: NamedEvent + fmt::Debug> Notifier<T> {
    /// Create an empty notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener.
    pub fn subscribe(&mut self, listener: impl FnMut(&T) + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if the id was unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Call every listener with `event`.
    pub fn emit(&mut self, event: &T) {
        trace!(event = T::NAME, payload = ?event, listeners = self.listeners.len(), "emit");
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

/// The three notification channels exposed by the layer.
#[derive(Debug, Default)]
pub struct GeolocationEvents {
    pub position_changed: Notifier<PositionChanged>,
    pub heading_changed: Notifier<HeadingChanged>,
    pub tracking_changed: Notifier<TrackingChanged>,
}
