//! Locate-me control
//!
//! A two-button control: "locate me" starts the provider and enables
//! tracking, "stop" stops the provider. The visible state of the locate
//! button follows a four-state machine derived from the layer and the
//! provider:
//!
//! ```text
//! if position exists:    Active if tracking else ActiveBackground
//! elif provider running: Waiting
//! else:                  Idle
//! ```
//!
//! The state is recomputed on every position/tracking notification and on
//! provider start/stop. The [`ControlView`] is only touched when the
//! computed state differs from the previous one.
//!
//! # Example
//!
//! ```
//! use mapgeoloc::{
//!     add_geolocation_to, ButtonClasses, ControlState, GeolocationControl, HeadlessMap,
//!     LayerOptions, LngLat, ManualProvider, Position, RecordingSurface,
//! };
//!
//! let host = HeadlessMap::new(LngLat::new(3.88, 43.6), 16.0);
//! let mut map = add_geolocation_to(host, RecordingSurface::new(), LayerOptions::default()).unwrap();
//!
//! let provider = ManualProvider::new();
//! let handle = provider.handle();
//! let mut control = GeolocationControl::new(Some(Box::new(provider)), ButtonClasses::new());
//! control.attach(&mut map).unwrap();
//!
//! control.locate_me(&mut map).unwrap();
//! assert_eq!(control.state(), ControlState::Waiting);
//!
//! handle.push_position(Position::new(3.883528, 43.608749));
//! control.pump(&mut map).unwrap();
//! assert_eq!(control.state(), ControlState::Active);
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::error::GeolocationError;
use crate::events::SubscriptionId;
use crate::host::{HostMap, MarkerSurface};
use crate::map::{GeolocatedMap, MapId};
use crate::provider::{provider_channel, PositionProvider, ProviderEvent, ProviderEvents};

/// CSS class of an active locate button.
pub const CLASS_ACTIVE: &str = "mapboxgl-ctrl-geolocate-active";

/// CSS class of a locate button whose position is known but not followed.
pub const CLASS_BACKGROUND: &str = "mapboxgl-ctrl-geolocate-background";

/// CSS class of a locate button waiting for a first position.
pub const CLASS_WAITING: &str = "mapboxgl-ctrl-geolocate-waiting";

/// Visual state of the control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ControlState {
    /// No position, provider not running
    #[default]
    Idle,
    /// Provider running, no position yet
    Waiting,
    /// Position known and followed
    Active,
    /// Position known, tracking disabled
    ActiveBackground,
}

impl ControlState {
    /// Derive the state from its three inputs.
    pub fn compute(has_position: bool, tracking: bool, provider_running: bool) -> Self {
        if has_position {
            if tracking {
                ControlState::Active
            } else {
                ControlState::ActiveBackground
            }
        } else if provider_running {
            ControlState::Waiting
        } else {
            ControlState::Idle
        }
    }

    /// CSS classes the locate button carries in this state.
    pub fn css_classes(&self) -> &'static [&'static str] {
        match self {
            ControlState::Idle => &[],
            ControlState::Waiting => &[CLASS_ACTIVE, CLASS_WAITING],
            ControlState::Active => &[CLASS_ACTIVE],
            ControlState::ActiveBackground => &[CLASS_BACKGROUND],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ControlState::Idle => "idle",
            ControlState::Waiting => "waiting",
            ControlState::Active => "active",
            ControlState::ActiveBackground => "active-background",
        }
    }
}

impl fmt::Display for ControlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The control's user interface.
pub trait ControlView: Send {
    /// Move the locate button from `previous` to `next`.
    fn apply_state(&mut self, previous: ControlState, next: ControlState);

    /// Show or hide the stop button.
    fn set_stop_visible(&mut self, visible: bool);
}

#[derive(Debug, Default)]
struct ButtonClassesInner {
    classes: BTreeSet<&'static str>,
    stop_visible: bool,
    updates: usize,
}

/// CSS class bookkeeping for the two-button control.
///
/// Clones share the same button, so a host can keep a handle after giving
/// one to the control.
#[derive(Debug, Clone, Default)]
pub struct ButtonClasses {
    inner: Arc<Mutex<ButtonClassesInner>>,
}

impl ButtonClasses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classes currently on the locate button, sorted.
    pub fn classes(&self) -> Vec<&'static str> {
        self.inner.lock().classes.iter().copied().collect()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.inner.lock().classes.contains(class)
    }

    /// Whether the stop button is displayed.
    pub fn stop_visible(&self) -> bool {
        self.inner.lock().stop_visible
    }

    /// Number of state changes applied.
    pub fn updates(&self) -> usize {
        self.inner.lock().updates
    }
}

impl ControlView for ButtonClasses {
    fn apply_state(&mut self, previous: ControlState, next: ControlState) {
        let mut inner = self.inner.lock();
        for class in previous.css_classes() {
            inner.classes.remove(class);
        }
        inner.classes.extend(next.css_classes().iter().copied());
        inner.updates += 1;
    }

    fn set_stop_visible(&mut self, visible: bool) {
        self.inner.lock().stop_visible = visible;
    }
}

/// Inputs of the state machine plus the view, shared with the listeners.
struct Shared {
    has_position: bool,
    tracking: bool,
    provider_running: bool,
    state: ControlState,
    view: Box<dyn ControlView>,
}

impl Shared {
    fn update_state(&mut self) {
        let next = ControlState::compute(self.has_position, self.tracking, self.provider_running);
        if next == self.state {
            return;
        }
        info!(from = %self.state, to = %next, "Control state changed");
        self.view.apply_state(self.state, next);
        self.state = next;
    }
}

struct Attachment {
    map: MapId,
    position_subscription: SubscriptionId,
    tracking_subscription: SubscriptionId,
    events: Option<ProviderEvents>,
}

/// Start/stop control bound to one [`GeolocatedMap`].
pub struct GeolocationControl {
    provider: Option<Box<dyn PositionProvider>>,
    shared: Arc<Mutex<Shared>>,
    attachment: Option<Attachment>,
}

impl GeolocationControl {
    /// Create a control. Without a provider the control only reflects
    /// positions the host sets directly.
    pub fn new(provider: Option<Box<dyn PositionProvider>>, view: impl ControlView + 'static) -> Self {
        Self {
            provider,
            shared: Arc::new(Mutex::new(Shared {
                has_position: false,
                tracking: false,
                provider_running: false,
                state: ControlState::Idle,
                view: Box::new(view),
            })),
            attachment: None,
        }
    }

    /// Current visual state.
    pub fn state(&self) -> ControlState {
        self.shared.lock().state
    }

    /// Whether a provider is registered.
    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Whether the provider has been started and not stopped.
    pub fn is_provider_running(&self) -> bool {
        self.shared.lock().provider_running
    }

    /// Whether the control is attached to a map.
    pub fn is_attached(&self) -> bool {
        self.attachment.is_some()
    }

    /// Bind the control to `map`: follow its notifications and connect the
    /// provider.
    ///
    /// # Errors
    ///
    /// [`GeolocationError::ControlAlreadyAttached`] if the control is bound
    /// to a map already.
    pub fn attach<H: HostMap, S: MarkerSurface>(
        &mut self,
        map: &mut GeolocatedMap<H, S>,
    ) -> Result<(), GeolocationError> {
        if self.attachment.is_some() {
            return Err(GeolocationError::ControlAlreadyAttached);
        }

        {
            let mut shared = self.shared.lock();
            shared.has_position = map.position().is_some();
            shared.tracking = map.track_user_location();
            shared.update_state();
        }

        let shared = Arc::clone(&self.shared);
        let position_subscription = map.on_position_changed(move |event| {
            let mut shared = shared.lock();
            shared.has_position = event.position.is_some();
            shared.update_state();
        });

        let shared = Arc::clone(&self.shared);
        let tracking_subscription = map.on_tracking_changed(move |event| {
            let mut shared = shared.lock();
            shared.tracking = event.track_user_location;
            shared.update_state();
        });

        let events = self.provider.as_mut().map(|provider| {
            let (sink, events) = provider_channel();
            provider.connect(sink);
            events
        });

        debug!(
            provider = self.provider.as_ref().map(|p| p.name()),
            "Control attached"
        );

        self.attachment = Some(Attachment {
            map: map.id(),
            position_subscription,
            tracking_subscription,
            events,
        });
        Ok(())
    }

    /// Unbind from `map`. A running provider is stopped and disconnected.
    pub fn detach<H: HostMap, S: MarkerSurface>(
        &mut self,
        map: &mut GeolocatedMap<H, S>,
    ) -> Result<(), GeolocationError> {
        self.ensure_attached(map)?;
        let Some(attachment) = self.attachment.take() else {
            return Err(GeolocationError::ControlNotAttached);
        };

        map.off_position_changed(attachment.position_subscription);
        map.off_tracking_changed(attachment.tracking_subscription);

        if let Some(provider) = self.provider.as_mut() {
            let mut shared = self.shared.lock();
            if shared.provider_running {
                provider.stop();
                shared.provider_running = false;
                shared.view.set_stop_visible(false);
                shared.update_state();
            }
            provider.disconnect();
        }

        debug!("Control detached");
        Ok(())
    }

    /// "Locate me": enable tracking and start the provider if it is idle.
    pub fn locate_me<H: HostMap, S: MarkerSurface>(
        &mut self,
        map: &mut GeolocatedMap<H, S>,
    ) -> Result<(), GeolocationError> {
        self.ensure_attached(map)?;

        // Emits a tracking notification, which takes the shared lock
        map.set_track_user_location(true);

        let Some(provider) = self.provider.as_mut() else {
            return Ok(());
        };

        let mut shared = self.shared.lock();
        if shared.provider_running {
            debug!("Provider already running, ignoring locate");
            return Ok(());
        }

        info!(provider = provider.name(), "Starting provider");
        provider.start();
        shared.provider_running = true;
        shared.view.set_stop_visible(true);
        shared.update_state();
        Ok(())
    }

    /// "Stop": stop the provider if it is running.
    pub fn stop<H: HostMap, S: MarkerSurface>(
        &mut self,
        map: &mut GeolocatedMap<H, S>,
    ) -> Result<(), GeolocationError> {
        self.ensure_attached(map)?;

        let Some(provider) = self.provider.as_mut() else {
            return Ok(());
        };

        let mut shared = self.shared.lock();
        if !shared.provider_running {
            debug!("Provider not running, ignoring stop");
            return Ok(());
        }

        info!(provider = provider.name(), "Stopping provider");
        provider.stop();
        shared.provider_running = false;
        shared.view.set_stop_visible(false);
        shared.update_state();
        Ok(())
    }

    /// Apply every queued provider event to `map`, oldest first.
    ///
    /// Returns the number of events applied.
    pub fn pump<H: HostMap, S: MarkerSurface>(
        &mut self,
        map: &mut GeolocatedMap<H, S>,
    ) -> Result<usize, GeolocationError> {
        let events = self.provider_events(map)?;
        let Some(events) = events else {
            return Ok(0);
        };

        let mut applied = 0;
        while let Ok(event) = events.try_recv() {
            apply_event(map, event);
            applied += 1;
        }
        Ok(applied)
    }

    /// Wait for the next provider event and apply it to `map`.
    ///
    /// Returns `None` when the control has no provider or the provider
    /// dropped its sink.
    pub async fn pump_next<H: HostMap, S: MarkerSurface>(
        &mut self,
        map: &mut GeolocatedMap<H, S>,
    ) -> Result<Option<ProviderEvent>, GeolocationError> {
        let Some(events) = self.provider_events(map)? else {
            return Ok(None);
        };

        let Some(event) = events.recv().await else {
            return Ok(None);
        };
        apply_event(map, event.clone());
        Ok(Some(event))
    }

    fn provider_events<H: HostMap, S: MarkerSurface>(
        &mut self,
        map: &GeolocatedMap<H, S>,
    ) -> Result<Option<&mut ProviderEvents>, GeolocationError> {
        match self.attachment.as_mut() {
            Some(attachment) if attachment.map == map.id() => Ok(attachment.events.as_mut()),
            _ => Err(GeolocationError::ControlNotAttached),
        }
    }

    fn ensure_attached<H: HostMap, S: MarkerSurface>(
        &self,
        map: &GeolocatedMap<H, S>,
    ) -> Result<(), GeolocationError> {
        match &self.attachment {
            Some(attachment) if attachment.map == map.id() => Ok(()),
            _ => Err(GeolocationError::ControlNotAttached),
        }
    }
}

impl fmt::Debug for GeolocationControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeolocationControl")
            .field("provider", &self.provider.as_ref().map(|p| p.name()))
            .field("state", &self.state())
            .field("attached", &self.is_attached())
            .finish()
    }
}

fn apply_event<H: HostMap, S: MarkerSurface>(map: &mut GeolocatedMap<H, S>, event: ProviderEvent) {
    match event {
        ProviderEvent::Position(position) => map.set_position(position),
        ProviderEvent::Heading(heading) => map.set_heading(heading),
    }
}
