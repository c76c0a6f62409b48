//! Geolocated map
//!
//! [`add_geolocation_to`] wraps a host map and its marker surface once and
//! returns a [`GeolocatedMap`], which always carries the position layer.
//! Everything that needs the layer (the control, providers, host events)
//! goes through this wrapper, so a map without the layer cannot be handed
//! to them.
//!
//! # Example
//!
//! ```
//! use mapgeoloc::{add_geolocation_to, HeadlessMap, LayerOptions, LngLat, Position, RecordingSurface};
//!
//! let host = HeadlessMap::new(LngLat::new(3.88, 43.6), 16.0);
//! let mut map = add_geolocation_to(host, RecordingSurface::new(), LayerOptions::default()).unwrap();
//!
//! map.set_position(Some(Position::new(3.883528, 43.608749).shared()));
//! assert!(map.surface().has_marker());
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info};

use crate::config::LayerOptions;
use crate::error::GeolocationError;
use crate::events::{HeadingChanged, PositionChanged, SubscriptionId, TrackingChanged};
use crate::host::{FloorEvent, FloorOverlay, HostMap, MapEvent, MarkerSurface};
use crate::layer::{Collaborators, GeolocationLayer};
use crate::position::{Heading, SharedPosition};

static NEXT_MAP_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a [`GeolocatedMap`], used to pair it with a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MapId(u64);

/// Wrap `host` with a geolocation layer drawing onto `surface`.
///
/// # Errors
///
/// Returns [`GeolocationError::InvalidOption`] if an option is out of range
/// and [`GeolocationError::InvalidHost`] if the host reports an unusable
/// tile size or canvas.
pub fn add_geolocation_to<H, S>(
    host: H,
    surface: S,
    options: LayerOptions,
) -> Result<GeolocatedMap<H, S>, GeolocationError>
where
    H: HostMap,
    S: MarkerSurface,
{
    options.validate()?;

    let tile_size = host.tile_size();
    if !(tile_size.is_finite() && tile_size > 0.0) {
        return Err(GeolocationError::InvalidHost(format!(
            "tile size {} is not a positive number",
            tile_size
        )));
    }

    let (width, height) = host.canvas_size();
    if !(width.is_finite() && height.is_finite() && width >= 0.0 && height >= 0.0) {
        return Err(GeolocationError::InvalidHost(format!(
            "canvas size {}x{} is invalid",
            width, height
        )));
    }

    let id = MapId(NEXT_MAP_ID.fetch_add(1, Ordering::Relaxed));
    info!(
        map = id.0,
        auto_zoom = options.auto_zoom.as_str(),
        track_user_location = options.track_user_location,
        "Geolocation layer added"
    );

    Ok(GeolocatedMap {
        id,
        host,
        surface,
        floor: None,
        layer: GeolocationLayer::new(options),
    })
}

/// A host map that carries the geolocation layer.
pub struct GeolocatedMap<H, S> {
    id: MapId,
    host: H,
    surface: S,
    floor: Option<Box<dyn FloorOverlay>>,
    layer: GeolocationLayer,
}

impl<H: HostMap, S: MarkerSurface> GeolocatedMap<H, S> {
    /// Attach an indoor floor overlay.
    pub fn with_floor_overlay(mut self, overlay: impl FloorOverlay + 'static) -> Self {
        self.floor = Some(Box::new(overlay));
        self
    }

    /// Identity of this map.
    pub fn id(&self) -> MapId {
        self.id
    }

    /// The wrapped host map.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The wrapped host map, mutably. Camera changes made here are not seen
    /// by the layer until the matching [`MapEvent`] is delivered.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The marker surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The floor overlay, if any.
    pub fn floor_overlay(&self) -> Option<&dyn FloorOverlay> {
        self.floor.as_deref()
    }

    /// The position layer.
    pub fn layer(&self) -> &GeolocationLayer {
        &self.layer
    }

    /// Current position.
    pub fn position(&self) -> Option<&SharedPosition> {
        self.layer.position()
    }

    /// Replace the position.
    pub fn set_position(&mut self, position: Option<SharedPosition>) {
        let (layer, mut ctx) = self.split();
        layer.set_position(&mut ctx, position);
    }

    /// Current heading.
    pub fn heading(&self) -> Option<Heading> {
        self.layer.heading()
    }

    /// Replace the heading.
    pub fn set_heading(&mut self, heading: Option<Heading>) {
        let (layer, mut ctx) = self.split();
        layer.set_heading(&mut ctx, heading);
    }

    /// Whether the camera follows the position.
    pub fn track_user_location(&self) -> bool {
        self.layer.track_user_location()
    }

    /// Switch tracking on or off.
    pub fn set_track_user_location(&mut self, enabled: bool) {
        let (layer, mut ctx) = self.split();
        layer.set_track_user_location(&mut ctx, enabled);
    }

    /// Deliver a host map event.
    pub fn handle_map_event(&mut self, event: MapEvent) {
        let (layer, mut ctx) = self.split();
        layer.handle_map_event(&mut ctx, event);
    }

    /// Deliver a floor overlay event. Ignored without an overlay.
    pub fn handle_floor_event(&mut self, event: FloorEvent) {
        if self.floor.is_none() {
            debug!(?event, "Floor event without overlay, ignoring");
            return;
        }
        let (layer, mut ctx) = self.split();
        layer.handle_floor_event(&mut ctx, event);
    }

    /// Listen for `geolocation.position.changed`.
    pub fn on_position_changed(
        &mut self,
        listener: impl FnMut(&PositionChanged) + Send + 'static,
    ) -> SubscriptionId {
        self.layer.events_mut().position_changed.subscribe(listener)
    }

    /// Stop listening for position changes.
    pub fn off_position_changed(&mut self, id: SubscriptionId) -> bool {
        self.layer.events_mut().position_changed.unsubscribe(id)
    }

    /// Listen for `geolocation.heading.changed`.
    pub fn on_heading_changed(
        &mut self,
        listener: impl FnMut(&HeadingChanged) + Send + 'static,
    ) -> SubscriptionId {
        self.layer.events_mut().heading_changed.subscribe(listener)
    }

    /// Stop listening for heading changes.
    pub fn off_heading_changed(&mut self, id: SubscriptionId) -> bool {
        self.layer.events_mut().heading_changed.unsubscribe(id)
    }

    /// Listen for `geolocation.trackUserLocation.changed`.
    pub fn on_tracking_changed(
        &mut self,
        listener: impl FnMut(&TrackingChanged) + Send + 'static,
    ) -> SubscriptionId {
        self.layer.events_mut().tracking_changed.subscribe(listener)
    }

    /// Stop listening for tracking changes.
    pub fn off_tracking_changed(&mut self, id: SubscriptionId) -> bool {
        self.layer.events_mut().tracking_changed.unsubscribe(id)
    }

    /// Unwrap into the host map and surface.
    pub fn into_parts(self) -> (H, S) {
        (self.host, self.surface)
    }

    fn split(&mut self) -> (&mut GeolocationLayer, Collaborators<'_>) {
        let floor = self
            .floor
            .as_mut()
            .map(|overlay| &mut **overlay as &mut dyn FloorOverlay);
        (
            &mut self.layer,
            Collaborators {
                host: &mut self.host,
                surface: &mut self.surface,
                floor,
            },
        )
    }
}
