//! mapgeoloc - Geolocation overlay for interactive maps
//!
//! This library keeps a position marker, an accuracy circle and a heading
//! indicator in sync with a position source, and optionally re-centers the
//! map camera as the position moves.
//!
//! # Architecture
//!
//! ```text
//! PositionProvider ──► GeolocationControl ──pump──► GeolocatedMap
//!                              ▲                         │
//!                              │ notifications           ├─► GeolocationLayer ──► RenderState ──► MarkerSurface
//!                              └─────────────────────────┤                    └─► CameraController ──► HostMap
//!                                                        └─► Option<FloorOverlay>
//! ```
//!
//! A host map is wrapped once with [`add_geolocation_to`]. The resulting
//! [`GeolocatedMap`] owns the position state; a [`GeolocationControl`] can
//! then be attached to it to drive a [`PositionProvider`].

pub mod camera;
pub mod config;
pub mod control;
pub mod error;
pub mod events;
pub mod geo;
pub mod host;
pub mod layer;
pub mod logging;
pub mod map;
pub mod position;
pub mod provider;
pub mod render;

pub use config::{AutoZoom, ConfigError, ConfigFile, LayerOptions, SimulationSettings};
pub use control::{ButtonClasses, ControlState, ControlView, GeolocationControl};
pub use error::GeolocationError;
pub use events::{HeadingChanged, NamedEvent, PositionChanged, SubscriptionId, TrackingChanged};
pub use geo::{Bounds, LngLat};
pub use host::{
    CameraOptions, CameraTransform, FloorEvent, FloorOverlay, HeadlessMap, HostMap, MapEvent,
    MarkerSurface, RecordingSurface, SurfaceOp,
};
pub use map::{add_geolocation_to, GeolocatedMap, MapId};
pub use position::{Heading, Position, SharedPosition};
pub use provider::{
    ManualHandle, ManualProvider, PositionProvider, ProviderEvent, ProviderSink, ReplayError,
    ReplayProvider, SimulatorProvider, MIN_PROVIDER_INTERVAL,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
