//! Host collaborators
//!
//! The layer never talks to a rendering engine directly. Everything it needs
//! from the outside world is expressed as one of three traits:
//!
//! - [`HostMap`]: camera primitives of the interactive map
//! - [`MarkerSurface`]: the DOM/marker element group that draws the position
//! - [`FloorOverlay`]: an optional indoor floor-plan overlay
//!
//! Host events travel the other way as plain values ([`MapEvent`],
//! [`FloorEvent`]) handed to [`crate::GeolocatedMap`].
//!
//! # Architecture
//!
//! ```text
//! provider ──► GeolocatedMap ──► GeolocationLayer ──► MarkerSurface
//!                   ▲                   │
//!                   │                   └──────────► HostMap (jump_to)
//!      MapEvent / FloorEvent
//! ```

mod headless;
mod surface;

pub use headless::HeadlessMap;
pub use surface::{RecordingSurface, SurfaceOp};

use crate::geo::{Bounds, LngLat, DEFAULT_TILE_SIZE};

/// A camera position to jump to.
///
/// Fields left as `None` keep the map's current value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTransform {
    /// New map center
    pub center: LngLat,
    /// New zoom, `None` keeps the current zoom
    pub zoom: Option<f64>,
    /// New bearing in degrees, `None` keeps the current bearing
    pub bearing: Option<f64>,
}

impl CameraTransform {
    /// A transform that only moves the center.
    pub fn center_only(center: LngLat) -> Self {
        Self {
            center,
            zoom: None,
            bearing: None,
        }
    }
}

/// Options for [`HostMap::camera_for_bounds`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraOptions {
    /// Bearing to keep while fitting
    pub bearing: f64,
    /// Upper zoom limit of the fitted camera
    pub max_zoom: f64,
    /// Padding in pixels on every side of the viewport
    pub padding: f64,
}

/// Camera primitives consumed from the interactive map.
pub trait HostMap {
    /// Move the camera without animation.
    fn jump_to(&mut self, transform: CameraTransform);

    /// Compute a camera that fits `bounds` in the viewport.
    ///
    /// Returns `None` when the bounds cannot fit with the requested options,
    /// typically because the padding leaves no room.
    fn camera_for_bounds(&self, bounds: Bounds, options: &CameraOptions)
        -> Option<CameraTransform>;

    /// Current (fractional) zoom.
    fn zoom(&self) -> f64;

    /// Current bearing in degrees.
    fn bearing(&self) -> f64;

    /// Whether the camera is mid-animation or mid-gesture.
    fn is_moving(&self) -> bool;

    /// Canvas size in CSS pixels `(width, height)`.
    fn canvas_size(&self) -> (f64, f64);

    /// Renderer tile size in pixels.
    fn tile_size(&self) -> f64 {
        DEFAULT_TILE_SIZE
    }
}

/// The element group drawing the position: a marker with an accuracy
/// circle and a heading cone as children.
///
/// The render pipeline calls each method only on an actual state change,
/// except the position/size/rotation setters which run on every render while
/// the element is shown.
pub trait MarkerSurface {
    /// Create the marker and add it to the map.
    fn create_marker(&mut self);
    /// Move the marker.
    fn set_marker_position(&mut self, at: LngLat);
    /// Remove the marker from the map.
    fn remove_marker(&mut self);

    fn attach_accuracy_circle(&mut self);
    fn detach_accuracy_circle(&mut self);
    /// Resize the accuracy circle to `radius_px` (diameter is twice that).
    fn set_accuracy_radius(&mut self, radius_px: f64);

    fn attach_heading(&mut self);
    fn detach_heading(&mut self);
    /// Rotate the marker element, in degrees.
    fn set_rotation(&mut self, degrees: f64);
}

/// An indoor floor-plan overlay.
pub trait FloorOverlay {
    /// Currently displayed floor, `None` when no floor is selected.
    fn level(&self) -> Option<i32>;

    /// Switch the displayed floor.
    fn set_level(&mut self, level: i32);

    /// Whether an indoor map is loaded and selected.
    fn has_selected_map(&self) -> bool;
}

/// Interaction and camera events from the host map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapEvent {
    /// Zoom level changed
    Zoom,
    /// Mouse pressed on the map (start of a pan)
    MouseDown,
    /// Touch gesture started
    TouchStart,
    /// Scroll wheel used
    Wheel,
    /// Drag-pan started
    DragStart,
    /// Camera came to rest
    Idle,
}

impl MapEvent {
    /// Whether this event is a user interaction that ends tracking.
    pub fn is_user_interaction(&self) -> bool {
        matches!(
            self,
            MapEvent::MouseDown | MapEvent::TouchStart | MapEvent::Wheel | MapEvent::DragStart
        )
    }
}

/// Events from the floor overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloorEvent {
    /// The displayed floor changed
    LevelChanged,
    /// An indoor map finished loading
    MapLoaded,
    /// The user clicked the floor selector
    ControlClicked,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_interactions() {
        assert!(MapEvent::MouseDown.is_user_interaction());
        assert!(MapEvent::TouchStart.is_user_interaction());
        assert!(MapEvent::Wheel.is_user_interaction());
        assert!(MapEvent::DragStart.is_user_interaction());
        assert!(!MapEvent::Zoom.is_user_interaction());
        assert!(!MapEvent::Idle.is_user_interaction());
    }

    #[test]
    fn test_center_only_keeps_zoom_and_bearing() {
        let transform = CameraTransform::center_only(LngLat::new(1.0, 2.0));
        assert_eq!(transform.zoom, None);
        assert_eq!(transform.bearing, None);
    }
}
