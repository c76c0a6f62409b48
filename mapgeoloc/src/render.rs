//! Render pipeline
//!
//! Three independent steps, each comparing a "should show" decision against
//! a cached "is shown" flag so the marker surface is only mutated on change:
//!
//! | Step            | Shown when                                              |
//! |-----------------|---------------------------------------------------------|
//! | position marker | position set and floor matches (if an overlay exists)   |
//! | accuracy circle | position has accuracy and radius ≥ configured minimum   |
//! | heading cone    | heading set                                             |
//!
//! Position, radius and rotation are refreshed on every call while shown.

use tracing::debug;

use crate::geo::pixel_radius_for_accuracy;
use crate::host::{FloorOverlay, HostMap, MarkerSurface};
use crate::position::{Heading, Position};

/// Cached visibility of the three rendered elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderState {
    pub position_rendered: bool,
    pub accuracy_rendered: bool,
    pub heading_rendered: bool,
}

/// Whether a position should be visible given the floor overlay.
///
/// The marker is hidden only when both the overlay and the position carry a
/// floor and the two differ.
pub fn position_visible(position: Option<&Position>, floor: Option<&dyn FloorOverlay>) -> bool {
    let Some(position) = position else {
        return false;
    };

    match (floor.and_then(|overlay| overlay.level()), position.level) {
        (Some(displayed), Some(level)) => displayed == level,
        _ => true,
    }
}

/// On-screen accuracy radius if the circle should be drawn.
pub fn visible_accuracy_radius(
    position: Option<&Position>,
    host: &dyn HostMap,
    minimum_radius_px: f64,
) -> Option<f64> {
    let position = position?;
    let accuracy = position.accuracy?;

    let radius_px =
        pixel_radius_for_accuracy(accuracy, position.lat, host.zoom(), host.tile_size());

    // NaN radii fail this comparison too
    if radius_px >= minimum_radius_px {
        Some(radius_px)
    } else {
        None
    }
}

impl RenderState {
    /// Show, move or remove the position marker.
    pub fn render_position(
        &mut self,
        position: Option<&Position>,
        floor: Option<&dyn FloorOverlay>,
        surface: &mut dyn MarkerSurface,
    ) {
        let show = position_visible(position, floor);

        match (show, self.position_rendered, position) {
            (true, rendered, Some(position)) => {
                if !rendered {
                    debug!(lng = position.lng, lat = position.lat, "Creating position marker");
                    surface.create_marker();
                }
                surface.set_marker_position(position.lng_lat());
            }
            (false, true, _) => {
                debug!("Removing position marker");
                surface.remove_marker();
            }
            _ => {}
        }

        self.position_rendered = show;
    }

    /// Show, resize or hide the accuracy circle.
    pub fn render_accuracy(
        &mut self,
        position: Option<&Position>,
        host: &dyn HostMap,
        minimum_radius_px: f64,
        surface: &mut dyn MarkerSurface,
    ) {
        let radius = visible_accuracy_radius(position, host, minimum_radius_px);

        if let Some(radius_px) = radius {
            if !self.accuracy_rendered {
                surface.attach_accuracy_circle();
            }
            surface.set_accuracy_radius(radius_px);
        } else if self.accuracy_rendered {
            debug!("Accuracy circle below minimum radius or unavailable, hiding");
            surface.detach_accuracy_circle();
        }

        self.accuracy_rendered = radius.is_some();
    }

    /// Show, rotate or hide the heading cone.
    pub fn render_heading(&mut self, heading: Option<Heading>, surface: &mut dyn MarkerSurface) {
        match (heading, self.heading_rendered) {
            (Some(degrees), rendered) => {
                if !rendered {
                    surface.attach_heading();
                }
                surface.set_rotation(degrees);
            }
            (None, true) => surface.detach_heading(),
            (None, false) => {}
        }

        self.heading_rendered = heading.is_some();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::LngLat;
    use crate::host::{HeadlessMap, RecordingSurface, SurfaceOp};

    struct FixedFloor(Option<i32>);

    impl FloorOverlay for FixedFloor {
        fn level(&self) -> Option<i32> {
            self.0
        }

        fn set_level(&mut self, level: i32) {
            self.0 = Some(level);
        }

        fn has_selected_map(&self) -> bool {
            true
        }
    }

    fn montpellier() -> Position {
        Position::new(3.883528, 43.608749)
    }

    #[test]
    fn test_marker_created_once_then_moved() {
        let mut state = RenderState::default();
        let mut surface = RecordingSurface::new();
        let first = montpellier();
        let second = Position::new(3.881970, 43.609040);

        state.render_position(Some(&first), None, &mut surface);
        state.render_position(Some(&second), None, &mut surface);

        assert_eq!(
            surface.ops(),
            &[
                SurfaceOp::CreateMarker,
                SurfaceOp::SetMarkerPosition(first.lng_lat()),
                SurfaceOp::SetMarkerPosition(second.lng_lat()),
            ]
        );
    }

    #[test]
    fn test_marker_removed_once() {
        let mut state = RenderState::default();
        let mut surface = RecordingSurface::new();

        state.render_position(Some(&montpellier()), None, &mut surface);
        state.render_position(None, None, &mut surface);
        state.render_position(None, None, &mut surface);

        assert_eq!(surface.count(|op| *op == SurfaceOp::RemoveMarker), 1);
        assert!(!surface.has_marker());
        assert!(!state.position_rendered);
    }

    #[test]
    fn test_nothing_rendered_without_position() {
        let mut state = RenderState::default();
        let mut surface = RecordingSurface::new();

        state.render_position(None, None, &mut surface);
        assert!(surface.ops().is_empty());
    }

    #[test]
    fn test_floor_mismatch_hides_marker() {
        let floor = FixedFloor(Some(0));
        let position = montpellier().with_level(-1);
        assert!(!position_visible(Some(&position), Some(&floor)));

        let same_floor = FixedFloor(Some(-1));
        assert!(position_visible(Some(&position), Some(&same_floor)));
    }

    #[test]
    fn test_floor_without_level_shows_marker() {
        let unset = FixedFloor(None);
        assert!(position_visible(
            Some(&montpellier().with_level(2)),
            Some(&unset)
        ));

        let displayed = FixedFloor(Some(3));
        assert!(position_visible(Some(&montpellier()), Some(&displayed)));
    }

    #[test]
    fn test_accuracy_circle_shown_when_large_enough() {
        let host = HeadlessMap::new(LngLat::new(3.88, 43.6), 18.0);
        let mut state = RenderState::default();
        let mut surface = RecordingSurface::new();
        let position = montpellier().with_accuracy(10.0);

        state.render_accuracy(Some(&position), &host, 18.0, &mut surface);
        state.render_accuracy(Some(&position), &host, 18.0, &mut surface);

        assert_eq!(surface.count(|op| *op == SurfaceOp::AttachAccuracyCircle), 1);
        assert_eq!(
            surface.count(|op| matches!(op, SurfaceOp::SetAccuracyRadius(_))),
            2
        );
        assert!(surface.accuracy_radius().unwrap() > 18.0);
    }

    #[test]
    fn test_accuracy_circle_hidden_when_too_small() {
        // 10 m at zoom 10 is a fraction of a pixel
        let host = HeadlessMap::new(LngLat::new(3.88, 43.6), 10.0);
        let mut state = RenderState::default();
        let mut surface = RecordingSurface::new();

        state.render_accuracy(
            Some(&montpellier().with_accuracy(10.0)),
            &host,
            18.0,
            &mut surface,
        );

        assert!(surface.ops().is_empty());
        assert!(!state.accuracy_rendered);
    }

    #[test]
    fn test_accuracy_circle_hidden_without_accuracy() {
        let host = HeadlessMap::new(LngLat::new(3.88, 43.6), 18.0);
        assert!(visible_accuracy_radius(Some(&montpellier()), &host, 0.0).is_none());
    }

    #[test]
    fn test_accuracy_circle_detached_after_zoom_out() {
        let mut host = HeadlessMap::new(LngLat::new(3.88, 43.6), 18.0);
        let mut state = RenderState::default();
        let mut surface = RecordingSurface::new();
        let position = montpellier().with_accuracy(10.0);

        state.render_accuracy(Some(&position), &host, 18.0, &mut surface);
        host.jump_to(crate::host::CameraTransform {
            center: LngLat::new(3.88, 43.6),
            zoom: Some(12.0),
            bearing: None,
        });
        state.render_accuracy(Some(&position), &host, 18.0, &mut surface);

        assert!(!surface.has_accuracy_circle());
        assert_eq!(surface.count(|op| *op == SurfaceOp::DetachAccuracyCircle), 1);
    }

    #[test]
    fn test_heading_rotation_every_update() {
        let mut state = RenderState::default();
        let mut surface = RecordingSurface::new();

        state.render_heading(Some(280.0), &mut surface);
        state.render_heading(Some(90.0), &mut surface);
        state.render_heading(None, &mut surface);
        state.render_heading(None, &mut surface);

        assert_eq!(
            surface.ops(),
            &[
                SurfaceOp::AttachHeading,
                SurfaceOp::SetRotation(280.0),
                SurfaceOp::SetRotation(90.0),
                SurfaceOp::DetachHeading,
            ]
        );
    }
}
