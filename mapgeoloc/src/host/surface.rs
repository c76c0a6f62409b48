//! A marker surface that records and logs every DOM mutation.

use tracing::debug;

use super::MarkerSurface;
use crate::geo::LngLat;

/// One mutation applied to a [`MarkerSurface`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceOp {
    CreateMarker,
    SetMarkerPosition(LngLat),
    RemoveMarker,
    AttachAccuracyCircle,
    DetachAccuracyCircle,
    SetAccuracyRadius(f64),
    AttachHeading,
    DetachHeading,
    SetRotation(f64),
}

/// Marker surface backed by an operation log.
///
/// Used by the CLI to trace what a DOM implementation would do, and by tests
/// to assert on render idempotence.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    ops: Vec<SurfaceOp>,
    marker: Option<LngLat>,
    accuracy_radius: Option<f64>,
    rotation: Option<f64>,
    has_marker: bool,
    has_accuracy_circle: bool,
    has_heading: bool,
}

impl RecordingSurface {
    /// Create an empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// All operations applied so far, oldest first.
    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    /// Number of recorded operations matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&SurfaceOp) -> bool) -> usize {
        self.ops.iter().filter(|op| predicate(op)).count()
    }

    /// Forget recorded operations, keeping the current element state.
    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    /// Whether the marker is currently on the map.
    pub fn has_marker(&self) -> bool {
        self.has_marker
    }

    /// Last marker position.
    pub fn marker_position(&self) -> Option<LngLat> {
        self.marker
    }

    /// Whether the accuracy circle is attached.
    pub fn has_accuracy_circle(&self) -> bool {
        self.has_accuracy_circle
    }

    /// Last accuracy radius in pixels.
    pub fn accuracy_radius(&self) -> Option<f64> {
        self.accuracy_radius
    }

    /// Whether the heading cone is attached.
    pub fn has_heading(&self) -> bool {
        self.has_heading
    }

    /// Last rotation in degrees.
    pub fn rotation(&self) -> Option<f64> {
        self.rotation
    }

    fn record(&mut self, op: SurfaceOp) {
        debug!(?op, "Marker surface");
        self.ops.push(op);
    }
}

impl MarkerSurface for RecordingSurface {
    fn create_marker(&mut self) {
        self.has_marker = true;
        self.record(SurfaceOp::CreateMarker);
    }

    fn set_marker_position(&mut self, at: LngLat) {
        self.marker = Some(at);
        self.record(SurfaceOp::SetMarkerPosition(at));
    }

    fn remove_marker(&mut self) {
        self.has_marker = false;
        self.record(SurfaceOp::RemoveMarker);
    }

    fn attach_accuracy_circle(&mut self) {
        self.has_accuracy_circle = true;
        self.record(SurfaceOp::AttachAccuracyCircle);
    }

    fn detach_accuracy_circle(&mut self) {
        self.has_accuracy_circle = false;
        self.record(SurfaceOp::DetachAccuracyCircle);
    }

    fn set_accuracy_radius(&mut self, radius_px: f64) {
        self.accuracy_radius = Some(radius_px);
        self.record(SurfaceOp::SetAccuracyRadius(radius_px));
    }

    fn attach_heading(&mut self) {
        self.has_heading = true;
        self.record(SurfaceOp::AttachHeading);
    }

    fn detach_heading(&mut self) {
        self.has_heading = false;
        self.record(SurfaceOp::DetachHeading);
    }

    fn set_rotation(&mut self, degrees: f64) {
        self.rotation = Some(degrees);
        self.record(SurfaceOp::SetRotation(degrees));
    }
}
