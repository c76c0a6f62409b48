//! Position and heading values pushed into the layer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::geo::{bounds_from_center_and_radius, Bounds, LngLat};

/// Compass heading in degrees, clockwise from map north (0–360).
///
/// Callers supply an already-normalized value; the layer never wraps it.
pub type Heading = f64;

/// A position shared between the provider, the layer and listeners.
///
/// The layer's idempotence check compares the `Arc` pointer, not the contents.
pub type SharedPosition = Arc<Position>;

/// A geographic position with optional accuracy, timestamp and floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Longitude in degrees
    pub lng: f64,
    /// Latitude in degrees
    pub lat: f64,
    /// Accuracy radius in meters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    /// Milliseconds since the Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Floor index, only meaningful with a floor overlay
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<i32>,
}

impl Position {
    /// Create a position without accuracy, timestamp or level.
    pub fn new(lng: f64, lat: f64) -> Self {
        Self {
            lng,
            lat,
            accuracy: None,
            timestamp: None,
            level: None,
        }
    }

    /// Set the accuracy radius in meters.
    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = Some(accuracy);
        self
    }

    /// Set the timestamp in milliseconds since the Unix epoch.
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Set the floor index.
    pub fn with_level(mut self, level: i32) -> Self {
        self.level = Some(level);
        self
    }

    /// Wrap into a [`SharedPosition`].
    pub fn shared(self) -> SharedPosition {
        Arc::new(self)
    }

    /// The coordinate part of the position.
    pub fn lng_lat(&self) -> LngLat {
        LngLat::new(self.lng, self.lat)
    }

    /// Bounding box of the accuracy circle.
    ///
    /// A missing or zero accuracy is replaced by `default_accuracy`.
    pub fn accuracy_bounds(&self, default_accuracy: f64) -> Bounds {
        let radius = match self.accuracy {
            Some(accuracy) if accuracy != 0.0 => accuracy,
            _ => default_accuracy,
        };
        bounds_from_center_and_radius(self.lng_lat(), radius)
    }
}

impl From<LngLat> for Position {
    fn from(lng_lat: LngLat) -> Self {
        Self::new(lng_lat.lng, lng_lat.lat)
    }
}
