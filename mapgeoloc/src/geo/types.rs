//! Geographic value types shared by the geo math and the layer.

use serde::{Deserialize, Serialize};

/// A longitude/latitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    /// Longitude in degrees (-180.0 to 180.0)
    pub lng: f64,
    /// Latitude in degrees (-90.0 to 90.0)
    pub lat: f64,
}

impl LngLat {
    /// Create a new coordinate.
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

impl std::fmt::Display for LngLat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lng, self.lat)
    }
}

/// Geographic bounding box in WSEN (west, south, east, north) order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Westernmost longitude
    pub west: f64,
    /// Southernmost latitude
    pub south: f64,
    /// Easternmost longitude
    pub east: f64,
    /// Northernmost latitude
    pub north: f64,
}

impl Bounds {
    /// Create a bounding box from its four edges.
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Create a zero-area bounding box at a single point.
    pub fn from_point(point: LngLat) -> Self {
        Self::new(point.lng, point.lat, point.lng, point.lat)
    }

    /// The bounds as a `[west, south, east, north]` array.
    pub fn to_array(&self) -> [f64; 4] {
        [self.west, self.south, self.east, self.north]
    }

    /// South-west corner.
    pub fn south_west(&self) -> LngLat {
        LngLat::new(self.west, self.south)
    }

    /// North-east corner.
    pub fn north_east(&self) -> LngLat {
        LngLat::new(self.east, self.north)
    }

    /// Center point of the bounds.
    pub fn center(&self) -> LngLat {
        LngLat::new(
            (self.west + self.east) / 2.0,
            (self.south + self.north) / 2.0,
        )
    }

    /// Width in degrees of longitude.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Height in degrees of latitude.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Whether the bounds collapse to a single point.
    pub fn is_point(&self) -> bool {
        self.width() == 0.0 && self.height() == 0.0
    }
}

impl std::fmt::Display for Bounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{:.6}, {:.6}, {:.6}, {:.6}]",
            self.west, self.south, self.east, self.north
        )
    }
}
