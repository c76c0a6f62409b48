//! Geographic math
//!
//! Pure conversions used to size and frame the position overlay:
//! accuracy radius (meters) to a bounding box, and accuracy radius to an
//! on-screen pixel radius under the Web Mercator projection.
//!
//! Every function here is deterministic and independent of any rendering host.
//! Great-circle helpers for walking routes live alongside in `geodesy`.

mod geodesy;
mod types;

pub use geodesy::{destination, distance_m, initial_bearing, sample_route, EARTH_RADIUS_M};
pub use types::{Bounds, LngLat};

use std::f64::consts::PI;

/// Equatorial circumference of the earth in meters (WGS84).
pub const EARTH_CIRCUMFERENCE: f64 = 40_075_016.686;

/// Default tile size in pixels used by vector map renderers.
pub const DEFAULT_TILE_SIZE: f64 = 512.0;

/// Default number of vertices for a generated accuracy ring.
pub const DEFAULT_RING_POINTS: usize = 64;

/// Kilometers per degree of longitude at the equator.
const KM_PER_DEGREE_LNG: f64 = 111.320;

/// Kilometers per degree of latitude.
const KM_PER_DEGREE_LAT: f64 = 110.574;

/// Builds the bounding box of a circle of `radius_m` meters around `center`.
///
/// The latitude delta is `360 · r / C`; the longitude delta is corrected for
/// meridian convergence by dividing by `cos(lat)`. A zero radius yields a
/// point bounds.
///
/// # Returns
///
/// `(lng − Δlng, lat − Δlat, lng + Δlng, lat + Δlat)` as a [`Bounds`].
pub fn bounds_from_center_and_radius(center: LngLat, radius_m: f64) -> Bounds {
    let lat_delta = 360.0 * radius_m / EARTH_CIRCUMFERENCE;
    let lng_delta = lat_delta / (center.lat * PI / 180.0).cos();

    Bounds::new(
        center.lng - lng_delta,
        center.lat - lat_delta,
        center.lng + lng_delta,
        center.lat + lat_delta,
    )
}

/// Ground resolution in meters per pixel at a latitude and zoom.
///
/// `metersPerTile = C · cos(lat) / 2^zoom`, `metersPerPixel = metersPerTile / tile_size`.
#[inline]
pub fn meters_per_pixel(lat: f64, zoom: f64, tile_size: f64) -> f64 {
    let meters_per_tile = EARTH_CIRCUMFERENCE * (lat * PI / 180.0).cos() / 2.0_f64.powf(zoom);
    meters_per_tile / tile_size
}

/// Converts an accuracy radius in meters into an on-screen radius in pixels.
///
/// # Arguments
///
/// * `accuracy_m` - Accuracy radius in meters
/// * `lat` - Latitude of the position in degrees
/// * `zoom` - Current (fractional) map zoom
/// * `tile_size` - Tile size of the map renderer in pixels
#[inline]
pub fn pixel_radius_for_accuracy(accuracy_m: f64, lat: f64, zoom: f64, tile_size: f64) -> f64 {
    accuracy_m / meters_per_pixel(lat, zoom, tile_size)
}

/// Projects a coordinate into normalized Web Mercator space.
///
/// Returns `(x, y)` in `[0, 1]`, with `(0, 0)` at the north-west corner of
/// the world. Latitudes are not clamped; callers stay within ±85.05°.
#[inline]
pub fn mercator_from_lng_lat(lng_lat: LngLat) -> (f64, f64) {
    let x = (lng_lat.lng + 180.0) / 360.0;
    let lat_rad = lng_lat.lat * PI / 180.0;
    let y = (1.0 - lat_rad.tan().asinh() / PI) / 2.0;
    (x, y)
}

/// Inverse of [`mercator_from_lng_lat`].
#[inline]
pub fn lng_lat_from_mercator(x: f64, y: f64) -> LngLat {
    let lng = x * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * y)).sinh().atan() * 180.0 / PI;
    LngLat::new(lng, lat)
}

/// Generates a closed polygon ring approximating a circle on the map.
///
/// Useful for hosts that draw the accuracy indicator as a GeoJSON polygon
/// instead of a DOM element. The first vertex is repeated at the end.
/// `points == 0` falls back to [`DEFAULT_RING_POINTS`].
pub fn accuracy_circle_ring(center: LngLat, radius_km: f64, points: usize) -> Vec<LngLat> {
    let points = if points == 0 {
        DEFAULT_RING_POINTS
    } else {
        points
    };

    let distance_x = radius_km / (KM_PER_DEGREE_LNG * (center.lat * PI / 180.0).cos());
    let distance_y = radius_km / KM_PER_DEGREE_LAT;

    let mut ring: Vec<LngLat> = (0..points)
        .map(|i| {
            let theta = (i as f64 / points as f64) * (2.0 * PI);
            LngLat::new(
                center.lng + distance_x * theta.cos(),
                center.lat + distance_y * theta.sin(),
            )
        })
        .collect();

    ring.push(ring[0]);
    ring
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_zero_radius_is_point() {
        let bounds = bounds_from_center_and_radius(LngLat::new(0.0, 0.0), 0.0);
        assert_eq!(bounds, Bounds::new(0.0, 0.0, 0.0, 0.0));
        assert!(bounds.is_point());
    }

    #[test]
    fn test_zero_radius_off_origin() {
        let center = LngLat::new(3.883528, 43.608749);
        let bounds = bounds_from_center_and_radius(center, 0.0);
        assert_eq!(bounds.south_west(), center);
        assert_eq!(bounds.north_east(), center);
    }

    #[test]
    fn test_lng_delta_doubles_at_sixty_degrees() {
        let bounds = bounds_from_center_and_radius(LngLat::new(10.0, 60.0), 500.0);
        let lat_delta = bounds.height() / 2.0;
        let lng_delta = bounds.width() / 2.0;

        assert!(lat_delta > 0.0);
        assert!(
            (lng_delta / lat_delta - 2.0).abs() < EPSILON,
            "Expected ratio 2, got {}",
            lng_delta / lat_delta
        );
    }

    #[test]
    fn test_lat_delta_matches_circumference() {
        // A quarter circumference north covers 90 degrees of latitude
        let bounds = bounds_from_center_and_radius(LngLat::new(0.0, 0.0), EARTH_CIRCUMFERENCE / 4.0);
        assert!((bounds.north - 90.0).abs() < EPSILON);
        assert!((bounds.south + 90.0).abs() < EPSILON);
    }

    #[test]
    fn test_bounds_centered_on_input() {
        let center = LngLat::new(-74.0060, 40.7128);
        let bounds = bounds_from_center_and_radius(center, 1_234.0);
        let c = bounds.center();
        assert!((c.lng - center.lng).abs() < EPSILON);
        assert!((c.lat - center.lat).abs() < EPSILON);
    }

    #[test]
    fn test_pixel_radius_at_equator_zoom_zero() {
        let radius = pixel_radius_for_accuracy(1000.0, 0.0, 0.0, 512.0);
        let expected = 1000.0 / (40_075_016.686 / 512.0);
        assert!(
            (radius - expected).abs() < 1e-12,
            "Expected {}, got {}",
            expected,
            radius
        );
    }

    #[test]
    fn test_pixel_radius_doubles_per_zoom_level() {
        let r15 = pixel_radius_for_accuracy(10.0, 43.6, 15.0, DEFAULT_TILE_SIZE);
        let r16 = pixel_radius_for_accuracy(10.0, 43.6, 16.0, DEFAULT_TILE_SIZE);
        assert!((r16 / r15 - 2.0).abs() < EPSILON);
    }

    #[test]
    fn test_meters_per_pixel_shrinks_with_latitude() {
        let equator = meters_per_pixel(0.0, 18.0, DEFAULT_TILE_SIZE);
        let sixty = meters_per_pixel(60.0, 18.0, DEFAULT_TILE_SIZE);
        assert!((sixty / equator - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_pixel_radius_street_level() {
        // 10 m accuracy at zoom 18 in Montpellier is roughly 46 px on a 512 px tile
        let radius = pixel_radius_for_accuracy(10.0, 43.608749, 18.0, DEFAULT_TILE_SIZE);
        assert!(radius > 40.0 && radius < 50.0, "Got {}", radius);
    }

    #[test]
    fn test_mercator_origin() {
        let (x, y) = mercator_from_lng_lat(LngLat::new(0.0, 0.0));
        assert!((x - 0.5).abs() < EPSILON);
        assert!((y - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_mercator_roundtrip() {
        let original = LngLat::new(3.881970, 43.609040);
        let (x, y) = mercator_from_lng_lat(original);
        let back = lng_lat_from_mercator(x, y);
        assert!((back.lng - original.lng).abs() < EPSILON);
        assert!((back.lat - original.lat).abs() < EPSILON);
    }

    #[test]
    fn test_ring_is_closed() {
        let ring = accuracy_circle_ring(LngLat::new(2.35, 48.87), 0.05, 16);
        assert_eq!(ring.len(), 17);
        assert_eq!(ring.first(), ring.last());
    }

    #[test]
    fn test_ring_default_points() {
        let ring = accuracy_circle_ring(LngLat::new(0.0, 0.0), 1.0, 0);
        assert_eq!(ring.len(), DEFAULT_RING_POINTS + 1);
    }

    #[test]
    fn test_ring_first_vertex_east_of_center() {
        let center = LngLat::new(0.0, 0.0);
        let ring = accuracy_circle_ring(center, KM_PER_DEGREE_LNG, 4);
        assert!((ring[0].lng - 1.0).abs() < EPSILON);
        assert!(ring[0].lat.abs() < EPSILON);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_bounds_contain_center(
                lng in -179.0..179.0_f64,
                lat in -80.0..80.0_f64,
                radius in 0.0..50_000.0_f64
            ) {
                let bounds = bounds_from_center_and_radius(LngLat::new(lng, lat), radius);
                prop_assert!(bounds.west <= lng && lng <= bounds.east);
                prop_assert!(bounds.south <= lat && lat <= bounds.north);
            }

            #[test]
            fn test_lng_delta_never_smaller_than_lat_delta(
                lat in -80.0..80.0_f64,
                radius in 1.0..50_000.0_f64
            ) {
                let bounds = bounds_from_center_and_radius(LngLat::new(0.0, lat), radius);
                prop_assert!(bounds.width() >= bounds.height() - 1e-12);
            }

            #[test]
            fn test_pixel_radius_linear_in_accuracy(
                accuracy in 0.1..5_000.0_f64,
                lat in -80.0..80.0_f64,
                zoom in 0.0..22.0_f64
            ) {
                let single = pixel_radius_for_accuracy(accuracy, lat, zoom, DEFAULT_TILE_SIZE);
                let double = pixel_radius_for_accuracy(accuracy * 2.0, lat, zoom, DEFAULT_TILE_SIZE);
                prop_assert!((double / single - 2.0).abs() < 1e-9);
            }
        }
    }
}
