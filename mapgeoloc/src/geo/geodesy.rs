//! Great-circle navigation on a spherical earth.
//!
//! Used by the route simulator to walk a straight line between two points.
//!
//! # Coordinate System
//!
//! - Latitude: degrees north (-90 to 90)
//! - Longitude: degrees east (-180 to 180)
//! - Bearing: degrees true (0-360, 0=north, 90=east)
//! - Distance: meters

use super::LngLat;

/// Mean earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Great-circle distance between two points (haversine formula).
///
/// # Example
///
/// ```
/// use mapgeoloc::geo::{distance_m, LngLat};
///
/// // One degree of latitude is about 111 km
/// let d = distance_m(LngLat::new(0.0, 0.0), LngLat::new(0.0, 1.0));
/// assert!((d - 111_195.0).abs() < 10.0);
/// ```
pub fn distance_m(from: LngLat, to: LngLat) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_M * c
}

/// Initial bearing (forward azimuth) from `from` to `to`, in 0..360.
pub fn initial_bearing(from: LngLat, to: LngLat) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let y = delta_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lng.cos();

    y.atan2(x).to_degrees().rem_euclid(360.0)
}

/// Point reached travelling `distance_m` meters from `start` along `bearing`.
pub fn destination(start: LngLat, distance_m: f64, bearing: f64) -> LngLat {
    let lat1 = start.lat.to_radians();
    let lng1 = start.lng.to_radians();
    let bearing = bearing.to_radians();
    let angular = distance_m / EARTH_RADIUS_M;

    let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
    let lng2 = lng1
        + (bearing.sin() * angular.sin() * lat1.cos()).atan2(angular.cos() - lat1.sin() * lat2.sin());

    // Normalize longitude to -180..180
    let lng = (lng2.to_degrees() + 540.0).rem_euclid(360.0) - 180.0;

    LngLat::new(lng, lat2.to_degrees())
}

/// Samples the straight route from `start` to `end` every `step_m` meters.
///
/// The start point is always the first sample. Samples stop strictly short
/// of `end`, so the end point itself is never emitted. A non-positive or
/// non-finite step yields just the start point.
pub fn sample_route(start: LngLat, end: LngLat, step_m: f64) -> Vec<LngLat> {
    let mut samples = vec![start];
    if !(step_m.is_finite() && step_m > 0.0) {
        return samples;
    }

    let total = distance_m(start, end);
    let bearing = initial_bearing(start, end);

    let mut travelled = step_m;
    while travelled < total {
        samples.push(destination(start, travelled, bearing));
        travelled += step_m;
    }

    samples
}
