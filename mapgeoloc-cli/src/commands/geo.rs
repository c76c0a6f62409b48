//! Geo math commands: `bounds` and `pixel-radius`.

use mapgeoloc::geo::{
    bounds_from_center_and_radius, meters_per_pixel, pixel_radius_for_accuracy, DEFAULT_TILE_SIZE,
};
use mapgeoloc::config::DEFAULT_MINIMUM_ACCURACY_CIRCLE_RADIUS;
use mapgeoloc::LngLat;

use super::common::print_field;
use crate::error::CliError;

/// Print the bounding box of a circle, optionally as JSON.
pub fn run_bounds(lat: f64, lng: f64, radius: f64, json: bool) -> Result<(), CliError> {
    if !(radius.is_finite() && radius >= 0.0) {
        return Err(CliError::Config(format!(
            "--radius must be a non-negative distance, got {}",
            radius
        )));
    }

    let bounds = bounds_from_center_and_radius(LngLat::new(lng, lat), radius);

    if json {
        println!("{}", serde_json::to_string(&bounds.to_array())?);
        return Ok(());
    }

    println!("Bounds of {} m around {}", radius, LngLat::new(lng, lat));
    print_field("West", format!("{:.6}", bounds.west));
    print_field("South", format!("{:.6}", bounds.south));
    print_field("East", format!("{:.6}", bounds.east));
    print_field("North", format!("{:.6}", bounds.north));
    Ok(())
}

/// Print the on-screen radius of an accuracy circle.
pub fn run_pixel_radius(
    accuracy: f64,
    lat: f64,
    zoom: f64,
    tile_size: Option<f64>,
) -> Result<(), CliError> {
    let tile_size = tile_size.unwrap_or(DEFAULT_TILE_SIZE);
    if !(tile_size.is_finite() && tile_size > 0.0) {
        return Err(CliError::Config(format!(
            "--tile-size must be positive, got {}",
            tile_size
        )));
    }

    let radius = pixel_radius_for_accuracy(accuracy, lat, zoom, tile_size);
    let visible = radius >= DEFAULT_MINIMUM_ACCURACY_CIRCLE_RADIUS;

    print_field("Resolution", format!("{:.4} m/px", meters_per_pixel(lat, zoom, tile_size)));
    print_field("Radius", format!("{:.2} px", radius));
    print_field(
        "Circle",
        if visible {
            "shown"
        } else {
            "hidden (below minimum radius)"
        },
    );
    Ok(())
}
