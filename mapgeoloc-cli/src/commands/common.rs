//! Common types and utilities shared across CLI commands.

use std::path::Path;

use console::style;
use mapgeoloc::{
    add_geolocation_to, ConfigFile, GeolocatedMap, HeadlessMap, LayerOptions, LngLat,
    RecordingSurface,
};

use crate::error::CliError;

/// Zoom the headless map starts at.
pub const DEFAULT_START_ZOOM: f64 = 18.0;

/// The map type every session runs against.
pub type SessionMap = GeolocatedMap<HeadlessMap, RecordingSurface>;

/// Parse a `LAT,LNG` pair as typed on the command line.
pub fn parse_lat_lng(value: &str) -> Result<LngLat, String> {
    let (lat, lng) = value
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LNG, got '{}'", value))?;

    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|e| format!("invalid latitude '{}': {}", lat.trim(), e))?;
    let lng: f64 = lng
        .trim()
        .parse()
        .map_err(|e| format!("invalid longitude '{}': {}", lng.trim(), e))?;

    if !(-90.0..=90.0).contains(&lat) {
        return Err(format!("latitude {} out of range", lat));
    }
    if !(-180.0..=180.0).contains(&lng) {
        return Err(format!("longitude {} out of range", lng));
    }

    Ok(LngLat::new(lng, lat))
}

/// Load the configuration: explicit path, else the default location, else
/// built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<ConfigFile, CliError> {
    match path {
        Some(path) => Ok(ConfigFile::load_from(path)?),
        None => Ok(ConfigFile::load()?),
    }
}

/// Build a headless map centered on `center` with the geolocation layer.
pub fn headless_session_map(
    center: LngLat,
    zoom: f64,
    options: LayerOptions,
) -> Result<SessionMap, CliError> {
    let host = HeadlessMap::new(center, zoom);
    Ok(add_geolocation_to(host, RecordingSurface::new(), options)?)
}

/// Print a `label: value` line with a dimmed label.
pub fn print_field(label: &str, value: impl std::fmt::Display) {
    println!("  {:<12} {}", style(label).dim(), value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lat_lng() {
        let point = parse_lat_lng("43.608749,3.883528").unwrap();
        assert_eq!(point, LngLat::new(3.883528, 43.608749));
    }

    #[test]
    fn test_parse_lat_lng_with_spaces() {
        let point = parse_lat_lng(" -33.5 , 151.2 ").unwrap();
        assert_eq!(point, LngLat::new(151.2, -33.5));
    }

    #[test]
    fn test_parse_lat_lng_rejects_bad_input() {
        assert!(parse_lat_lng("43.6").is_err());
        assert!(parse_lat_lng("abc,3.8").is_err());
        assert!(parse_lat_lng("91,0").is_err());
        assert!(parse_lat_lng("0,181").is_err());
    }

    #[test]
    fn test_load_config_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[layer]\nmax_zoom = 19\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.layer.max_zoom, 19.0);
    }

    #[test]
    fn test_load_config_missing_explicit_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(Some(&dir.path().join("missing.ini")));
        assert!(matches!(result, Err(CliError::ConfigFile(_))));
    }
}
