//! Layer options and the INI configuration file.
//!
//! `LayerOptions` is what the layer consumes. `ConfigFile` is the on-disk
//! representation, which adds settings used only by the CLI simulator.
//!
//! # Example Configuration (INI)
//!
//! ```ini
//! [layer]
//! max_zoom = 21
//! minimum_accuracy_circle_radius = 18
//! track_user_location = true
//!
//! [tracking]
//! auto_zoom = adaptive
//! padding_percentage = 75
//! default_accuracy = 50
//!
//! [simulation]
//! interval_ms = 300
//! step_m = 1
//! accuracy = 10
//! heading = 280
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use crate::error::GeolocationError;

/// Default maximum zoom the camera may reach when fitting the accuracy circle.
pub const DEFAULT_MAX_ZOOM: f64 = 21.0;

/// Default minimum on-screen accuracy radius (px) below which the circle is hidden.
pub const DEFAULT_MINIMUM_ACCURACY_CIRCLE_RADIUS: f64 = 18.0;

/// Default share of the half-viewport used as padding in adaptive mode.
pub const DEFAULT_PADDING_PERCENTAGE: f64 = 75.0;

/// Default accuracy (m) assumed in adaptive mode when a position has none.
pub const DEFAULT_AUTO_ZOOM_ACCURACY: f64 = 50.0;

/// Default padding (px) for fixed-padding mode.
pub const DEFAULT_FIXED_PADDING: f64 = 40.0;

/// Configuration file name inside the config directory.
const CONFIG_FILE_NAME: &str = "config.ini";

/// Application directory name inside the platform config directory.
const APP_DIR_NAME: &str = "mapgeoloc";

/// How the camera zooms while tracking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AutoZoom {
    /// Re-center only; keep the current zoom.
    Disabled,

    /// Fit the accuracy bounds, starting from a fixed padding.
    FixedPadding {
        /// Initial padding in pixels
        padding_px: f64,
    },

    /// Fit the accuracy bounds only when the accuracy circle is far out of
    /// a comfortable on-screen size, with padding relative to the viewport.
    Adaptive {
        /// Percentage of half the smaller canvas side used as initial padding
        padding_percentage: f64,
        /// Accuracy (m) assumed for positions without one
        default_accuracy_m: f64,
    },
}

impl Default for AutoZoom {
    fn default() -> Self {
        AutoZoom::Adaptive {
            padding_percentage: DEFAULT_PADDING_PERCENTAGE,
            default_accuracy_m: DEFAULT_AUTO_ZOOM_ACCURACY,
        }
    }
}

impl AutoZoom {
    /// Short name as used in the configuration file.
    pub fn as_str(&self) -> &'static str {
        match self {
            AutoZoom::Disabled => "disabled",
            AutoZoom::FixedPadding { .. } => "fixed",
            AutoZoom::Adaptive { .. } => "adaptive",
        }
    }
}

/// Options consumed by the geolocation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerOptions {
    /// Camera behavior while tracking.
    pub auto_zoom: AutoZoom,

    /// Upper zoom limit when fitting the accuracy circle.
    pub max_zoom: f64,

    /// Accuracy circles smaller than this radius (px) are hidden.
    pub minimum_accuracy_circle_radius: f64,

    /// Whether tracking starts enabled.
    pub track_user_location: bool,
}

impl Default for LayerOptions {
    fn default() -> Self {
        Self {
            auto_zoom: AutoZoom::default(),
            max_zoom: DEFAULT_MAX_ZOOM,
            minimum_accuracy_circle_radius: DEFAULT_MINIMUM_ACCURACY_CIRCLE_RADIUS,
            track_user_location: true,
        }
    }
}

impl LayerOptions {
    /// Set the auto-zoom mode.
    pub fn with_auto_zoom(mut self, auto_zoom: AutoZoom) -> Self {
        self.auto_zoom = auto_zoom;
        self
    }

    /// Set the maximum fit zoom.
    pub fn with_max_zoom(mut self, max_zoom: f64) -> Self {
        self.max_zoom = max_zoom;
        self
    }

    /// Set the minimum accuracy circle radius in pixels.
    pub fn with_minimum_accuracy_circle_radius(mut self, radius_px: f64) -> Self {
        self.minimum_accuracy_circle_radius = radius_px;
        self
    }

    /// Set whether tracking starts enabled.
    pub fn with_track_user_location(mut self, enabled: bool) -> Self {
        self.track_user_location = enabled;
        self
    }

    /// Check every numeric option.
    pub fn validate(&self) -> Result<(), GeolocationError> {
        non_negative("max_zoom", self.max_zoom)?;
        non_negative(
            "minimum_accuracy_circle_radius",
            self.minimum_accuracy_circle_radius,
        )?;

        match self.auto_zoom {
            AutoZoom::Disabled => {}
            AutoZoom::FixedPadding { padding_px } => non_negative("padding", padding_px)?,
            AutoZoom::Adaptive {
                padding_percentage,
                default_accuracy_m,
            } => {
                non_negative("padding_percentage", padding_percentage)?;
                if padding_percentage > 100.0 {
                    return Err(GeolocationError::invalid_option(
                        "padding_percentage",
                        format!("{} exceeds 100", padding_percentage),
                    ));
                }
                non_negative("default_accuracy", default_accuracy_m)?;
            }
        }

        Ok(())
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), GeolocationError> {
    if !value.is_finite() {
        return Err(GeolocationError::invalid_option(
            field,
            format!("{} is not finite", value),
        ));
    }
    if value < 0.0 {
        return Err(GeolocationError::invalid_option(
            field,
            format!("{} is negative", value),
        ));
    }
    Ok(())
}

/// Settings of the built-in route simulator.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSettings {
    /// Delay between two emitted samples.
    pub interval: Duration,
    /// Distance between two route samples in meters.
    pub step_m: f64,
    /// Accuracy attached to every simulated position.
    pub accuracy_m: f64,
    /// Heading emitted with every sample.
    pub heading: f64,
}

impl SimulationSettings {
    /// Check the interval and step.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                section: "simulation",
                key: "interval_ms",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if !(self.step_m.is_finite() && self.step_m > 0.0) {
            return Err(ConfigError::InvalidValue {
                section: "simulation",
                key: "step_m",
                value: self.step_m.to_string(),
                reason: "must be a positive distance".to_string(),
            });
        }
        if !(self.accuracy_m.is_finite() && self.accuracy_m >= 0.0) {
            return Err(ConfigError::InvalidValue {
                section: "simulation",
                key: "accuracy",
                value: self.accuracy_m.to_string(),
                reason: "must be a non-negative distance".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(300),
            step_m: 1.0,
            accuracy_m: 10.0,
            heading: 280.0,
        }
    }
}

/// Errors while loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid INI.
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// A key holds a value of the wrong shape.
    #[error("Invalid value '{value}' for {section}.{key}: {reason}")]
    InvalidValue {
        section: &'static str,
        key: &'static str,
        value: String,
        reason: String,
    },

    /// Values parsed but the resulting options are out of range.
    #[error(transparent)]
    Validation(#[from] GeolocationError),
}

/// The on-disk configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    /// Layer options
    pub layer: LayerOptions,
    /// Simulator settings
    pub simulation: SimulationSettings,
}

impl ConfigFile {
    /// Load from the default path, or defaults when the file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        match config_file_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_ini_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse INI text. Missing sections and keys keep their defaults.
    pub fn from_ini_str(content: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let mut config = ConfigFile::default();

        if let Some(section) = ini.section(Some("layer")) {
            let layer = &mut config.layer;
            if let Some(v) = section.get("max_zoom") {
                layer.max_zoom = parse_value("layer", "max_zoom", v)?;
            }
            if let Some(v) = section.get("minimum_accuracy_circle_radius") {
                layer.minimum_accuracy_circle_radius =
                    parse_value("layer", "minimum_accuracy_circle_radius", v)?;
            }
            if let Some(v) = section.get("track_user_location") {
                layer.track_user_location = parse_value("layer", "track_user_location", v)?;
            }
        }

        if let Some(section) = ini.section(Some("tracking")) {
            let mode = section.get("auto_zoom").unwrap_or("adaptive");
            config.layer.auto_zoom = match mode.trim().to_lowercase().as_str() {
                "disabled" | "off" | "false" => AutoZoom::Disabled,
                "fixed" => AutoZoom::FixedPadding {
                    padding_px: match section.get("padding") {
                        Some(v) => parse_value("tracking", "padding", v)?,
                        None => DEFAULT_FIXED_PADDING,
                    },
                },
                "adaptive" => AutoZoom::Adaptive {
                    padding_percentage: match section.get("padding_percentage") {
                        Some(v) => parse_value("tracking", "padding_percentage", v)?,
                        None => DEFAULT_PADDING_PERCENTAGE,
                    },
                    default_accuracy_m: match section.get("default_accuracy") {
                        Some(v) => parse_value("tracking", "default_accuracy", v)?,
                        None => DEFAULT_AUTO_ZOOM_ACCURACY,
                    },
                },
                _ => {
                    return Err(ConfigError::InvalidValue {
                        section: "tracking",
                        key: "auto_zoom",
                        value: mode.to_string(),
                        reason: "expected disabled, fixed or adaptive".to_string(),
                    })
                }
            };
        }

        if let Some(section) = ini.section(Some("simulation")) {
            let simulation = &mut config.simulation;
            if let Some(v) = section.get("interval_ms") {
                simulation.interval =
                    Duration::from_millis(parse_value("simulation", "interval_ms", v)?);
            }
            if let Some(v) = section.get("step_m") {
                simulation.step_m = parse_value("simulation", "step_m", v)?;
            }
            if let Some(v) = section.get("accuracy") {
                simulation.accuracy_m = parse_value("simulation", "accuracy", v)?;
            }
            if let Some(v) = section.get("heading") {
                simulation.heading = parse_value("simulation", "heading", v)?;
            }
        }

        config.layer.validate()?;
        config.simulation.validate()?;
        Ok(config)
    }

    /// Render as INI text.
    pub fn to_ini_string(&self) -> String {
        let mut ini = Ini::new();
        ini.with_section(Some("layer"))
            .set("max_zoom", self.layer.max_zoom.to_string())
            .set(
                "minimum_accuracy_circle_radius",
                self.layer.minimum_accuracy_circle_radius.to_string(),
            )
            .set(
                "track_user_location",
                self.layer.track_user_location.to_string(),
            );

        match self.layer.auto_zoom {
            AutoZoom::Disabled => {
                ini.with_section(Some("tracking")).set("auto_zoom", "disabled");
            }
            AutoZoom::FixedPadding { padding_px } => {
                ini.with_section(Some("tracking"))
                    .set("auto_zoom", "fixed")
                    .set("padding", padding_px.to_string());
            }
            AutoZoom::Adaptive {
                padding_percentage,
                default_accuracy_m,
            } => {
                ini.with_section(Some("tracking"))
                    .set("auto_zoom", "adaptive")
                    .set("padding_percentage", padding_percentage.to_string())
                    .set("default_accuracy", default_accuracy_m.to_string());
            }
        }

        ini.with_section(Some("simulation"))
            .set(
                "interval_ms",
                self.simulation.interval.as_millis().to_string(),
            )
            .set("step_m", self.simulation.step_m.to_string())
            .set("accuracy", self.simulation.accuracy_m.to_string())
            .set("heading", self.simulation.heading.to_string());

        let mut buffer = Vec::new();
        // Writing into a Vec cannot fail
        let _ = ini.write_to(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// Save to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_ini_string())?;
        Ok(())
    }
}

/// Default configuration file path (`<config_dir>/mapgeoloc/config.ini`).
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

fn parse_value<T>(section: &'static str, key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue {
            section,
            key,
            value: value.to_string(),
            reason: e.to_string(),
        })
}
