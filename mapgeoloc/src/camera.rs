//! Camera controller
//!
//! Computes the camera transform that keeps the position in view while
//! tracking.
//!
//! # Auto-zoom
//!
//! ```text
//! Disabled      → center on position, keep zoom
//! FixedPadding  → fit accuracy bounds, padding schedule from padding_px
//! Adaptive      → only when the viewport spans > 16× or < 2× the accuracy:
//!                 fit accuracy bounds, padding schedule from
//!                 min(width, height) · 0.5 · percentage / 100
//! ```
//!
//! The padding schedule halves the padding after every failed fit and stops
//! once it falls to [`PADDING_FLOOR`], falling back to a center-only camera.

use tracing::{debug, warn};

use crate::config::{AutoZoom, LayerOptions};
use crate::geo::meters_per_pixel;
use crate::host::{CameraOptions, CameraTransform, FloorOverlay, HostMap};
use crate::position::Position;

/// Padding (px) at or below which the fit loop gives up.
pub const PADDING_FLOOR: f64 = 1.0;

/// The viewport spanning more than this many accuracy radii triggers a refit.
const ADAPTIVE_ZOOM_OUT_FACTOR: f64 = 16.0;

/// The viewport spanning fewer than this many accuracy radii triggers a refit.
const ADAPTIVE_ZOOM_IN_FACTOR: f64 = 2.0;

/// Outcome of [`fit_with_padding_schedule`].
#[derive(Debug, Clone, PartialEq)]
pub struct PaddingFit<T> {
    /// The first successful fit, if any.
    pub fit: Option<T>,
    /// Number of fit attempts made.
    pub attempts: u32,
    /// Padding of the last attempt.
    pub last_padding: f64,
}

/// Runs `attempt` with a halving padding until it succeeds.
///
/// At least one attempt is always made. After a failure the padding is
/// halved and the loop continues while it stays above [`PADDING_FLOOR`], so
/// a starting padding `P > 1` costs at most `ceil(log2(P))` attempts.
pub fn fit_with_padding_schedule<T>(
    start_padding: f64,
    mut attempt: impl FnMut(f64) -> Option<T>,
) -> PaddingFit<T> {
    let mut padding = start_padding;
    let mut attempts = 0;

    loop {
        attempts += 1;
        let last_padding = padding;

        if let Some(fit) = attempt(padding) {
            return PaddingFit {
                fit: Some(fit),
                attempts,
                last_padding,
            };
        }

        padding /= 2.0;
        // Negated comparison also stops on NaN
        if !(padding > PADDING_FLOOR) {
            return PaddingFit {
                fit: None,
                attempts,
                last_padding,
            };
        }
    }
}

/// Frames the tracked position according to the layer options.
#[derive(Debug, Clone)]
pub struct CameraController {
    auto_zoom: AutoZoom,
    max_zoom: f64,
}

impl CameraController {
    /// Create a controller from layer options.
    pub fn new(options: &LayerOptions) -> Self {
        Self {
            auto_zoom: options.auto_zoom,
            max_zoom: options.max_zoom,
        }
    }

    /// Auto-zoom mode in use.
    pub fn auto_zoom(&self) -> AutoZoom {
        self.auto_zoom
    }

    /// Compute the transform framing `position`.
    ///
    /// Returns `None` while the map is moving; the caller then leaves the
    /// camera alone.
    pub fn frame(&self, position: &Position, host: &dyn HostMap) -> Option<CameraTransform> {
        if host.is_moving() {
            debug!("Map is moving, skipping re-center");
            return None;
        }

        let fitted = match self.auto_zoom {
            AutoZoom::Disabled => None,
            AutoZoom::FixedPadding { padding_px } => {
                let accuracy = position.accuracy.unwrap_or(0.0);
                self.fit_accuracy(position, accuracy, padding_px, host)
            }
            AutoZoom::Adaptive {
                padding_percentage,
                default_accuracy_m,
            } => {
                let accuracy = position.accuracy.unwrap_or(default_accuracy_m);
                let (width, height) = host.canvas_size();
                let span_m = width * meters_per_pixel(position.lat, host.zoom(), host.tile_size());

                if span_m > accuracy * ADAPTIVE_ZOOM_OUT_FACTOR
                    || span_m < accuracy * ADAPTIVE_ZOOM_IN_FACTOR
                {
                    let padding = width.min(height) * 0.5 * padding_percentage / 100.0;
                    self.fit_accuracy(position, accuracy, padding, host)
                } else {
                    debug!(span_m, accuracy, "Accuracy comfortably framed, keeping zoom");
                    None
                }
            }
        };

        Some(fitted.unwrap_or_else(|| CameraTransform::center_only(position.lng_lat())))
    }

    /// Frame `position`, jump there, and follow its floor.
    ///
    /// Returns `true` if the camera was moved.
    pub fn center(
        &self,
        position: &Position,
        host: &mut dyn HostMap,
        floor: Option<&mut dyn FloorOverlay>,
    ) -> bool {
        let Some(transform) = self.frame(position, host) else {
            return false;
        };

        host.jump_to(transform);

        if let (Some(overlay), Some(level)) = (floor, position.level) {
            if overlay.has_selected_map() && overlay.level() != Some(level) {
                debug!(level, "Switching floor to follow position");
                overlay.set_level(level);
            }
        }

        true
    }

    fn fit_accuracy(
        &self,
        position: &Position,
        accuracy_m: f64,
        start_padding: f64,
        host: &dyn HostMap,
    ) -> Option<CameraTransform> {
        let bounds = position.accuracy_bounds(accuracy_m);
        let bearing = host.bearing();

        let outcome = fit_with_padding_schedule(start_padding, |padding| {
            host.camera_for_bounds(
                bounds,
                &CameraOptions {
                    bearing,
                    max_zoom: self.max_zoom,
                    padding,
                },
            )
        });

        if outcome.fit.is_none() {
            warn!(
                attempts = outcome.attempts,
                last_padding = outcome.last_padding,
                "Accuracy bounds do not fit the viewport, centering only"
            );
        } else {
            debug!(
                attempts = outcome.attempts,
                padding = outcome.last_padding,
                "Fitted accuracy bounds"
            );
        }

        outcome.fit
    }
}
