//! Software map camera for running the layer without a renderer.
//!
//! `HeadlessMap` keeps a center/zoom/bearing triple and implements
//! `camera_for_bounds` with Web Mercator math, the same way vector map
//! renderers do. It records every camera jump so callers can inspect them.

use std::cell::Cell;

use tracing::debug;

use super::{CameraOptions, CameraTransform, HostMap};
use crate::geo::{lng_lat_from_mercator, mercator_from_lng_lat, Bounds, LngLat, DEFAULT_TILE_SIZE};

/// Default canvas size in CSS pixels.
const DEFAULT_CANVAS_SIZE: (f64, f64) = (800.0, 600.0);

/// A map camera without a renderer.
#[derive(Debug, Clone)]
pub struct HeadlessMap {
    center: LngLat,
    zoom: f64,
    bearing: f64,
    canvas_size: (f64, f64),
    tile_size: f64,
    moving: bool,
    jumps: Vec<CameraTransform>,
    fit_requests: Cell<usize>,
}

impl HeadlessMap {
    /// Create a camera at `center` and `zoom` with an 800×600 canvas.
    pub fn new(center: LngLat, zoom: f64) -> Self {
        Self {
            center,
            zoom,
            bearing: 0.0,
            canvas_size: DEFAULT_CANVAS_SIZE,
            tile_size: DEFAULT_TILE_SIZE,
            moving: false,
            jumps: Vec::new(),
            fit_requests: Cell::new(0),
        }
    }

    /// Set the canvas size in CSS pixels.
    pub fn with_canvas_size(mut self, width: f64, height: f64) -> Self {
        self.canvas_size = (width, height);
        self
    }

    /// Set the renderer tile size.
    pub fn with_tile_size(mut self, tile_size: f64) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// Set the initial bearing.
    pub fn with_bearing(mut self, bearing: f64) -> Self {
        self.bearing = bearing;
        self
    }

    /// Current center.
    pub fn center(&self) -> LngLat {
        self.center
    }

    /// Mark the camera as moving (gesture or animation in progress).
    pub fn set_moving(&mut self, moving: bool) {
        self.moving = moving;
    }

    /// Every transform passed to `jump_to`, oldest first.
    pub fn jumps(&self) -> &[CameraTransform] {
        &self.jumps
    }

    /// Number of `camera_for_bounds` calls so far.
    pub fn fit_requests(&self) -> usize {
        self.fit_requests.get()
    }
}

impl HostMap for HeadlessMap {
    fn jump_to(&mut self, transform: CameraTransform) {
        self.center = transform.center;
        if let Some(zoom) = transform.zoom {
            self.zoom = zoom;
        }
        if let Some(bearing) = transform.bearing {
            self.bearing = bearing;
        }
        debug!(
            center = %self.center,
            zoom = self.zoom,
            bearing = self.bearing,
            "Headless camera jump"
        );
        self.jumps.push(transform);
    }

    fn camera_for_bounds(
        &self,
        bounds: Bounds,
        options: &CameraOptions,
    ) -> Option<CameraTransform> {
        self.fit_requests.set(self.fit_requests.get() + 1);

        let (width, height) = self.canvas_size;
        let available_width = width - 2.0 * options.padding;
        let available_height = height - 2.0 * options.padding;
        if available_width <= 0.0 || available_height <= 0.0 {
            return None;
        }

        // Corners in world pixels at zoom 0
        let corners = [
            LngLat::new(bounds.west, bounds.north),
            LngLat::new(bounds.east, bounds.north),
            LngLat::new(bounds.east, bounds.south),
            LngLat::new(bounds.west, bounds.south),
        ]
        .map(|corner| {
            let (x, y) = mercator_from_lng_lat(corner);
            (x * self.tile_size, y * self.tile_size)
        });

        // Rotate into screen orientation
        let angle = -options.bearing.to_radians();
        let (sin, cos) = angle.sin_cos();
        let rotated = corners.map(|(x, y)| (x * cos - y * sin, x * sin + y * cos));

        let min_x = rotated.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
        let max_x = rotated.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
        let min_y = rotated.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
        let max_y = rotated.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
        let span_x = max_x - min_x;
        let span_y = max_y - min_y;

        let scale = match (span_x > 0.0, span_y > 0.0) {
            (true, true) => (available_width / span_x).min(available_height / span_y),
            (true, false) => available_width / span_x,
            (false, true) => available_height / span_y,
            (false, false) => f64::INFINITY,
        };
        let zoom = scale.log2().min(options.max_zoom);

        let (nw_x, nw_y) = mercator_from_lng_lat(LngLat::new(bounds.west, bounds.north));
        let (se_x, se_y) = mercator_from_lng_lat(LngLat::new(bounds.east, bounds.south));
        let center = lng_lat_from_mercator((nw_x + se_x) / 2.0, (nw_y + se_y) / 2.0);

        Some(CameraTransform {
            center,
            zoom: Some(zoom),
            bearing: Some(options.bearing),
        })
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn bearing(&self) -> f64 {
        self.bearing
    }

    fn is_moving(&self) -> bool {
        self.moving
    }

    fn canvas_size(&self) -> (f64, f64) {
        self.canvas_size
    }

    fn tile_size(&self) -> f64 {
        self.tile_size
    }
}
