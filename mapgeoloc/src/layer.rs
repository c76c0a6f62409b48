//! Position state layer
//!
//! `GeolocationLayer` exclusively owns the position, heading and tracking
//! flag. The three mutators are the only way to change them, and each
//! successful mutation runs in a fixed order:
//!
//! 1. update state
//! 2. render the affected elements
//! 3. re-center the camera (position while tracking, or tracking switched on)
//! 4. emit the change notification
//!
//! Mutators are no-ops when handed the value already held. For positions,
//! "the same value" means the same `Arc`: two equal but distinct positions
//! both render and both notify.

use std::sync::Arc;

use tracing::{debug, info};

use crate::camera::CameraController;
use crate::config::LayerOptions;
use crate::events::{GeolocationEvents, HeadingChanged, PositionChanged, TrackingChanged};
use crate::host::{FloorEvent, FloorOverlay, HostMap, MapEvent, MarkerSurface};
use crate::position::{Heading, SharedPosition};
use crate::render::RenderState;

/// Borrowed host collaborators for one layer operation.
pub struct Collaborators<'a> {
    pub host: &'a mut dyn HostMap,
    pub surface: &'a mut dyn MarkerSurface,
    pub floor: Option<&'a mut dyn FloorOverlay>,
}

/// Position, heading and tracking state with its render cache.
#[derive(Debug)]
pub struct GeolocationLayer {
    options: LayerOptions,
    camera: CameraController,
    position: Option<SharedPosition>,
    heading: Option<Heading>,
    track_user_location: bool,
    render: RenderState,
    events: GeolocationEvents,
}

impl GeolocationLayer {
    /// Create a layer. Options are expected to be validated.
    pub fn new(options: LayerOptions) -> Self {
        Self {
            camera: CameraController::new(&options),
            track_user_location: options.track_user_location,
            options,
            position: None,
            heading: None,
            render: RenderState::default(),
            events: GeolocationEvents::default(),
        }
    }

    /// Options in use.
    pub fn options(&self) -> &LayerOptions {
        &self.options
    }

    /// Current position.
    pub fn position(&self) -> Option<&SharedPosition> {
        self.position.as_ref()
    }

    /// Current heading.
    pub fn heading(&self) -> Option<Heading> {
        self.heading
    }

    /// Whether the camera follows the position.
    pub fn track_user_location(&self) -> bool {
        self.track_user_location
    }

    /// Cached visibility of the rendered elements.
    pub fn render_state(&self) -> RenderState {
        self.render
    }

    /// Notification channels.
    pub fn events(&self) -> &GeolocationEvents {
        &self.events
    }

    /// Notification channels, for subscribing.
    pub fn events_mut(&mut self) -> &mut GeolocationEvents {
        &mut self.events
    }

    /// Replace the position.
    pub fn set_position(&mut self, ctx: &mut Collaborators<'_>, position: Option<SharedPosition>) {
        let unchanged = match (&self.position, &position) {
            (Some(current), Some(new)) => Arc::ptr_eq(current, new),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return;
        }

        self.position = position;

        self.render_position(ctx);
        self.render_accuracy(ctx);

        if self.track_user_location {
            self.center_on_position(ctx);
        }

        self.events.position_changed.emit(&PositionChanged {
            position: self.position.clone(),
        });
    }

    /// Replace the heading.
    pub fn set_heading(&mut self, ctx: &mut Collaborators<'_>, heading: Option<Heading>) {
        if self.heading == heading {
            return;
        }

        self.heading = heading;
        self.render.render_heading(self.heading, &mut *ctx.surface);

        self.events
            .heading_changed
            .emit(&HeadingChanged { heading });
    }

    /// Switch tracking on or off.
    ///
    /// Switching on immediately re-centers on the current position.
    pub fn set_track_user_location(&mut self, ctx: &mut Collaborators<'_>, enabled: bool) {
        if self.track_user_location == enabled {
            return;
        }

        self.track_user_location = enabled;
        info!(enabled, "Tracking user location");

        if enabled {
            self.center_on_position(ctx);
        }

        self.events.tracking_changed.emit(&TrackingChanged {
            track_user_location: enabled,
        });
    }

    /// React to a host map event.
    pub fn handle_map_event(&mut self, ctx: &mut Collaborators<'_>, event: MapEvent) {
        if event.is_user_interaction() {
            if self.track_user_location {
                debug!(?event, "User interaction, disabling tracking");
            }
            self.set_track_user_location(ctx, false);
            return;
        }

        if event == MapEvent::Zoom && self.position.is_some() {
            self.render_accuracy(ctx);
        }
    }

    /// React to a floor overlay event.
    pub fn handle_floor_event(&mut self, ctx: &mut Collaborators<'_>, event: FloorEvent) {
        match event {
            FloorEvent::ControlClicked => self.set_track_user_location(ctx, false),
            FloorEvent::LevelChanged | FloorEvent::MapLoaded => {
                self.render_position(ctx);
                if self.track_user_location {
                    self.center_on_position(ctx);
                }
            }
        }
    }

    /// Re-center on the current position if there is one.
    fn center_on_position(&mut self, ctx: &mut Collaborators<'_>) {
        let Some(position) = self.position.as_deref() else {
            return;
        };
        let floor = ctx
            .floor
            .as_mut()
            .map(|overlay| &mut **overlay as &mut dyn FloorOverlay);
        self.camera.center(position, &mut *ctx.host, floor);
    }

    fn render_position(&mut self, ctx: &mut Collaborators<'_>) {
        self.render.render_position(
            self.position.as_deref(),
            ctx.floor.as_deref(),
            &mut *ctx.surface,
        );
    }

    fn render_accuracy(&mut self, ctx: &mut Collaborators<'_>) {
        self.render.render_accuracy(
            self.position.as_deref(),
            &*ctx.host,
            self.options.minimum_accuracy_circle_radius,
            &mut *ctx.surface,
        );
    }
}
