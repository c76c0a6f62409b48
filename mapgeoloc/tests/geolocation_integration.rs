//! Integration tests for the geolocation overlay.
//!
//! These tests drive the public API the way a host application would:
//! - host positions → layer → marker surface and camera
//! - provider → control → layer, with the control state following along
//! - map gestures and floor overlay events
//!
//! Run with: `cargo test --test geolocation_integration`

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use mapgeoloc::{
    add_geolocation_to, AutoZoom, ButtonClasses, ControlState, FloorEvent, FloorOverlay,
    GeolocatedMap, GeolocationControl, HeadlessMap, LayerOptions, LngLat, ManualProvider,
    MapEvent, Position, ProviderEvent, RecordingSurface, SimulationSettings, SimulatorProvider,
    SurfaceOp,
};

// ============================================================================
// Helper Functions
// ============================================================================

const FIRST: (f64, f64) = (43.608749, 3.883528);
const SECOND: (f64, f64) = (43.609040, 3.881970);

fn position((lat, lng): (f64, f64)) -> Position {
    Position::new(lng, lat)
}

fn montpellier_map(options: LayerOptions) -> GeolocatedMap<HeadlessMap, RecordingSurface> {
    let host = HeadlessMap::new(LngLat::new(FIRST.1, FIRST.0), 18.0);
    add_geolocation_to(host, RecordingSurface::new(), options).expect("valid options")
}

fn count_marker_moves(surface: &RecordingSurface) -> usize {
    surface.count(|op| matches!(op, SurfaceOp::SetMarkerPosition(_)))
}

/// Floor overlay with a shared level so the test can observe switches.
#[derive(Clone, Default)]
struct SharedFloor {
    level: Arc<Mutex<Option<i32>>>,
}

impl FloorOverlay for SharedFloor {
    fn level(&self) -> Option<i32> {
        *self.level.lock()
    }

    fn set_level(&mut self, level: i32) {
        *self.level.lock() = Some(level);
    }

    fn has_selected_map(&self) -> bool {
        true
    }
}

// ============================================================================
// Integration Tests
// ============================================================================

/// Two positions with tracking and auto-zoom on: two notifications, two
/// marker moves, and a camera jump after each.
#[test]
fn test_two_positions_end_to_end() {
    let mut map = montpellier_map(LayerOptions::default());
    let notified = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&notified);
    map.on_position_changed(move |event| {
        sink.lock()
            .push(event.position.as_ref().map(|p| p.lng_lat()));
    });

    map.set_position(Some(position(FIRST).shared()));
    let jumps_after_first = map.host().jumps().len();
    map.set_position(Some(position(SECOND).shared()));

    assert_eq!(notified.lock().len(), 2);
    assert_eq!(count_marker_moves(map.surface()), 2);
    assert!(jumps_after_first >= 1);
    assert!(map.host().jumps().len() > jumps_after_first);
    assert_eq!(map.host().center(), LngLat::new(SECOND.1, SECOND.0));
}

/// Fixed-padding auto-zoom on a wide accuracy zooms the camera to fit it.
#[test]
fn test_fixed_padding_fits_accuracy() {
    let options = LayerOptions::default().with_auto_zoom(AutoZoom::FixedPadding { padding_px: 40.0 });
    let mut map = montpellier_map(options);

    map.set_position(Some(position(FIRST).with_accuracy(500.0).shared()));

    let jump = map.host().jumps().last().copied().expect("camera moved");
    let zoom = jump.zoom.expect("fitted zoom");
    assert!(zoom < 18.0, "500 m should not fit at zoom 18, got {}", zoom);
}

/// Same `Arc` twice is one mutation; an equal copy is another.
#[test]
fn test_identity_based_idempotence() {
    let mut map = montpellier_map(LayerOptions::default());
    let count = Arc::new(Mutex::new(0usize));
    let sink = Arc::clone(&count);
    map.on_position_changed(move |_| *sink.lock() += 1);

    let shared = position(FIRST).shared();
    map.set_position(Some(Arc::clone(&shared)));
    map.set_position(Some(Arc::clone(&shared)));
    assert_eq!(*count.lock(), 1);

    map.set_position(Some(position(FIRST).shared()));
    assert_eq!(*count.lock(), 2);
    assert_eq!(count_marker_moves(map.surface()), 2);
}

/// Full control flow with a manual provider.
#[test]
fn test_control_state_machine_flow() {
    let mut map = montpellier_map(LayerOptions::default());
    let provider = ManualProvider::new();
    let handle = provider.handle();
    let view = ButtonClasses::new();
    let mut control = GeolocationControl::new(Some(Box::new(provider)), view.clone());
    control.attach(&mut map).unwrap();

    let states = |control: &GeolocationControl| control.state();
    assert_eq!(states(&control), ControlState::Idle);

    control.locate_me(&mut map).unwrap();
    assert_eq!(states(&control), ControlState::Waiting);

    handle.push_position(position(FIRST).with_accuracy(10.0));
    control.pump(&mut map).unwrap();
    assert_eq!(states(&control), ControlState::Active);
    assert!(map.surface().has_marker());

    map.handle_map_event(MapEvent::Wheel);
    assert_eq!(states(&control), ControlState::ActiveBackground);

    // Not tracking: new positions move the marker, not the camera
    let jumps = map.host().jumps().len();
    handle.push_position(position(SECOND));
    control.pump(&mut map).unwrap();
    assert_eq!(map.host().jumps().len(), jumps);
    assert_eq!(map.surface().marker_position(), Some(LngLat::new(SECOND.1, SECOND.0)));

    control.locate_me(&mut map).unwrap();
    assert_eq!(states(&control), ControlState::Active);
    assert_eq!(handle.start_count(), 1);

    control.stop(&mut map).unwrap();
    assert_eq!(handle.stop_count(), 1);
    assert!(!handle.push_position(position(FIRST)));
}

/// The floor overlay hides the marker on other floors and follows the
/// position while tracking.
#[test]
fn test_floor_overlay_flow() {
    let floor = SharedFloor::default();
    *floor.level.lock() = Some(0);
    let options = LayerOptions::default().with_track_user_location(false);
    let mut map = montpellier_map(options).with_floor_overlay(floor.clone());

    map.set_position(Some(position(FIRST).with_level(1).shared()));
    assert!(!map.surface().has_marker());

    // Host switches floor itself
    *floor.level.lock() = Some(1);
    map.handle_floor_event(FloorEvent::LevelChanged);
    assert!(map.surface().has_marker());

    // Tracking follows the position to floor 2
    map.set_track_user_location(true);
    map.set_position(Some(position(SECOND).with_level(2).shared()));
    assert_eq!(*floor.level.lock(), Some(2));
    map.handle_floor_event(FloorEvent::LevelChanged);
    assert!(map.surface().has_marker());

    map.handle_floor_event(FloorEvent::ControlClicked);
    assert!(!map.track_user_location());
}

/// Gestures disable tracking for good; idle and zoom do not.
#[test]
fn test_map_interaction_disables_tracking() {
    let mut map = montpellier_map(LayerOptions::default());
    let changes = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&changes);
    map.on_tracking_changed(move |event| sink.lock().push(event.track_user_location));

    map.handle_map_event(MapEvent::Idle);
    map.handle_map_event(MapEvent::Zoom);
    assert!(map.track_user_location());

    map.handle_map_event(MapEvent::TouchStart);
    map.handle_map_event(MapEvent::MouseDown);
    map.set_position(Some(position(FIRST).shared()));

    assert!(!map.track_user_location());
    assert_eq!(*changes.lock(), vec![false]);
    assert!(map.host().jumps().is_empty());
}

/// No re-centering while the camera is animating.
#[test]
fn test_no_recenter_while_moving() {
    let mut map = montpellier_map(LayerOptions::default());
    map.host_mut().set_moving(true);

    map.set_position(Some(position(FIRST).shared()));

    assert!(map.host().jumps().is_empty());
    assert!(map.surface().has_marker());
}

/// Simulator → control → map on a paused tokio clock.
#[tokio::test(start_paused = true)]
async fn test_simulator_drives_map() {
    let mut map = montpellier_map(LayerOptions::default());
    let settings = SimulationSettings {
        interval: Duration::from_millis(300),
        step_m: 1.0,
        accuracy_m: 10.0,
        heading: 280.0,
    };
    let simulator = SimulatorProvider::new(
        LngLat::new(FIRST.1, FIRST.0),
        LngLat::new(SECOND.1, SECOND.0),
        &settings,
    );
    let mut control = GeolocationControl::new(Some(Box::new(simulator)), ButtonClasses::new());
    control.attach(&mut map).unwrap();
    control.locate_me(&mut map).unwrap();

    let mut positions = 0;
    while positions < 3 {
        match control.pump_next(&mut map).await.unwrap() {
            Some(ProviderEvent::Position(_)) => positions += 1,
            Some(ProviderEvent::Heading(_)) => {}
            None => panic!("simulator ended early"),
        }
    }
    control.stop(&mut map).unwrap();

    assert_eq!(control.state(), ControlState::Active);
    assert_eq!(count_marker_moves(map.surface()), 3);
    assert_eq!(map.heading(), Some(280.0));
    assert!(map.surface().has_heading());
}

#[tokio::test(start_paused = true)]
async fn test_zero_interval_simulator_reaches_active() {
    let mut map = montpellier_map(LayerOptions::default());
    let settings = SimulationSettings {
        interval: Duration::ZERO,
        ..SimulationSettings::default()
    };
    let simulator = SimulatorProvider::new(
        LngLat::new(FIRST.1, FIRST.0),
        LngLat::new(SECOND.1, SECOND.0),
        &settings,
    );
    let mut control = GeolocationControl::new(Some(Box::new(simulator)), ButtonClasses::new());
    control.attach(&mut map).unwrap();
    control.locate_me(&mut map).unwrap();
    assert_eq!(control.state(), ControlState::Waiting);

    let event = tokio::time::timeout(Duration::from_millis(500), control.pump_next(&mut map))
        .await
        .expect("simulator should emit within 500 ms")
        .unwrap();
    assert!(matches!(event, Some(ProviderEvent::Position(Some(_)))));
    assert_eq!(control.state(), ControlState::Active);

    control.stop(&mut map).unwrap();
}
