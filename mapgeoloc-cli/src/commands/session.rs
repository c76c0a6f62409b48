//! Provider session shared by `simulate` and `replay`.
//!
//! Attaches a control to a headless map, presses "locate me", and applies
//! provider events until the position limit is reached, the provider goes
//! away, or Ctrl+C is pressed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use console::style;
use mapgeoloc::{
    ButtonClasses, ControlState, GeolocationControl, PositionProvider, ProviderEvent, SurfaceOp,
};
use tracing::debug;

use super::common::{print_field, SessionMap};
use crate::error::CliError;

/// How often the event loop wakes up to check for Ctrl+C.
const SHUTDOWN_POLL: Duration = Duration::from_millis(200);

/// Counters collected during a session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub positions: usize,
    pub headings: usize,
    pub camera_jumps: usize,
    pub marker_moves: usize,
    pub final_state: ControlState,
}

/// Print every layer notification as it happens.
pub fn print_notifications(map: &mut SessionMap) {
    map.on_position_changed(|event| match &event.position {
        Some(position) => {
            let accuracy = position
                .accuracy
                .map(|a| format!(" ±{:.0} m", a))
                .unwrap_or_default();
            println!(
                "{} {}{}",
                style("position").cyan(),
                position.lng_lat(),
                accuracy
            );
        }
        None => println!("{} cleared", style("position").cyan()),
    });

    map.on_heading_changed(|event| match event.heading {
        Some(heading) => println!("{} {:.0}°", style("heading ").magenta(), heading),
        None => println!("{} cleared", style("heading ").magenta()),
    });

    map.on_tracking_changed(|event| {
        let label = if event.track_user_location { "on" } else { "off" };
        println!("{} {}", style("tracking").yellow(), label);
    });
}

/// Run `provider` against `map` until `limit` positions were applied.
pub fn run(
    map: &mut SessionMap,
    provider: Box<dyn PositionProvider>,
    limit: Option<usize>,
) -> Result<SessionSummary, CliError> {
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = Arc::clone(&shutdown);

    ctrlc::set_handler(move || {
        println!();
        println!("Received shutdown signal, stopping provider...");
        shutdown_clone.store(true, Ordering::SeqCst);
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(CliError::Runtime)?;

    let mut control = GeolocationControl::new(Some(provider), ButtonClasses::new());
    control.attach(map)?;

    let summary = runtime.block_on(async {
        let mut summary = SessionSummary::default();
        let mut last_state = control.state();

        control.locate_me(map)?;

        while !shutdown.load(Ordering::SeqCst) {
            if limit.is_some_and(|limit| summary.positions >= limit) {
                break;
            }

            let event = match tokio::time::timeout(SHUTDOWN_POLL, control.pump_next(map)).await {
                Ok(result) => result?,
                Err(_) => continue,
            };

            match event {
                Some(ProviderEvent::Position(_)) => summary.positions += 1,
                Some(ProviderEvent::Heading(_)) => summary.headings += 1,
                None => {
                    debug!("Provider channel closed");
                    break;
                }
            }

            let state = control.state();
            if state != last_state {
                println!(
                    "{} {} → {}",
                    style("control ").green(),
                    last_state,
                    style(state).bold()
                );
                last_state = state;
            }
        }

        control.stop(map)?;
        control.detach(map)?;
        summary.final_state = control.state();
        Ok::<_, CliError>(summary)
    })?;

    Ok(SessionSummary {
        camera_jumps: map.host().jumps().len(),
        marker_moves: map
            .surface()
            .count(|op| matches!(op, SurfaceOp::SetMarkerPosition(_))),
        ..summary
    })
}

/// Print the end-of-session summary.
pub fn print_summary(summary: &SessionSummary) {
    println!();
    println!("{}", style("Session Summary").bold());
    println!("───────────────");
    print_field("Positions", summary.positions);
    print_field("Headings", summary.headings);
    print_field("Marker moves", summary.marker_moves);
    print_field("Camera jumps", summary.camera_jumps);
    print_field("Final state", summary.final_state);
}
