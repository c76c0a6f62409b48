//! Simulate command - walk a straight route and watch the overlay follow it.

use std::path::PathBuf;
use std::time::Duration;

use mapgeoloc::{LngLat, SimulatorProvider};

use super::common::{headless_session_map, load_config, print_field, DEFAULT_START_ZOOM};
use super::session::{self, print_notifications, print_summary};
use crate::error::CliError;

/// Arguments for the simulate command.
pub struct SimulateArgs {
    pub from: LngLat,
    pub to: LngLat,
    pub step: Option<f64>,
    pub interval_ms: Option<u64>,
    pub count: Option<usize>,
    pub zoom: Option<f64>,
    pub no_track: bool,
    pub config: Option<PathBuf>,
}

/// Run the simulate command.
pub fn run(args: SimulateArgs) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;

    // CLI takes precedence over config
    let mut settings = config.simulation.clone();
    if let Some(step) = args.step {
        if !(step.is_finite() && step > 0.0) {
            return Err(CliError::Config(format!(
                "--step must be a positive distance, got {}",
                step
            )));
        }
        settings.step_m = step;
    }
    if let Some(interval_ms) = args.interval_ms {
        settings.interval = Duration::from_millis(interval_ms.max(1));
    }

    let mut options = config.layer.clone();
    if args.no_track {
        options.track_user_location = false;
    }

    let simulator = SimulatorProvider::new(args.from, args.to, &settings);

    println!("mapgeoloc Route Simulator v{}", mapgeoloc::VERSION);
    println!("===============================");
    println!();
    print_field("From", args.from);
    print_field("To", args.to);
    print_field("Samples", simulator.samples().len());
    print_field("Step", format!("{} m", settings.step_m));
    print_field("Interval", format!("{} ms", settings.interval.as_millis()));
    print_field("Auto-zoom", options.auto_zoom.as_str());
    print_field("Tracking", options.track_user_location);
    println!();
    if args.count.is_none() {
        println!("Press Ctrl+C to stop");
        println!();
    }

    let mut map =
        headless_session_map(args.from, args.zoom.unwrap_or(DEFAULT_START_ZOOM), options)?;
    print_notifications(&mut map);

    let summary = session::run(&mut map, Box::new(simulator), args.count)?;
    print_summary(&summary);
    Ok(())
}
