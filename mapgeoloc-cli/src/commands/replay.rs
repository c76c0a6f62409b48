//! Replay command - play a recorded JSON track through the overlay.

use std::path::PathBuf;
use std::time::Duration;

use mapgeoloc::{ReplayError, ReplayProvider, MIN_PROVIDER_INTERVAL};

use super::common::{headless_session_map, load_config, print_field, DEFAULT_START_ZOOM};
use super::session::{self, print_notifications, print_summary};
use crate::error::CliError;

/// Arguments for the replay command.
pub struct ReplayArgs {
    pub file: PathBuf,
    pub interval_ms: Option<u64>,
    pub zoom: Option<f64>,
    pub config: Option<PathBuf>,
}

/// Run the replay command.
pub fn run(args: ReplayArgs) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;

    let mut replay = ReplayProvider::from_path(&args.file)?;
    let interval = playback_interval(args.interval_ms, config.simulation.interval);
    replay = replay.with_interval(interval);

    let samples = replay.samples().len();
    let first = replay
        .samples()
        .first()
        .map(|sample| sample.position.lng_lat())
        .ok_or(ReplayError::Empty)?;

    println!("mapgeoloc Track Replay v{}", mapgeoloc::VERSION);
    println!("===========================");
    println!();
    print_field("File", args.file.display());
    print_field("Samples", samples);
    print_field("Interval", format!("{} ms", interval.as_millis()));
    print_field("Auto-zoom", config.layer.auto_zoom.as_str());
    println!();

    let mut map = headless_session_map(
        first,
        args.zoom.unwrap_or(DEFAULT_START_ZOOM),
        config.layer.clone(),
    )?;
    print_notifications(&mut map);

    // The track plays once; stop after its last position
    let summary = session::run(&mut map, Box::new(replay), Some(samples))?;
    print_summary(&summary);
    Ok(())
}

/// `--interval-ms` if given, else the configured interval. Never zero.
fn playback_interval(flag_ms: Option<u64>, configured: Duration) -> Duration {
    flag_ms
        .map(Duration::from_millis)
        .unwrap_or(configured)
        .max(MIN_PROVIDER_INTERVAL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playback_interval_prefers_flag() {
        let configured = Duration::from_millis(300);
        assert_eq!(
            playback_interval(Some(50), configured),
            Duration::from_millis(50)
        );
        assert_eq!(playback_interval(None, configured), configured);
    }

    #[test]
    fn test_playback_interval_is_never_zero() {
        assert_eq!(
            playback_interval(Some(0), Duration::from_millis(300)),
            MIN_PROVIDER_INTERVAL
        );
        assert_eq!(
            playback_interval(None, Duration::ZERO),
            MIN_PROVIDER_INTERVAL
        );
    }
}
