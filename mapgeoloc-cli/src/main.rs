//! mapgeoloc CLI - Command-line interface
//!
//! Drives the geolocation overlay against a headless map so its behavior can
//! be watched without a browser: simulated routes, recorded track replays,
//! and the geo math used to size the accuracy circle.

mod commands;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mapgeoloc::LngLat;

use commands::common::parse_lat_lng;
use commands::config::ConfigCommands;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "mapgeoloc")]
#[command(version, about = "Geolocation overlay for interactive maps", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Walk a straight route and feed it to the overlay
    Simulate {
        /// Route start as LAT,LNG
        #[arg(long, value_parser = parse_lat_lng, allow_hyphen_values = true)]
        from: LngLat,

        /// Route end as LAT,LNG
        #[arg(long, value_parser = parse_lat_lng, allow_hyphen_values = true)]
        to: LngLat,

        /// Distance between samples in meters
        #[arg(long)]
        step: Option<f64>,

        /// Delay between samples in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Stop after this many positions (runs until Ctrl+C otherwise)
        #[arg(long)]
        count: Option<usize>,

        /// Initial map zoom
        #[arg(long)]
        zoom: Option<f64>,

        /// Start with tracking disabled
        #[arg(long)]
        no_track: bool,

        /// Configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Replay a recorded JSON track
    Replay {
        /// JSON array of positions
        file: PathBuf,

        /// Delay between samples in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Initial map zoom
        #[arg(long)]
        zoom: Option<f64>,

        /// Configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Bounding box of a circle around a point
    Bounds {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        /// Radius in meters
        #[arg(long)]
        radius: f64,

        /// Print `[west, south, east, north]` as JSON
        #[arg(long)]
        json: bool,
    },

    /// On-screen radius of an accuracy circle
    PixelRadius {
        /// Accuracy in meters
        #[arg(long)]
        accuracy: f64,

        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long)]
        zoom: f64,

        /// Renderer tile size in pixels (default 512)
        #[arg(long)]
        tile_size: Option<f64>,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn log_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "mapgeoloc=warn",
        1 => "mapgeoloc=debug",
        _ => "mapgeoloc=trace",
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Simulate {
            from,
            to,
            step,
            interval_ms,
            count,
            zoom,
            no_track,
            config,
        } => commands::simulate::run(commands::simulate::SimulateArgs {
            from,
            to,
            step,
            interval_ms,
            count,
            zoom,
            no_track,
            config,
        }),
        Commands::Replay {
            file,
            interval_ms,
            zoom,
            config,
        } => commands::replay::run(commands::replay::ReplayArgs {
            file,
            interval_ms,
            zoom,
            config,
        }),
        Commands::Bounds {
            lat,
            lng,
            radius,
            json,
        } => commands::geo::run_bounds(lat, lng, radius, json),
        Commands::PixelRadius {
            accuracy,
            lat,
            zoom,
            tile_size,
        } => commands::geo::run_pixel_radius(accuracy, lat, zoom, tile_size),
        Commands::Config { command } => commands::config::run(command),
    }
}

fn main() {
    let cli = Cli::parse();
    mapgeoloc::logging::init_logging(log_directive(cli.verbose));

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_simulate() {
        let cli = Cli::try_parse_from([
            "mapgeoloc",
            "simulate",
            "--from",
            "43.608749,3.883528",
            "--to",
            "43.609040,3.881970",
            "--count",
            "5",
            "-v",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Simulate {
                from, count, no_track, ..
            } => {
                assert_eq!(from, LngLat::new(3.883528, 43.608749));
                assert_eq!(count, Some(5));
                assert!(!no_track);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "mapgeoloc",
            "bounds",
            "--lat",
            "-33.86",
            "--lng",
            "151.2",
            "--radius",
            "100",
        ])
        .unwrap();

        assert!(matches!(cli.command, Commands::Bounds { lat, .. } if lat == -33.86));
    }

    #[test]
    fn test_rejects_malformed_point() {
        let result = Cli::try_parse_from([
            "mapgeoloc",
            "simulate",
            "--from",
            "43.6",
            "--to",
            "43.6,3.8",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_log_directive() {
        assert_eq!(log_directive(0), "mapgeoloc=warn");
        assert_eq!(log_directive(2), "mapgeoloc=trace");
        assert_eq!(log_directive(9), "mapgeoloc=trace");
    }
}
