//! Configuration CLI commands.
//!
//! Provides `config show`, `config init` and `config path`.

use std::path::PathBuf;

use clap::Subcommand;
use mapgeoloc::config::{config_file_path, ConfigFile};

use super::common::load_config;
use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration as INI
    Show {
        /// Read this file instead of the default location
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Show { config } => run_show(config),
        ConfigCommands::Init { force } => run_init(force),
        ConfigCommands::Path => run_path(),
    }
}

fn run_show(path: Option<PathBuf>) -> Result<(), CliError> {
    let config = load_config(path.as_deref())?;
    print!("{}", config.to_ini_string());
    Ok(())
}

fn run_init(force: bool) -> Result<(), CliError> {
    let path = default_path()?;
    if path.exists() && !force {
        return Err(CliError::Config(format!(
            "{} already exists. Use --force to overwrite it.",
            path.display()
        )));
    }

    ConfigFile::default().save_to(&path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

fn run_path() -> Result<(), CliError> {
    let path = default_path()?;
    println!("{}", path.display());
    Ok(())
}

fn default_path() -> Result<PathBuf, CliError> {
    config_file_path()
        .ok_or_else(|| CliError::Config("No configuration directory on this platform".to_string()))
}
