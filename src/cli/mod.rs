//! Command-line interface.
//!
//! Values given on the command line override the loaded configuration.

use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;

/// Renames TV episode files using metadata from TVmaze
#[derive(Debug, Parser)]
#[command(name = "renamarr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Files or directories to rename
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Show debug output
    #[arg(short, long)]
    pub verbose: bool,

    /// Also write log output to this file
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Load configuration from this file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Save the effective configuration to this file and exit
    #[arg(short, long, value_name = "FILE")]
    pub save: Option<PathBuf>,

    /// Print the effective configuration and exit
    #[arg(long)]
    pub dump_config: bool,

    /// Rename without asking for confirmation
    #[arg(short, long, overrides_with = "not_batch")]
    pub batch: bool,

    /// Ask before every rename
    #[arg(long)]
    pub not_batch: bool,

    /// Descend into sub-directories
    #[arg(short, long, overrides_with = "not_recursive")]
    pub recursive: bool,

    /// Only look at files directly inside the given directories
    #[arg(long)]
    pub not_recursive: bool,

    /// Use this series name instead of the detected one
    #[arg(long, value_name = "NAME")]
    pub series_name: Option<String>,

    /// Use this TVmaze series id instead of searching by name
    #[arg(long, value_name = "ID")]
    pub series_id: Option<u64>,

    /// Move files to this destination (enables moving)
    #[arg(short = 'd', long, value_name = "DIR")]
    pub move_destination: Option<String>,

    /// Show what would happen without touching any file
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    pub fn apply_to(&self, config: &mut Config) {
        if self.verbose {
            config.general.log_level = "debug".to_string();
        }
        if self.batch {
            config.general.batch = true;
        }
        if self.not_batch {
            config.general.batch = false;
        }
        if self.recursive {
            config.general.recursive = true;
        }
        if self.not_recursive {
            config.general.recursive = false;
        }
        if self.dry_run {
            config.general.dry_run = true;
        }
        if let Some(name) = &self.series_name {
            config.metadata.series_name = Some(name.clone());
        }
        if let Some(id) = self.series_id {
            config.metadata.series_id = Some(id);
        }
        if let Some(destination) = &self.move_destination {
            config.relocation.enable = true;
            config.relocation.destination = destination.clone();
        }
    }
}
