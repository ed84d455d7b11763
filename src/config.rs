use std::path::PathBuf;

use clap::{Arg, ArgMatches, Command};

/// Snapshot file used when none is configured.
pub const DEFAULT_SNAPSHOT_PATH: &str = "students.snap";

/// Log filter used when none is configured.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Runtime configuration for the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Snapshot restored at startup and written on backup and exit.
    pub snapshot_path: PathBuf,
    /// `tracing` filter directive, e.g. `info` or `studentbase=debug`.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
        }
    }
}

impl Config {
    /// Command line definition.
    pub fn command() -> Command {
        Command::new("studentbase")
            .about("Interactive in-memory student record store")
            .arg(
                Arg::new("snapshot")
                    .long("snapshot")
                    .value_name("PATH")
                    .env("STUDENTBASE_SNAPSHOT")
                    .default_value(DEFAULT_SNAPSHOT_PATH)
                    .help("Snapshot file restored at startup and written on backup/exit"),
            )
            .arg(
                Arg::new("log")
                    .long("log")
                    .value_name("FILTER")
                    .env("STUDENTBASE_LOG")
                    .default_value(DEFAULT_LOG_FILTER)
                    .help("Log filter written to stderr, e.g. info or studentbase=debug"),
            )
    }

    pub fn from_matches(matches: &ArgMatches) -> Self {
        let defaults = Self::default();

        Self {
            snapshot_path: matches
                .get_one::<String>("snapshot")
                .map(PathBuf::from)
                .unwrap_or(defaults.snapshot_path),
            log_filter: matches
                .get_one::<String>("log")
                .cloned()
                .unwrap_or(defaults.log_filter),
        }
    }

    /// Parse the process arguments and environment.
    pub fn from_env() -> Self {
        Self::from_matches(&Self::command().get_matches())
    }
}
