//! Command line definition.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Environment variable holding the signing key itself (not a path).
pub const RSA_KEY_ENV: &str = "APPCAST_RSA_KEY";

/// Main CLI entry point for appcast.
///
/// Reads a release source, wires packaging integrations and publishes them
/// to a target.
#[derive(Parser, Debug)]
#[command(name = "appcast")]
#[command(about = "Publish release artifacts to package manager repositories")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file.
    #[arg(
        short,
        long,
        global = true,
        env = "APPCAST_CONFIG",
        default_value = "appcast.yml",
        value_name = "FILE"
    )]
    pub config: PathBuf,

    /// File containing the RSA private key used to sign repositories.
    ///
    /// Falls back to the key text in `APPCAST_RSA_KEY`.
    #[arg(long, global = true, value_name = "FILE")]
    pub rsa_key: Option<PathBuf>,

    /// Increase log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Validate the configuration and show the assembled pipe.
    Check,

    /// List releases of the configured source.
    Releases,
}

impl Cli {
    /// Default log filter for the requested verbosity.
    #[must_use]
    pub const fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
