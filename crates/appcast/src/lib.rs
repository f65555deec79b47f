//! appcast command line library.
//!
//! The binary is a thin wrapper around [`run`]: it parses [`cli::Cli`],
//! installs logging and cancels the run on Ctrl-C.

pub mod cli;
pub mod commands;

use appcast_core::{CancellationToken, SourceRegistry, TargetRegistry};
use appcast_pipe::{Assembler, PipeError};
use appcast_secrets::{SecretError, SecretStore};
use cli::{Cli, Commands, RSA_KEY_ENV};
use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

/// Errors surfaced to the user by the CLI.
#[derive(Error, Debug, Diagnostic)]
pub enum AppError {
    /// The configuration file could not be read.
    #[error("Failed to read config file {}", path.display())]
    #[diagnostic(
        code(appcast::config_read),
        help("Pass a different file with --config")
    )]
    ReadConfig {
        /// Config file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A secret could not be loaded.
    #[error(transparent)]
    #[diagnostic(code(appcast::secret))]
    Secret(#[from] SecretError),

    /// Assembly failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Pipe(#[from] PipeError),

    /// A provider call failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Provider(#[from] appcast_core::Error),
}

/// Registries holding every backend compiled into this binary.
#[must_use]
pub fn registries() -> (SourceRegistry, TargetRegistry) {
    let mut sources = SourceRegistry::sources();
    let mut targets = TargetRegistry::targets();

    appcast_local::register(&mut sources, &mut targets);
    #[cfg(feature = "gitlab")]
    appcast_gitlab::register(&mut sources);

    debug!(sources = ?sources.kinds(), targets = ?targets.kinds(), "Registered backends");
    (sources, targets)
}

/// Fill a secret store from the command line and environment.
///
/// `--rsa-key` wins over `APPCAST_RSA_KEY`. A missing key is not an error
/// here; integrations that need it report it during assembly.
///
/// # Errors
///
/// Returns `SecretError::Read` if `--rsa-key` names an unreadable file.
pub fn load_secrets(cli: &Cli) -> Result<SecretStore, SecretError> {
    let store = SecretStore::new();
    match &cli.rsa_key {
        Some(path) => store.load_file(appcast_pipe::apk::RSA_KEY_SECRET, path)?,
        None => {
            if let Err(err) = store.load_env(appcast_pipe::apk::RSA_KEY_SECRET, RSA_KEY_ENV) {
                debug!(error = %err, "No signing key in environment");
            }
        }
    }
    Ok(store)
}

/// Install the tracing subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence over `default_level`.
pub fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Execute the parsed command and return what should be printed.
///
/// # Errors
///
/// Returns an [`AppError`] for unreadable or invalid configuration, missing
/// or invalid secrets, and failed provider calls.
pub async fn run(cli: &Cli, cancel: &CancellationToken) -> Result<String, AppError> {
    let text = tokio::fs::read_to_string(&cli.config)
        .await
        .map_err(|source| AppError::ReadConfig {
            path: cli.config.clone(),
            source,
        })?;
    let config = appcast_pipe::load_config(&text)?;

    let (sources, targets) = registries();
    let secrets = load_secrets(cli)?;
    let assembler = Assembler::new(&sources, &targets, &secrets);

    match cli.command {
        Commands::Check => {
            let pipe = assembler.assemble(&config)?;
            Ok(commands::describe_pipe(&pipe))
        }
        Commands::Releases => {
            let source = assembler.source(&config)?;
            let listing = source.list_releases(cancel).await?;
            Ok(commands::describe_releases(&listing))
        }
    }
}
