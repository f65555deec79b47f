//! appcast CLI application.

// CLI binary needs to output to stdout
#![allow(clippy::print_stdout)]

use appcast::cli::Cli;
use appcast_core::CancellationToken;
use clap::Parser;
use tracing::warn;

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    appcast::init_tracing(cli.log_level());

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            on_signal.cancel();
        }
    });

    let output = appcast::run(&cli, &cancel).await?;
    print!("{output}");
    Ok(())
}
