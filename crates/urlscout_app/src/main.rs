//! `urlscout`: fetch every bracketed URL in a text once, one request at a time.

mod cli;
mod driver;
mod effects;
mod logging;

use clap::Parser;
use engine_logging::engine_info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before parsing so env-backed flags see it.
    let _ = dotenvy::dotenv();
    let cli = cli::Cli::parse();

    logging::initialize(
        cli.log_destination(),
        engine_logging::level_for_verbosity(cli.verbose),
    );

    let summary = driver::run(&cli).await?;
    engine_info!(
        "done: {} candidates, {} unique, {} fetched, {} failed",
        summary.intake.candidates,
        summary.intake.admitted,
        summary.queue.succeeded,
        summary.queue.failed
    );
    Ok(())
}
