//! Binary crate for the `weather` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - The interactive location menu
//! - Drawing render states to the terminal

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::terminal::{Screen, TrackedWriter};

mod cli;
mod terminal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let screen = Screen::detect();

    // Logs go to stderr. When that is the same tty as stdout, the rows they
    // take are recorded so the next in-place redraw erases them as well.
    let log_rows = screen.log_rows.clone();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(move || TrackedWriter::new(std::io::stderr(), log_rows.clone()))
        .init();

    let cmd = cli::Cli::parse();
    cmd.run(&screen).await
}
