//! Command-line arguments and logging setup.

use clap::{ArgAction, Parser};
use tracing::Level;

use crate::commands::Command;

#[derive(Debug, Parser)]
#[command(
    name = "locality",
    version,
    about = "Pick topologically nearest nodes from tiered identities"
)]
pub struct CliConfig {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    pub fn run(self) -> anyhow::Result<()> {
        init_tracing(self.verbose);
        let result = self.command.execute()?;
        println!("{}", result);
        Ok(())
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    // Already installed when embedded in tests.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}
