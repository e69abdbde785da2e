use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;
mod config;
mod error;
mod multiagent;
mod output;
mod pddl;
mod planning;
mod runner;

use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Only show debug logs with --verbose
    let filter = if cli.verbose {
        EnvFilter::new("goalsplit=debug")
    } else {
        EnvFilter::new("goalsplit=warn")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run(args) => cli::run::execute(args),
        Commands::Diverse(args) => cli::diverse::execute(args),
        Commands::Schema => cli::schema::execute(),
    }
}
