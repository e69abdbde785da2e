pub mod diverse;
pub mod run;
pub mod schema;

use crate::config::StrategyName;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "goalsplit")]
#[command(
    author,
    version,
    about = "Decompose PDDL goals into role-consistent subtasks and allocate them to agents"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose/debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decompose one problem and print or write the result JSON
    Run(RunArgs),

    /// Generate differently configured solutions and compare them
    Diverse(DiverseArgs),

    /// Print JSON Schema for config validation
    Schema,
}

#[derive(Parser, Clone)]
pub struct RunArgs {
    /// Path to config file
    #[arg(short, long, default_value = "configs/config.yaml")]
    pub config: PathBuf,

    /// Write the result JSON here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Override clustering.random_seed
    #[arg(long, env = "GOALSPLIT_SEED")]
    pub seed: Option<u64>,

    /// Override clustering.optimization_strategy
    #[arg(long)]
    pub strategy: Option<StrategyName>,

    /// Print the parsed task, agents and capabilities without decomposing
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Parser, Clone)]
pub struct DiverseArgs {
    /// Base config the variants are derived from
    #[arg(short, long, default_value = "configs/config.yaml")]
    pub config: PathBuf,

    /// Number of variants to generate
    #[arg(short, long, default_value_t = 10)]
    pub num_solutions: usize,

    /// Directory for variant configs, results and the analysis
    #[arg(long, default_value = "diverse_solutions")]
    pub output_dir: PathBuf,
}
