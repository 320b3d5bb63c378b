use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "vco",
    about = "Exercise the version-control object table and packing graph",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fill an object pool with synthetic digests and report probe lengths
    TablePerf(TablePerfArgs),
    /// Build a packing graph of delta chains and report depths and spills
    PackGraph(PackGraphArgs),
}

#[derive(Args)]
pub struct TablePerfArgs {
    /// Number of distinct digests to insert
    #[arg(short = 'n', long, default_value = "100000")]
    pub count: u32,
    /// Lookup passes over every digest after insertion
    #[arg(short, long, default_value = "3")]
    pub rounds: u32,
    /// Pool configuration (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct PackGraphArgs {
    /// Number of objects in the graph
    #[arg(short = 'n', long, default_value = "10000")]
    pub objects: usize,
    /// Objects per delta chain
    #[arg(short, long, default_value = "10")]
    pub chain: usize,
    /// Width of the inline size field
    #[arg(long)]
    pub size_bits: Option<u32>,
    /// Packing configuration (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,
}
