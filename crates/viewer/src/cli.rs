use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "proofviz",
    about = "Streams a proof dependency analysis into a radial graph and snapshots it as SVG",
    version
)]
pub struct Cli {
    /// KDL file with layout and viewport settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Replay a recorded stream of JSON messages, one per line
    Replay {
        /// Input file, or `-` for stdin
        #[arg(default_value = "-")]
        input: PathBuf,
        #[command(flatten)]
        render: RenderArgs,
    },
    /// Run a synthetic analysis
    Demo {
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Deepest level that is still announced
        #[arg(long, default_value_t = 5)]
        depth: usize,
        #[arg(long = "max-nodes", default_value_t = 120)]
        max_nodes: usize,
        #[arg(long = "delay-ms", default_value_t = 0)]
        delay_ms: u64,
        /// Also write the generated messages to this file
        #[arg(long)]
        emit: Option<PathBuf>,
        #[command(flatten)]
        render: RenderArgs,
    },
}

#[derive(Args)]
pub struct RenderArgs {
    #[arg(long, short, default_value = "proofviz.svg")]
    pub output: PathBuf,
    /// Node id to select before the snapshot is taken
    #[arg(long)]
    pub select: Option<String>,
    #[arg(long)]
    pub width: Option<f64>,
    #[arg(long)]
    pub height: Option<f64>,
}
