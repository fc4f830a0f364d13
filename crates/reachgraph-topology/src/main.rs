//! CLI entry point for the topology reachability compiler.
//!
//! Reads a topology JSON document (`machines`, `routers`, `links`) and writes
//! the solver fact document in a single write.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use reachgraph_core::{ReachgraphConfig, Topology};
use reachgraph_topology::TopologyCompiler;

#[derive(Parser)]
#[command(name = "reachgraph-compile")]
#[command(about = "Compile a network topology into reachability facts")]
struct Cli {
    /// Topology JSON file (default: stdin).
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Fact output file (default: stdout).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Override the attack goal, e.g. `execCode(db,root)`.
    #[arg(long)]
    goal: Option<String>,

    /// Config file prefix (default: reachgraph).
    #[arg(short, long, default_value = "reachgraph")]
    config: String,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = ReachgraphConfig::load(&cli.config)?;

    let input = match &cli.input {
        Some(path) => std::fs::read_to_string(path)?,
        None => std::io::read_to_string(std::io::stdin())?,
    };
    let topology = Topology::from_json(&input)?;

    let mut compiler = TopologyCompiler::from_config(&config.compile);
    if let Some(goal) = &cli.goal {
        compiler = compiler.with_attack_goal(goal);
    }
    let facts = compiler.compile(&topology)?;

    match &cli.output {
        Some(path) => {
            std::fs::write(path, facts.to_string())?;
            tracing::info!(path = %path.display(), facts = facts.len(), "Wrote fact document");
        }
        None => print!("{facts}"),
    }

    Ok(())
}
