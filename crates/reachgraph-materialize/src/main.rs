//! CLI entry point for the attack graph materializer.
//!
//! `load` replaces the Neo4j graph with solver result tables read from stdin;
//! `build` materializes the attack graph and writes the export JSON to stdout.

use std::collections::BTreeSet;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use reachgraph_core::{ReachgraphConfig, Topology};
use reachgraph_graph::{GraphClient, GraphConfig, MemoryStore, ResultTables};
use reachgraph_materialize::Materializer;

#[derive(Parser)]
#[command(name = "reachgraph-materialize")]
#[command(about = "Materialize attack graphs from the solver's persisted output")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file prefix (default: reachgraph).
    #[arg(short, long, default_value = "reachgraph", global = true)]
    config: String,
}

#[derive(Subcommand)]
enum Command {
    /// Replace the Neo4j graph with result tables (JSON on stdin).
    Load,
    /// Materialize the attack graph and print it as JSON.
    Build {
        /// Read result tables from this JSON file instead of Neo4j.
        #[arg(long)]
        tables: Option<PathBuf>,

        /// Override the configured node limit.
        #[arg(long)]
        max_nodes: Option<usize>,

        /// Topology JSON whose machine names label the exported nodes.
        #[arg(long)]
        topology: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = ReachgraphConfig::load(&cli.config)?;

    match cli.command {
        Command::Load => {
            let input = std::io::read_to_string(std::io::stdin())?;
            let tables = ResultTables::from_json(&input)?;
            let graph = GraphClient::connect(&GraphConfig::from(&config.neo4j)).await?;
            graph.replace_graph(&tables).await?;
        }
        Command::Build {
            tables,
            max_nodes,
            topology,
        } => {
            let mut settings = config.materialize.clone();
            if let Some(limit) = max_nodes {
                settings.max_nodes = limit;
            }

            let attack_graph = match tables {
                Some(path) => {
                    let tables = ResultTables::from_json(&std::fs::read_to_string(path)?)?;
                    let store = MemoryStore::from_tables(&tables)?;
                    Materializer::from_config(&store, &settings).build().await?
                }
                None => {
                    let store = GraphClient::connect(&GraphConfig::from(&config.neo4j)).await?;
                    Materializer::from_config(&store, &settings).build().await?
                }
            };

            let hosts = match topology {
                Some(path) => {
                    let topology = Topology::from_json(&std::fs::read_to_string(path)?)?;
                    Some(
                        topology
                            .machines
                            .into_iter()
                            .map(|m| m.name)
                            .collect::<BTreeSet<String>>(),
                    )
                }
                None => None,
            };

            let export = attack_graph.export_with_hosts(hosts.as_ref());
            println!("{}", serde_json::to_string(&export)?);
        }
    }

    Ok(())
}
