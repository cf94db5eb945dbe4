use clap::{Parser, Subcommand};
use chainrt::dsl::loader::load_document;
use chainrt::{BlockRegistry, Node, Transition, Value};
use std::path::PathBuf;
use anyhow::{Context as AnyhowContext, Result};
use serde_json::json;
use tracing::{error, info, Level};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log at DEBUG level
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a chain document and tick it until every chain is done
    Run {
        /// Path to the chain document (YAML or JSON)
        #[arg(long, short)]
        file: PathBuf,

        /// Global variables (key=value), override the document's
        #[arg(long, short = 'D', value_parser = parse_key_val)]
        vars: Vec<(String, serde_json::Value)>,

        /// Stop after this many ticks
        #[arg(long)]
        max_ticks: Option<u64>,

        /// Milliseconds between ticks
        #[arg(long)]
        interval_ms: Option<u64>,
    },

    /// Load and type-check a chain document without running it
    Check {
        #[arg(long, short)]
        file: PathBuf,
    },

    /// List the registered block kinds
    Blocks,
}

fn parse_key_val(s: &str) -> Result<(String, serde_json::Value), String> {
    let pos = s.find('=').ok_or_else(|| format!("invalid KEY=value: no `=` found in `{}`", s))?;
    let key = s[..pos].to_string();
    let val_str = &s[pos + 1..];
    let val = serde_json::from_str(val_str).unwrap_or_else(|_| serde_json::Value::String(val_str.to_string()));
    Ok((key, val))
}

fn report(node: &Node, transitions: &[Transition]) -> serde_json::Value {
    let chains: Vec<_> = node
        .chains()
        .iter()
        .map(|chain| {
            json!({
                "name": chain.name(),
                "id": chain.id(),
                "state": chain.state(),
                "cursor": chain.cursor(),
                "output": chain.output().to_json().unwrap_or_else(|_| json!(chain.output().to_string())),
                "error": chain.error().map(|e| e.to_string()),
            })
        })
        .collect();
    json!({
        "node": node.id(),
        "ticks": node.ticks(),
        "transitions": transitions,
        "chains": chains,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).with_writer(std::io::stderr).init();

    let registry = BlockRegistry::global();
    registry.seal();

    match cli.command {
        Commands::Run { file, vars, max_ticks, interval_ms } => {
            let document = load_document(&file)?;
            let mut node = Node::from_document(&document, registry)
                .with_context(|| format!("Failed to load chains from {}", file.display()))?;
            for (key, value) in vars {
                node.set_variable(&key, Value::from(value));
            }

            let mut config = document.node.clone();
            if let Some(max) = max_ticks {
                config = config.with_max_ticks(max);
            }
            if let Some(ms) = interval_ms {
                config = config.with_interval_ms(ms);
            }

            info!(chains = node.chains().len(), "Running {}", file.display());
            let mut transitions = tokio::select! {
                transitions = node.run(&config) => transitions,
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted");
                    Vec::new()
                }
            };
            transitions.extend(node.shutdown());

            println!("{}", serde_json::to_string_pretty(&report(&node, &transitions))?);
        }

        Commands::Check { file } => {
            let document = load_document(&file)?;
            match Node::from_document(&document, registry) {
                Ok(node) => {
                    for chain in node.chains() {
                        println!("{}: {}", chain.name(), chain.block_names().join(" -> "));
                    }
                    info!("{} is valid", file.display());
                }
                Err(e) => {
                    error!("{} is invalid: {}", file.display(), e);
                    return Err(e.into());
                }
            }
        }

        Commands::Blocks => {
            for name in registry.names() {
                let descriptor = registry.lookup(&name)?;
                println!("{}  ({} -> {})  {}", descriptor.name, descriptor.input, descriptor.output, descriptor.help);
                for param in &descriptor.params {
                    let required = if param.required { " (required)" } else { "" };
                    println!("    {}: {}{}  {}", param.name, param.types, required, param.help);
                }
            }
        }
    }

    Ok(())
}
