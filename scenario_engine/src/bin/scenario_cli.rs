use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use scenario_engine::{
    seed_repository, EngineConfig, ErrorKind, GraphWalker, HistoryProjector, InMemoryRepository,
    RecordingXpLedger, StepResult, SystemClock,
};
use scenario_rules::{GraphId, ScenarioCatalog, ScenarioNode, UserId};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scenario-cli", about = "Validate scenario catalogs and play scenarios locally")]
struct Cli {
    /// Catalog TOML to load instead of the built-in one.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Engine config TOML.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a catalog and print a line per scenario.
    Validate,
    /// Walk one scenario interactively.
    Play {
        #[arg(long)]
        scenario: String,
        #[arg(long, default_value = "local-user")]
        user: String,
    },
}

fn load_catalog(path: Option<&PathBuf>) -> Result<ScenarioCatalog> {
    match path {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("reading catalog {}", path.display()))?;
            ScenarioCatalog::from_toml_str(&source)
                .with_context(|| format!("loading catalog {}", path.display()))
        }
        None => ScenarioCatalog::builtin().context("loading built-in catalog"),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig> {
    match path {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            EngineConfig::from_toml_str(&source)
                .with_context(|| format!("loading config {}", path.display()))
        }
        None => Ok(EngineConfig::default()),
    }
}

fn validate(catalog: &ScenarioCatalog) {
    for graph in catalog.iter() {
        println!(
            "{:<24} {:<16} {:>3} nodes  max score {:>4}  {}",
            graph.id.as_str(),
            graph.category,
            graph.node_count(),
            graph.max_possible_score(),
            if graph.active { "" } else { "(inactive)" }
        );
    }
    println!("{} scenario(s) OK", catalog.len());
}

fn show_node(node: &ScenarioNode) {
    println!("\n{}", node.prompt);
    for (index, choice) in node.choices.iter().enumerate() {
        println!("  [{}] {}", index + 1, choice.text);
    }
}

fn play(catalog: &ScenarioCatalog, config: EngineConfig, scenario: &str, user: &str) -> Result<()> {
    let repo = InMemoryRepository::new();
    seed_repository(&repo, catalog)?;

    let ledger = RecordingXpLedger::new();
    let walker = GraphWalker::new(&repo, &ledger, SystemClock, config.clone());
    let user = UserId::new(user);

    let started = walker.start_run(&GraphId::new(scenario), &user)?;
    println!("=== {} ===\n{}", started.graph.title, started.graph.description);
    show_node(&started.current_node);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            bail!("input closed before the scenario finished");
        };
        let line = line?;

        let index = match line.trim().parse::<usize>() {
            Ok(n) if n >= 1 => n - 1,
            _ => {
                println!("Enter the number of a choice.");
                continue;
            }
        };

        match walker.submit_choice(started.progress_id, &user, index) {
            Ok(StepResult::Continued(step)) => {
                println!("{}", serde_json::to_string_pretty(&step)?);
                show_node(&step.current_node);
            }
            Ok(StepResult::Completed(summary)) => {
                println!("{}", serde_json::to_string_pretty(&summary)?);
                break;
            }
            Err(e) if e.is_retryable() || e.kind() == ErrorKind::Validation => println!("{}", e),
            Err(e) => return Err(e.into()),
        }
    }

    let history = HistoryProjector::new(&repo, config).list_completed_runs(&user, 0)?;
    info!(runs = history.len(), xp = ledger.total_for(&user), "session finished");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let catalog = load_catalog(cli.catalog.as_ref())?;

    match cli.command {
        Command::Validate => validate(&catalog),
        Command::Play { scenario, user } => {
            let config = load_config(cli.config.as_ref())?;
            play(&catalog, config, &scenario, &user)?;
        }
    }

    Ok(())
}
