//! forkline command-line tool
//!
//! Loads a JSON snapshot into memory and runs one engine operation,
//! printing the result as pretty JSON.

use anyhow::Context;
use clap::{Parser, Subcommand};
use forkline_autofork::builtin_templates;
use forkline_changelog::StepDiffMode;
use forkline_core::{ForkEngine, TracingSink, TreeRequest};
use forkline_model::{EngineConfig, InMemoryStore, RecipeId, Snapshot, UserId};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "forkline")]
#[command(version, about = "Recipe fork lineage and outcome prediction")]
struct Cli {
    /// Snapshot file with recipes, trials and profiles (JSON)
    #[arg(short, long)]
    snapshot: Option<PathBuf>,

    /// Engine configuration (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ancestors, root path and descendant tree of a recipe
    Tree {
        /// Recipe id
        id: RecipeId,
        /// Descendant depth (defaults to the configured depth)
        #[arg(long)]
        depth: Option<usize>,
    },
    /// Changelog of a fork against its parent
    Diff {
        /// Fork id
        id: RecipeId,
        /// Align steps by content instead of position
        #[arg(long)]
        aligned: bool,
    },
    /// Cook-trial stats and badges
    Validate {
        /// Recipe id
        id: RecipeId,
    },
    /// Predicted outcome of cooking a recipe
    Predict {
        /// Recipe id
        id: RecipeId,
    },
    /// Forks of a recipe ranked for a user
    Suggest {
        /// Recipe id
        id: RecipeId,
        /// User whose flavor profile drives the ranking
        #[arg(long)]
        user: Option<UserId>,
    },
    /// Apply (or preview) an auto-fork template
    Autofork {
        /// Recipe id
        id: RecipeId,
        /// Template id, e.g. make_vegan
        template: String,
        /// Only list the changes
        #[arg(long)]
        preview: bool,
    },
    /// List built-in auto-fork templates
    Templates,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_path(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn load_snapshot(path: &Path) -> anyhow::Result<Snapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing snapshot {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn,forkline=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Command::Templates = cli.command {
        return print_json(&builtin_templates());
    }

    let config = load_config(cli.config.as_deref())?;
    let snapshot_path = cli
        .snapshot
        .as_deref()
        .context("--snapshot is required for this command")?;
    let store = Arc::new(InMemoryStore::from_snapshot(load_snapshot(snapshot_path)?));
    info!("Loaded {} recipes from {}", store.recipe_count(), snapshot_path.display());

    let engine = ForkEngine::from_store(config, store)?.with_sink(Arc::new(TracingSink));

    match cli.command {
        Command::Tree { id, depth } => {
            let request = TreeRequest {
                max_depth: depth,
                ..TreeRequest::default()
            };
            print_json(&engine.genealogy(id, request).await?)
        }
        Command::Diff { id, aligned } => {
            let engine = if aligned {
                engine.with_step_mode(StepDiffMode::Aligned)
            } else {
                engine
            };
            print_json(&*engine.changelog(id).await?)
        }
        Command::Validate { id } => print_json(&engine.validation(id).await?),
        Command::Predict { id } => print_json(&engine.predict(id).await?),
        Command::Suggest { id, user } => print_json(&engine.suggestions(id, user).await?),
        Command::Autofork { id, template, preview } => {
            if preview {
                print_json(&engine.auto_fork_preview(id, &template).await?)
            } else {
                print_json(&engine.auto_fork_apply(id, &template).await?)
            }
        }
        Command::Templates => Ok(()),
    }
}
