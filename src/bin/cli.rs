//! CLI binary for sift.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use sift::{App, DialoguerPrompter, RefinementCallback, RefinementEvent, SiftConfig};
use sift_search::ResultCache;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// sift: iterative LLM-guided web search with a persistent result cache.
#[derive(Parser)]
#[command(name = "sift", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Search rounds per session (overrides the config file).
    #[arg(short, long)]
    rounds: Option<usize>,

    /// Also write logs to a daily-rotated file in this directory.
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Run a single non-interactive session for this query.
    query: Option<String>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Option<Command>,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Manage the on-disk result cache.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Manage the configuration file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Delete records older than the configured retention.
    Sweep,
    /// Delete every record.
    Clear,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the default config file path.
    Path,
    /// Write a config file with default values.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _log_guard = init_tracing(cli.log_dir.as_deref())?;

    if let Some(Command::Config { action }) = &cli.command {
        return run_config(cli.config.as_deref(), action);
    }

    let mut config = SiftConfig::load_or_default(cli.config.as_deref())
        .context("failed to load configuration")?;
    config.resolve_secrets();
    if let Some(rounds) = cli.rounds {
        config.refinement.max_rounds = rounds;
    }

    match cli.command {
        Some(Command::Cache { action }) => run_cache(&config, action),
        Some(Command::Config { .. }) | None => run_search(&config, cli.query.as_deref()).await,
    }
}

/// Stderr logging filtered by `RUST_LOG`, plus an optional rolling file.
fn init_tracing(log_dir: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = || {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("sift=info,sift_search=info"))
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter());

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create log dir {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "sift.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

async fn run_search(config: &SiftConfig, query: Option<&str>) -> anyhow::Result<()> {
    let app = App::from_config(config, Some(progress_printer()))?;
    let mut prompter = DialoguerPrompter::new();

    match query {
        Some(query) if !query.trim().is_empty() => {
            app.run_once(query, &mut prompter).await?;
        }
        Some(_) => anyhow::bail!("query must not be empty"),
        None => app.run_interactive(&mut prompter).await?,
    }
    Ok(())
}

/// Print round progress the way the interactive loop reads best.
fn progress_printer() -> RefinementCallback {
    Box::new(|event| match event {
        RefinementEvent::RoundStarted {
            round, max_rounds, ..
        } => {
            println!("\nSearch Round {round}/{max_rounds}...");
        }
        RefinementEvent::RoundCompleted {
            outcome,
            new_results,
        } => {
            println!(
                "Found {} results ({new_results} new)",
                outcome.results.len()
            );
        }
        RefinementEvent::NextQuery { query, .. } => {
            println!("Next round query: {query}");
        }
        RefinementEvent::Finished { total_results, .. } => {
            tracing::debug!(total_results, "refinement finished");
        }
    })
}

fn run_cache(config: &SiftConfig, action: CacheAction) -> anyhow::Result<()> {
    let cache = ResultCache::open_without_sweep(&config.cache.dir)?;
    match action {
        CacheAction::Sweep => {
            let removed = cache.sweep(config.cache.max_age())?;
            println!(
                "Removed {removed} expired record(s) from {}",
                cache.dir().display()
            );
        }
        CacheAction::Clear => {
            let removed = cache.clear()?;
            println!("Removed {removed} record(s) from {}", cache.dir().display());
        }
    }
    Ok(())
}

fn run_config(explicit: Option<&Path>, action: &ConfigAction) -> anyhow::Result<()> {
    let path = explicit.map_or_else(SiftConfig::default_config_path, Path::to_path_buf);
    match action {
        ConfigAction::Path => println!("{}", path.display()),
        ConfigAction::Init { force } => {
            if path.exists() && !*force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            SiftConfig::default().save_to_file(&path)?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}
