//! LAB CLI: run the LUYS AntiBenchmark against reference behavior models.

mod commands;
mod report;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// LUYS AntiBenchmark: certify model behavior under uncertainty
#[derive(Parser, Debug)]
#[command(name = "lab", version, about, long_about = None)]
pub(crate) struct Cli {
    /// Workspace directory
    #[arg(short, long, default_value = ".", global = true)]
    workspace: PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by commands that evaluate a dataset.
#[derive(clap::Args, Debug, Clone)]
pub(crate) struct EvalArgs {
    /// Domain to evaluate (medicine, legal, finance, engineering, journalism)
    #[arg(short, long)]
    pub domain: Option<String>,

    /// Dataset file (JSON array or JSON lines); the bundled sample if omitted
    #[arg(long)]
    pub dataset: Option<PathBuf>,

    /// Thresholds file (TOML, keyed by domain)
    #[arg(short, long)]
    pub thresholds: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
pub(crate) enum Commands {
    /// Evaluate one reference model and print its certification
    Run {
        #[command(flatten)]
        eval: EvalArgs,

        /// Model behavior to simulate
        #[arg(short, long, value_enum, default_value_t = ModelKind::Honest)]
        mode: ModelKind,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Evaluate the honest and sultan models side by side
    Compare {
        #[command(flatten)]
        eval: EvalArgs,
    },
    /// Print the resolved thresholds for a domain
    Thresholds {
        /// Domain to resolve
        #[arg(short, long)]
        domain: Option<String>,

        /// Thresholds file (TOML, keyed by domain)
        #[arg(short, long)]
        thresholds: Option<PathBuf>,
    },
    /// Score a co-thinking session log (JSON array of steps)
    Ctm {
        /// Path to the session log
        session: PathBuf,
    },
    /// Compute the REN2 resonance composite
    Ren2 {
        #[arg(long)]
        novelty: f64,
        #[arg(long)]
        fidelity: f64,
        #[arg(long)]
        helpfulness: f64,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ModelKind {
    Honest,
    Sultan,
}

#[derive(clap::Subcommand, Debug)]
pub(crate) enum ConfigAction {
    /// Create a default workspace configuration file
    Init,
    /// Show the effective configuration
    Show,
}

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // Human-readable layer for stderr (always active)
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(filter));

    // JSON file layer for structured logging
    let log_dir = directories::ProjectDirs::from("dev", "luys", "lab")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "lab.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let passed = commands::handle_command(cli.command, &workspace)?;
    if !passed {
        // Flush the file log before exiting with a failing status.
        drop(guard);
        std::process::exit(1);
    }
    Ok(())
}
