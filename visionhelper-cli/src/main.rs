// VisionHelper command line interface
// Replays recorded detector output through the analysis pipeline and
// inspects the feedback table

mod replay;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use visionhelper_core::{ConfigSnapshot, LabelCatalog};
use visionhelper_fb::{combo_key, FeedbackTable, DEFAULT_KEY};

#[derive(Parser)]
#[command(name = "visionhelper")]
#[command(about = "Detection-to-feedback pipeline for visually-impaired pedestrians", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Feedback table file (JSON); the built-in table when omitted
    #[arg(long, global = true)]
    table: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a recorded detection script through the pipeline
    Replay {
        /// Script file: JSON array of {"t": ms, "detections": [...]} or {"t": ms, "error": "..."}
        #[arg(long, short)]
        script: PathBuf,

        /// Settings file (JSON, TOML or YAML)
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Label catalog (labels.json)
        #[arg(long, short)]
        labels: Option<PathBuf>,

        /// Viewport width in pixels
        #[arg(long, default_value = "1080")]
        width: u32,

        /// Viewport height in pixels
        #[arg(long, default_value = "1920")]
        height: u32,
    },

    /// Print the feedback table
    Table,

    /// Show the combo key and pattern for a set of class names
    Combo {
        /// Detected class names
        #[arg(required = true)]
        names: Vec<String>,
    },
}

fn load_table(path: Option<&Path>) -> anyhow::Result<Arc<FeedbackTable>> {
    match path {
        Some(path) => {
            let table = FeedbackTable::from_file(path)
                .with_context(|| format!("Failed to load feedback table from {}", path.display()))?;
            Ok(Arc::new(table))
        }
        None => Ok(Arc::new(FeedbackTable::builtin().clone())),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ConfigSnapshot> {
    let snapshot = match path {
        Some(path) => ConfigSnapshot::from_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => ConfigSnapshot::first_boot(),
    };
    let snapshot = snapshot.from_env();
    snapshot
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid settings: {}", e))?;
    Ok(snapshot)
}

fn print_table(table: &FeedbackTable) {
    println!("Feedback table v{} ({} entries)", table.version(), table.len());
    for (key, pattern) in table.entries() {
        println!("{}\t{:?}\t{}", key, pattern.vibration, pattern.tone);
    }
}

fn print_combo(table: &FeedbackTable, names: &[String]) {
    let Some(key) = combo_key(names) else {
        println!("no objects");
        return;
    };
    let pattern = table.resolve(&key);
    let source = if table.contains(&key) { key.as_str() } else { DEFAULT_KEY };
    println!("{}\t{:?}\t{}\t({})", key, pattern.vibration, pattern.tone, source);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let table = load_table(cli.table.as_deref())?;

    match cli.command {
        Commands::Replay {
            script,
            config,
            labels,
            width,
            height,
        } => {
            let snapshot = load_config(config.as_deref())?;
            let catalog = match labels {
                Some(path) => Some(Arc::new(
                    LabelCatalog::from_file(&path)
                        .with_context(|| format!("Failed to load labels from {}", path.display()))?,
                )),
                None => None,
            };
            let script = replay::Script::from_file(&script)?;
            let options = replay::ReplayOptions {
                snapshot,
                table,
                catalog,
                width,
                height,
            };
            for line in replay::run(script, options).await? {
                println!("{}", line);
            }
        }
        Commands::Table => print_table(&table),
        Commands::Combo { names } => print_combo(&table, &names),
    }

    Ok(())
}
