//! compattr - attribute bug/task records to UI components
//!
//! # Input
//! Task JSON (`{componentNameHint?, title, description?, status?, id?}`) or an
//! array of them, from `--input` or stdin.
//!
//! # Output (via stdout)
//! JSON: a detection for `attribute`, an aggregation report for `aggregate`.
//! Logs go to stderr.

use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::Colorize;
use component_attributor::{
    AggregationReport, AliasDictionary, AttributionError, AttributionService, AttributorConfig,
    TaskRef,
};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

// ============================================================================
// CLI
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "compattr", version, about = "Attribute bug/task records to UI components")]
struct Cli {
    /// Alias dictionary JSON
    #[arg(long, global = true)]
    aliases: Option<PathBuf>,

    /// Engine config JSON
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Component-library namespace token
    #[arg(long, global = true)]
    prefix: Option<String>,

    /// Model name for the fallback
    #[arg(long, global = true)]
    model: Option<String>,

    /// Base URL of the model service
    #[arg(long, global = true)]
    model_url: Option<String>,

    /// Ask the model when no pattern matches
    #[arg(long, global = true)]
    use_model: bool,

    /// Worker threads for batches
    #[arg(long, global = true)]
    workers: Option<usize>,

    /// Attribute identical tasks once per batch
    #[arg(long, global = true)]
    memoize: bool,

    /// Run the generic kebab-case strategy last
    #[arg(long, global = true)]
    generic_terms: bool,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Attribute a single task
    Attribute {
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Attribute an array of tasks and bucket them per component
    Aggregate {
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Check whether the model service answers
    Probe,
    /// Show the alias dictionary
    Aliases {
        /// Print the canonical form of one name
        #[arg(long)]
        resolve: Option<String>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportOutput {
    generated_at: String,
    #[serde(flatten)]
    report: AggregationReport,
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        error!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), AttributionError> {
    let config = build_config(&cli)?;
    debug!("Effective config: {:?}", config);

    match &cli.command {
        Command::Attribute { input } => {
            let task: TaskRef = serde_json::from_str(&read_input(input.as_ref())?)?;
            let service = AttributionService::from_config(&config)?;
            let detection = service.attribute_detailed(&task, cli.use_model, None);
            println!("{}", serde_json::to_string(&detection)?);
        }
        Command::Aggregate { input } => {
            let tasks: Vec<TaskRef> = serde_json::from_str(&read_input(input.as_ref())?)?;
            let service = AttributionService::from_config(&config)?;
            let report = service.aggregate(&tasks, cli.use_model, None);
            log_report(&report);
            let output = ReportOutput {
                generated_at: Utc::now().to_rfc3339(),
                report,
            };
            println!("{}", serde_json::to_string(&output)?);
        }
        Command::Probe => {
            let service = AttributionService::from_config(&config)?;
            let available = service.is_model_available(None);
            println!("{}", serde_json::json!({ "available": available }));
        }
        Command::Aliases { resolve } => {
            let dictionary = AliasDictionary::from_config(&config);
            match resolve {
                Some(name) => println!(
                    "{}",
                    serde_json::json!({ "canonical": dictionary.canonical_name_of(name) })
                ),
                None => {
                    let entries: serde_json::Map<String, serde_json::Value> = dictionary
                        .entries()
                        .iter()
                        .map(|e| (e.canonical_name.clone(), serde_json::json!(e.aliases)))
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&entries)?);
                }
            }
        }
    }

    Ok(())
}

/// Defaults, then config file, then environment, then flags
fn build_config(cli: &Cli) -> Result<AttributorConfig, AttributionError> {
    let base = match &cli.config {
        Some(path) => AttributorConfig::from_file(path)?,
        None => AttributorConfig::default(),
    };
    let mut config = base.with_env();

    if let Some(path) = &cli.aliases {
        config.aliases_path = Some(path.clone());
    }
    if let Some(prefix) = &cli.prefix {
        config.reserved_prefix = prefix.clone();
    }
    if let Some(model) = &cli.model {
        config.model.model = model.clone();
    }
    if let Some(url) = &cli.model_url {
        config.model.base_url = url.clone();
    }
    if let Some(workers) = cli.workers {
        config.batch.workers = workers.max(1);
    }
    if cli.memoize {
        config.batch.memoize = true;
    }
    if cli.generic_terms {
        config.generic_terms_fallback = true;
    }

    Ok(config)
}

fn read_input(path: Option<&PathBuf>) -> Result<String, AttributionError> {
    match path {
        Some(path) => fs::read_to_string(path).map_err(|e| AttributionError::InputFile {
            path: path.clone(),
            source: e,
        }),
        None => {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

/// Per-bucket summary on stderr
fn log_report(report: &AggregationReport) {
    info!(
        "{} tasks, {} analyzed, {} attributed",
        report.total_tasks, report.analyzed_tasks, report.attributed_tasks
    );
    for bucket in &report.buckets {
        let active = if bucket.active_count == 0 {
            bucket.active_count.to_string().green()
        } else if bucket.active_count * 2 >= bucket.count {
            bucket.active_count.to_string().red()
        } else {
            bucket.active_count.to_string().yellow()
        };
        info!(
            "{} - {} tasks ({} active, {} completed)",
            bucket.component.bold(),
            bucket.count,
            active,
            bucket.completed_count
        );
    }
}

// ============================================================================
// Tests
// ============================================================================
