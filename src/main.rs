use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

use customer_cleaner::config::CleanerConfig;
use customer_cleaner::constants;
use customer_cleaner::csv_io;
use customer_cleaner::logging;
use customer_cleaner::pipeline::steps::column_names::normalize_column_name;
use customer_cleaner::pipeline::CleaningPipeline;

#[derive(Parser)]
#[command(name = "customer-cleaner")]
#[command(about = "Normalize and clean a tabular customer dataset")]
#[command(version = "0.1.0")]
struct Cli {
    /// TOML config file (CLEANER_* environment variables override it)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full cleaning pipeline over a CSV file
    Clean {
        /// CSV file to clean
        #[arg(long)]
        input: Option<PathBuf>,
        /// Where to write the cleaned CSV (default: <input>_clean.csv)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Write a JSON report of every step to this path
        #[arg(long)]
        report: Option<PathBuf>,
        /// Field delimiter
        #[arg(long)]
        delimiter: Option<String>,
    },
    /// Show columns, inferred types and missing counts without cleaning
    Inspect {
        /// CSV file to inspect
        #[arg(long)]
        input: Option<PathBuf>,
        /// Field delimiter
        #[arg(long)]
        delimiter: Option<String>,
    },
}

fn run_clean(config: &CleanerConfig) -> anyhow::Result<()> {
    let input = config
        .input
        .clone()
        .context("No input file given (use --input or CLEANER_INPUT)")?;
    let delimiter = config.delimiter_byte()?;

    let mut table = csv_io::load_csv(&input, delimiter)
        .with_context(|| format!("Failed to load {}", input.display()))?;

    let report = CleaningPipeline::new().run(&mut table)?;

    let output = config.output_path(&input);
    csv_io::save_csv(&table, &output, delimiter)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    if let Some(report_path) = &config.report {
        report
            .write_json(report_path)
            .with_context(|| format!("Failed to write report {}", report_path.display()))?;
        info!("📝 Report written to {}", report_path.display());
    }
    Ok(())
}

fn run_inspect(config: &CleanerConfig) -> anyhow::Result<()> {
    let input = config
        .input
        .clone()
        .context("No input file given (use --input or CLEANER_INPUT)")?;
    let table = csv_io::load_csv(&input, config.delimiter_byte()?)
        .with_context(|| format!("Failed to load {}", input.display()))?;

    println!("📋 {}: {} rows, {} columns", input.display(), table.height(), table.width());
    for name in table.column_names() {
        println!(
            "   {:<32} {:<8} {} missing",
            name,
            table.column_kind(name)?,
            table.missing_count(name)?
        );
    }

    let normalized: Vec<String> = table
        .column_names()
        .into_iter()
        .map(normalize_column_name)
        .collect();
    for required in constants::required_columns() {
        if !normalized.iter().any(|name| name == required) {
            warn!("Required column '{}' is missing", required);
            println!("⚠️  Missing required column: {}", required);
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let mut config = CleanerConfig::load(cli.config.as_deref())?;

    let _guard = logging::init_logging(&config.log_dir);

    match cli.command {
        Commands::Clean {
            input,
            output,
            report,
            delimiter,
        } => {
            config.input = input.or(config.input);
            config.output = output.or(config.output);
            config.report = report.or(config.report);
            if let Some(delimiter) = delimiter {
                config.delimiter = delimiter;
            }
            run_clean(&config)
        }
        Commands::Inspect { input, delimiter } => {
            config.input = input.or(config.input);
            if let Some(delimiter) = delimiter {
                config.delimiter = delimiter;
            }
            run_inspect(&config)
        }
    }
}
