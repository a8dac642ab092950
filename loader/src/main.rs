//! sfload CLI - Load CSV test fixtures into a Salesforce org
//!
//! # Main Command
//!
//! ```bash
//! sfload                           # Load test-data/ into the default org
//! sfload load --org my-sandbox     # Target a specific org
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! sfload parse test-data/Products.csv        # Just parse CSV to JSON
//! sfload sort test-data/Asset_Categories.csv # Show hierarchy-sorted CSV
//! ```

use clap::{Parser, Subcommand};
use sfload::progress::{log_error, log_info};
use sfload::{
    pipeline, serialize, sort_by_hierarchy, LoadOptions, TempWorkspace, DATA_DIR, TEMP_DIR,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "sfload")]
#[command(about = "Load CSV test fixtures into a Salesforce org via the sf CLI", long_about = None)]
struct Cli {
    /// Bare `sfload` runs the full load with defaults.
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load every configured dataset into the org
    Load {
        /// Directory containing the source CSV fixtures
        #[arg(long, default_value = DATA_DIR)]
        data_dir: PathBuf,

        /// Directory for staged batch files (removed afterwards)
        #[arg(long, default_value = TEMP_DIR)]
        temp_dir: PathBuf,

        /// Org username/alias (default: discovered via `sf org list`)
        #[arg(short, long)]
        org: Option<String>,
    },

    /// Parse a CSV file and output JSON
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Hierarchy-sort a CSV file and output the reordered CSV
    Sort {
        /// Input CSV file
        input: PathBuf,

        /// Parent-reference column
        #[arg(long, default_value = "Parent_Category__c")]
        parent_field: String,

        /// External-id column
        #[arg(long, default_value = "External_Id__c")]
        id_field: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        None => cmd_load(LoadOptions::default()).await,
        Some(Commands::Load {
            data_dir,
            temp_dir,
            org,
        }) => {
            cmd_load(LoadOptions {
                data_dir,
                temp_dir,
                org,
            })
            .await
        }
        Some(Commands::Parse { input, output }) => run_fallible(cmd_parse(&input, output.as_deref())),
        Some(Commands::Sort {
            input,
            parent_field,
            id_field,
            output,
        }) => run_fallible(cmd_sort(&input, &parent_field, &id_field, output.as_deref())),
    }
}

async fn cmd_load(options: LoadOptions) -> ExitCode {
    log_info("🎯 Starting test data load...\n");

    let mut workspace = TempWorkspace::new(&options.temp_dir);

    let exit = tokio::select! {
        report = pipeline::run_in(&options, &workspace) => {
            log_info(format!("\n{}", "=".repeat(50)));
            if report.all_successful() {
                log_info("🎉 All data loaded successfully!");
                ExitCode::SUCCESS
            } else {
                log_info(format!(
                    "💥 Some data loads failed: {}. Check the output above for details.",
                    report.failed_names().join(", ")
                ));
                ExitCode::FAILURE
            }
        }
        _ = shutdown_signal() => {
            log_info("\n🛑 Interrupted. Cleaning up...");
            ExitCode::FAILURE
        }
    };

    workspace.cleanup();
    exit
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(_) => return std::future::pending().await,
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn run_fallible(result: Result<(), Box<dyn std::error::Error>>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log_error(e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn cmd_parse(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    log_info(format!("📖 Reading {}...", input.display()));

    let table = sfload::parse_file(input)?;
    log_info(format!("   Found {} records", table.len()));

    let json = serde_json::to_string_pretty(&table.to_json())?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_sort(
    input: &Path,
    parent_field: &str,
    id_field: &str,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    log_info(format!("📖 Reading {}...", input.display()));

    let mut table = sfload::parse_file(input)?;
    log_info(format!("   Found {} records", table.len()));

    table.records = sort_by_hierarchy(table.records, parent_field, id_field);

    match serialize(&table) {
        Some(csv) => write_output(&csv, output)?,
        None => log_info("   Nothing to sort: no records"),
    }

    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            std::fs::write(p, content)?;
            log_info(format!("💾 Output written to: {}", p.display()));
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
