//! democast CLI: scripted browser demo recordings.
//!
//! Usage:
//!   democast record <SCENARIO>     Record, compose, and encode a scenario
//!   democast validate <SCENARIO>   Check a scenario without recording
//!   democast init [PATH]           Write a starter scenario
//!   democast check                 Report encoder and driver availability

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use democast_common::config::AppConfig;
use democast_model::OutputFormat;

mod commands;

#[derive(Parser)]
#[command(
    name = "democast",
    about = "Record polished demo GIFs and videos from scripted browser sessions",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a scenario and encode the result
    Record {
        /// Path to the scenario JSON file
        scenario: PathBuf,

        /// Output directory (overrides the scenario's outputDir)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: gif, mp4, webm, png-sequence
        #[arg(long)]
        format: Option<OutputFormat>,

        /// Disable every visual effect
        #[arg(long)]
        no_effects: bool,

        /// Automation driver command line (overrides the configured driver)
        #[arg(long)]
        driver: Option<String>,

        /// Run against the built-in simulated page instead of a browser
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate a scenario file
    Validate {
        /// Path to the scenario JSON file
        scenario: PathBuf,
    },

    /// Write a starter scenario
    Init {
        /// Where to write the scenario
        #[arg(default_value = "democast.json")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Check encoder and driver availability
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load();
    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    logging.json |= cli.json_logs;
    democast_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Record {
            scenario,
            output,
            format,
            no_effects,
            driver,
            dry_run,
        } => {
            commands::record::run(
                commands::record::RecordArgs {
                    scenario,
                    output,
                    format,
                    no_effects,
                    driver,
                    dry_run,
                },
                &config,
            )
            .await
        }
        Commands::Validate { scenario } => commands::validate::run(scenario),
        Commands::Init { path, force } => commands::init::run(path, force),
        Commands::Check => commands::check::run(&config),
    }
}
