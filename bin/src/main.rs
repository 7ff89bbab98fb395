//! sessionbar CLI - Session-aligned OHLC bars from one-minute futures data.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod display;
mod logging;

use display::Format;

#[derive(Parser)]
#[command(name = "sessionbar")]
#[command(about = "Resample one-minute futures data into session-aligned bars", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress progress and summary output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Configuration file (JSON). Flags override its values.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every source file in a directory
    Run {
        /// Directory of one-minute source files
        input_dir: Option<PathBuf>,

        /// Snapshot output directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Snapshot format
        #[arg(short, long, value_enum)]
        format: Option<Format>,

        /// Source file extension
        #[arg(long)]
        extension: Option<String>,

        /// Bar interval (e.g. 15m, 30m)
        #[arg(short, long)]
        interval: Option<String>,

        /// SQLite store path
        #[arg(long)]
        store: Option<PathBuf>,

        /// Do not write to the store
        #[arg(long)]
        no_store: bool,

        /// Do not write snapshot files
        #[arg(long)]
        no_snapshot: bool,

        /// Fail a file at its first malformed record
        #[arg(long)]
        strict: bool,

        /// Maximum files processed at once
        #[arg(long)]
        parallel: Option<usize>,
    },

    /// Aggregate a single file and write its bars
    Convert {
        /// Source file (symbol is the name prefix before the first underscore)
        input: PathBuf,

        /// Output file path. Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: Format,

        /// Bar interval (e.g. 15m, 30m)
        #[arg(short, long)]
        interval: Option<String>,

        /// Fail at the first malformed record
        #[arg(long)]
        strict: bool,
    },

    /// Show interval boundaries for the configured schedule
    Calendar {
        /// Bar interval (e.g. 15m, 30m)
        #[arg(short, long)]
        interval: Option<String>,

        /// Also list the exact-time rule table
        #[arg(long)]
        rules: bool,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    logging::init(cli.verbose, cli.quiet, cli.log_json);
    let config = commands::load_config(cli.config.as_deref())?;

    match command {
        Commands::Run {
            input_dir,
            output_dir,
            format,
            extension,
            interval,
            store,
            no_store,
            no_snapshot,
            strict,
            parallel,
        } => {
            let overrides = commands::run::RunOverrides {
                input_dir,
                output_dir,
                format,
                extension,
                interval,
                store,
                no_store,
                no_snapshot,
                strict,
                parallel,
            };
            commands::run::run(config, overrides, cli.quiet).await
        }
        Commands::Convert {
            input,
            output,
            format,
            interval,
            strict,
        } => commands::convert::convert(
            &config,
            &input,
            output.as_deref(),
            format,
            interval.as_deref(),
            strict,
            cli.quiet,
        ),
        Commands::Calendar {
            interval,
            rules,
            json,
        } => commands::calendar::show_calendar(&config, interval.as_deref(), rules, json),
    }
}
