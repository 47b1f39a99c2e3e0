//! minbar CLI - loads futures tick archives as per-minute bars.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod display;
mod logging;

use config::{DatabaseArgs, SourceArgs};
use display::Format;

#[derive(Parser)]
#[command(name = "minbar")]
#[command(about = "Aggregates futures ticks into minute OHLCV bars", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (warnings only, no progress output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Process exactly one trading day
    Run {
        /// Trading day (YYYYMMDD)
        day: String,

        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        database: DatabaseArgs,

        /// Write the bars to this file instead of the database
        #[arg(long)]
        export: Option<PathBuf>,

        /// Export format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: Format,
    },

    /// Process every trading day after a starting day
    CatchUp {
        /// Start after this day (YYYYMMDD). Defaults to the latest stored day.
        #[arg(short, long)]
        start: Option<String>,

        /// Seconds to wait before retrying a day whose archive is missing
        #[arg(long, env = "MINBAR_RETRY_SECS", default_value = "600")]
        retry_secs: u64,

        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        database: DatabaseArgs,
    },

    /// Mirror a remote archive locally, or list remote archives
    Fetch {
        /// Trading day to mirror (YYYYMMDD)
        #[arg(short, long, required_unless_present = "list")]
        day: Option<String>,

        /// List remote archives instead
        #[arg(long, conflicts_with = "day")]
        list: bool,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Print the loaded trading calendar
    Calendar {
        /// Only days strictly after this one (YYYYMMDD)
        #[arg(short, long)]
        after: Option<String>,

        /// Trading calendar CSV
        #[arg(long, env = "MINBAR_CALENDAR", default_value = "calendar.csv")]
        calendar: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet)?;

    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Run {
            day,
            source,
            database,
            export,
            format,
        } => commands::run::run(&day, &source, &database, export, format).await,
        Commands::CatchUp {
            start,
            retry_secs,
            source,
            database,
        } => {
            commands::catch_up::catch_up(
                start.as_deref(),
                retry_secs,
                &source,
                &database,
                cli.quiet,
            )
            .await
        }
        Commands::Fetch { day, list, source } => {
            commands::fetch::fetch(day.as_deref(), list, &source).await
        }
        Commands::Calendar { after, calendar } => {
            commands::calendar::show_calendar(&calendar, after.as_deref())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "minbar",
            "run",
            "20230110",
            "--database",
            "bars.duckdb",
            "--archive-dir",
            "/data/xml",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Some(Commands::Run {
            day,
            source,
            database,
            export,
            ..
        }) = cli.command
        else {
            panic!("expected run");
        };
        assert_eq!(day, "20230110");
        assert_eq!(source.archive_dir, PathBuf::from("/data/xml"));
        assert_eq!(database.database, Some(PathBuf::from("bars.duckdb")));
        assert!(export.is_none());
    }

    #[test]
    fn test_fetch_requires_day_or_list() {
        assert!(Cli::try_parse_from(["minbar", "fetch"]).is_err());
        assert!(Cli::try_parse_from(["minbar", "fetch", "--list"]).is_ok());
        assert!(Cli::try_parse_from(["minbar", "fetch", "--day", "20230110", "--list"]).is_err());
    }
}
