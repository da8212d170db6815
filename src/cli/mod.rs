pub mod chart;
pub mod prompt;
pub mod session;
pub mod summary;

use std::{fmt::Display, path::PathBuf};

use anyhow::Result;
use chart::{process_chart_command, ChartCommand};
use clap::{Parser, Subcommand, ValueEnum};
use session::{process_end_command, process_start_command, process_status_command};
use summary::{process_summary_command, SummaryCommand};
use tracing::level_filters::LevelFilter;

use crate::{
    context::AppContext,
    session::cost::{Cost, DEFAULT_HOURLY_RATE},
    utils::{
        dir::{create_application_default_path, ensure_dir},
        logging::{enable_logging, CLI_PREFIX},
    },
};

#[derive(Parser, Debug)]
#[command(name = "Cafelog", version, long_about = None)]
#[command(about = "Application for logging cafe work sessions and what they cost", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        global = true,
        env = "CAFELOG_DIR",
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        env = "CAFELOG_RATE",
        default_value_t = DEFAULT_HOURLY_RATE,
        help = "Hourly rate used to suggest the cost of a session"
    )]
    rate: u32,
    #[arg(long, global = true, help = "Enable logging")]
    log: bool,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Start a new session")]
    Start {},
    #[command(about = "End the most recent open session and record its cost")]
    End {
        #[arg(
            long,
            allow_negative_numbers = true,
            conflicts_with = "yes",
            help = "Cost of the session. Skips the prompt"
        )]
        cost: Option<Cost>,
        #[arg(short, long, help = "Accept the suggested cost without asking")]
        yes: bool,
    },
    #[command(about = "Show the session that's currently open")]
    Status {},
    #[command(about = "Total time and cost for a month")]
    Summary {
        #[command(flatten)]
        command: SummaryCommand,
    },
    #[command(about = "Chart time and cost per day or month")]
    Chart {
        #[command(subcommand)]
        command: ChartCommand,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = args
        .dir
        .map_or_else(create_application_default_path, ensure_dir)?;

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(CLI_PREFIX, &app_dir, logging_level, args.log)?;

    let context = AppContext::new(app_dir, args.rate);
    run_command(&context, args.commands).await
}

async fn run_command(context: &AppContext, commands: Commands) -> Result<()> {
    match commands {
        Commands::Start {} => process_start_command(context),
        Commands::End { cost, yes } => process_end_command(context, cost, yes),
        Commands::Status {} => process_status_command(context),
        Commands::Summary { command } => process_summary_command(context, command),
        Commands::Chart { command } => process_chart_command(context, command).await,
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use crate::session::cost::{Cost, DEFAULT_HOURLY_RATE};

    use super::{Args, Commands};

    fn parse_end(cost: &str) -> Result<Option<Cost>, clap::Error> {
        let args = Args::try_parse_from(["cafelog", "end", "--cost", cost])?;
        match args.commands {
            Commands::End { cost, .. } => Ok(cost),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_end_cost_bounds() {
        assert_eq!(parse_end("0").unwrap(), Some(Cost::ZERO));
        assert_eq!(parse_end("10000").unwrap(), Some(Cost::new(10_000).unwrap()));
        assert!(parse_end("10001").is_err());
        assert!(parse_end("-1").is_err());
        assert!(parse_end("ten").is_err());
    }

    #[test]
    fn test_end_cost_conflicts_with_yes() {
        assert!(Args::try_parse_from(["cafelog", "end", "--cost", "5", "--yes"]).is_err());
    }

    #[test]
    fn test_global_options() {
        let args =
            Args::try_parse_from(["cafelog", "start", "--rate", "650", "--dir", "/tmp/cafe"])
                .unwrap();
        assert_eq!(args.rate, 650);
        assert_eq!(args.dir.unwrap().to_str(), Some("/tmp/cafe"));

        let args = Args::try_parse_from(["cafelog", "status"]).unwrap();
        if std::env::var("CAFELOG_RATE").is_err() {
            assert_eq!(args.rate, DEFAULT_HOURLY_RATE);
        }
    }

    #[test]
    fn test_chart_subcommands() {
        assert!(Args::try_parse_from(["cafelog", "chart", "daily", "--days", "7"]).is_ok());
        assert!(Args::try_parse_from(["cafelog", "chart", "monthly", "--export"]).is_ok());
        assert!(Args::try_parse_from(["cafelog", "chart", "monthly", "--no-open"]).is_err());
        assert!(Args::try_parse_from(["cafelog", "chart", "weekly"]).is_err());
    }
}
