use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use peso_watcher::cli::history::HistoryOptions;
use peso_watcher::core::Currency;
use peso_watcher::core::calendar::parse_iso;
use peso_watcher::core::history::SortKey;
use peso_watcher::core::i18n::Locale;
use peso_watcher::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Increase log detail (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Language for labels and messages (en, es)
    #[arg(short, long, global = true)]
    locale: Option<Locale>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Show buy/sell rates for a single date
    Quote {
        /// Date to look up as YYYY-MM-DD (defaults to yesterday)
        #[arg(short, long, value_parser = parse_iso)]
        date: Option<chrono::NaiveDate>,
    },
    /// Show the rate history over recent business days
    History {
        /// Number of business days to look back
        #[arg(short, long)]
        days: Option<usize>,
        /// Column to sort by (date, currency)
        #[arg(short, long)]
        sort: Option<SortKey>,
        /// Flip the default direction of the sort column
        #[arg(short, long)]
        reverse: bool,
        /// Only show these currencies (usd-blue, usd-oficial, eur)
        #[arg(short, long)]
        only: Vec<Currency>,
    },
}

impl From<Commands> for peso_watcher::AppCommand {
    fn from(cmd: Commands) -> peso_watcher::AppCommand {
        match cmd {
            Commands::Quote { date } => peso_watcher::AppCommand::Quote { date },
            Commands::History {
                days,
                sort,
                reverse,
                only,
            } => peso_watcher::AppCommand::History(HistoryOptions {
                days,
                sort,
                reverse,
                only,
            }),
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;

    let result = match cli.command {
        Some(Commands::Setup) => peso_watcher::cli::setup::setup(),
        Some(cmd) => {
            peso_watcher::run_command(cmd.into(), cli.config_path.as_deref(), cli.locale).await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
