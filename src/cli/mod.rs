//! Command-line front end: argument parsing, config resolution and dispatch.

mod commands;
pub mod output;

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use uuid::Uuid;

use tally_config::{Config, ConfigManager};
use tally_domain::{RecurringPattern, TransactionType};
use tally_storage_json::JsonStore;

use crate::errors::Result;

#[derive(Debug, Parser)]
#[command(name = "tally", version, about = "Categorize transactions and generate recurring ones")]
pub struct Cli {
    /// Config file. Defaults to `<config dir>/tally/config.json`.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Store file, overriding the configured data path.
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// Owner of the rules and transactions being touched.
    #[arg(long, global = true, default_value_t = Uuid::nil())]
    pub user: Uuid,

    /// Print without colors or status labels.
    #[arg(long, global = true)]
    pub plain: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the category a description would receive.
    Categorize {
        description: String,
        /// Print the classification as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Add a keyword rule.
    AddRule {
        #[arg(long)]
        category: String,
        /// Comma-separated keywords.
        #[arg(long)]
        keywords: String,
        /// Higher priorities are checked first.
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        priority: i32,
    },
    /// Record a one-off transaction.
    Add(TransactionArgs),
    /// Record a recurring definition.
    AddRecurring {
        #[command(flatten)]
        transaction: TransactionArgs,
        #[arg(long)]
        pattern: RecurringPattern,
        /// Last date an instance may fall on. Defaults to the configured span.
        #[arg(long, value_parser = parse_datetime)]
        end: Option<DateTime<Utc>>,
    },
    /// List the user's rules in the order they are checked.
    Rules,
    /// Run one recurrence tick.
    Tick {
        /// Evaluate as of this instant instead of the system clock.
        #[arg(long, value_parser = parse_datetime)]
        now: Option<DateTime<Utc>>,
    },
    /// List the user's transactions by date.
    List {
        /// Show only recurring definitions with their pattern and end date.
        #[arg(long)]
        recurring: bool,
    },
    /// Print build metadata.
    Version,
}

#[derive(Debug, Args)]
pub struct TransactionArgs {
    pub amount: f64,
    pub description: String,
    #[arg(long = "type", default_value = "expense")]
    pub kind: TransactionType,
    /// Defaults to now.
    #[arg(long, value_parser = parse_datetime)]
    pub date: Option<DateTime<Utc>>,
    /// Skip auto-categorization and use this label.
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

/// Everything a command needs once flags and config are resolved.
pub struct CliContext {
    pub config: Config,
    pub store: JsonStore,
    pub user_id: Uuid,
}

/// Parses process arguments and runs the selected command.
pub fn run_cli() -> Result<()> {
    run(Cli::parse())
}

pub fn run(cli: Cli) -> Result<()> {
    output::set_preferences(output::OutputPreferences { plain: cli.plain });

    let manager = match &cli.config {
        Some(path) => ConfigManager::new(path.clone()),
        None => ConfigManager::from_default_location()?,
    };
    let config = manager.load()?;
    crate::init_with_filter(config.log_filter.as_deref());

    if let Command::Version = cli.command {
        commands::version();
        return Ok(());
    }

    let data_path = cli.data.clone().unwrap_or_else(|| config.resolve_data_path());
    tracing::debug!(
        config = %manager.config_path().display(),
        data = %data_path.display(),
        "resolved paths"
    );
    let store = JsonStore::open(data_path)?;
    let ctx = CliContext {
        config,
        store,
        user_id: cli.user,
    };

    match cli.command {
        Command::Categorize { description, json } => {
            commands::categorize(&ctx, &description, json)
        }
        Command::AddRule {
            category,
            keywords,
            priority,
        } => commands::add_rule(&ctx, &keywords, &category, priority),
        Command::Add(args) => commands::add(&ctx, args),
        Command::AddRecurring {
            transaction,
            pattern,
            end,
        } => commands::add_recurring(&ctx, transaction, pattern, end),
        Command::Rules => commands::rules(&ctx),
        Command::Tick { now } => commands::tick(&ctx, now),
        Command::List { recurring } => commands::list(&ctx, recurring),
        Command::Version => Ok(()),
    }
}

/// Accepts an RFC 3339 timestamp or a bare `YYYY-MM-DD` date at midnight UTC.
pub fn parse_datetime(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("expected YYYY-MM-DD or an RFC 3339 timestamp, got `{raw}`"))
}
