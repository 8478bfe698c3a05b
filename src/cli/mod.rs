pub mod categorize;
pub mod get;
pub mod init;
pub mod summary;
pub mod sync;

use std::path::{Path, PathBuf};

use chrono::Local;
use clap::{Args, Parser, Subcommand};
use rusqlite::Connection;
use tracing::level_filters::LevelFilter;

use crate::dates::{parse_date, DateRange, Period};
use crate::db::open;
use crate::error::{Result, TallyError};
use crate::models::Account;
use crate::settings::{DataPaths, Settings};

#[derive(Parser)]
#[command(
    name = "tally",
    version,
    about = "Sync card transactions from Plaid and sort them into spending categories."
)]
pub struct Cli {
    /// Directory holding the database, cursors, rules and categories
    /// (default: the directory in ~/.config/tally/settings.json)
    #[arg(long = "data-dir", env = "TALLY_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log level for tally's own messages. RUST_LOG takes precedence.
    #[arg(long = "log-level", default_value_t = LevelFilter::INFO, global = true)]
    pub log_level: LevelFilter,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the data directory, database and default rules and categories.
    Init,
    /// Pull new transactions for every account (or one) into the database.
    #[command(visible_alias = "update")]
    Sync {
        /// Ignore saved cursors and fetch the full history
        #[arg(long = "get-all")]
        get_all: bool,
        /// Replace transactions that are already stored
        #[arg(long)]
        force: bool,
        #[arg(long = "filter-by", value_enum)]
        filter_by: Option<Account>,
    },
    /// List transactions in a date range.
    Get {
        /// Only show transactions with this category
        #[arg(long)]
        category: Option<String>,
        #[arg(long = "filter-by", value_enum)]
        filter_by: Option<Account>,
        #[command(flatten)]
        dates: DateArgs,
    },
    /// Assign categories to transactions one at a time.
    Categorize {
        /// Include transactions that already have a category
        #[arg(long)]
        force: bool,
        #[arg(long = "filter-by", value_enum)]
        filter_by: Option<Account>,
        #[command(flatten)]
        dates: DateArgs,
    },
    /// Total spending per category.
    Summary {
        #[arg(long = "filter-by", value_enum)]
        filter_by: Option<Account>,
        #[command(flatten)]
        dates: DateArgs,
    },
}

/// Date selection shared by the reporting commands. Defaults to this month.
#[derive(Args, Debug, Default, Clone)]
#[group(multiple = false)]
pub struct DateArgs {
    /// Inclusive date range, e.g. 2025-09-01 2025-09-15
    #[arg(long = "from-to-date", num_args = 2, value_names = ["FROM", "TO"])]
    pub from_to_date: Option<Vec<String>>,
    /// From the start of the current billing cycle to today
    #[arg(long = "this-month")]
    pub this_month: bool,
    /// From 31 days ago to today
    #[arg(long = "last-month")]
    pub last_month: bool,
    /// From 7 days ago to today
    #[arg(long = "last-week")]
    pub last_week: bool,
}

impl DateArgs {
    pub fn period(&self) -> Result<Period> {
        if let Some(bounds) = &self.from_to_date {
            let [from, to] = bounds.as_slice() else {
                return Err(TallyError::InvalidDate(
                    "--from-to-date takes exactly two dates".to_string(),
                ));
            };
            return Ok(Period::Between(parse_date(from)?, parse_date(to)?));
        }
        if self.last_month {
            return Ok(Period::LastMonth);
        }
        if self.last_week {
            return Ok(Period::LastWeek);
        }
        Ok(Period::ThisMonth)
    }

    pub fn range(&self, settings: &Settings) -> Result<DateRange> {
        self.period()?
            .resolve(Local::now().date_naive(), settings.cycle_start_day)
    }
}

/// Accounts a command should cover.
pub(crate) fn accounts(filter_by: Option<Account>) -> Vec<Account> {
    match filter_by {
        Some(account) => vec![account],
        None => Account::ALL.to_vec(),
    }
}

/// Everything a command needs to find its files.
pub struct Context {
    pub paths: DataPaths,
    pub settings: Settings,
}

impl Context {
    pub fn new(data_dir: Option<&Path>, settings: Settings) -> Self {
        Self {
            paths: DataPaths::resolve(data_dir, &settings),
            settings,
        }
    }

    /// Open the database, refusing to run before `tally init`.
    pub fn connection(&self) -> Result<Connection> {
        let db_path = self.paths.database();
        if !db_path.exists() {
            return Err(TallyError::Other(format!(
                "no database at {}; run `tally init` first",
                db_path.display()
            )));
        }
        open(&db_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_date_flags_are_exclusive() {
        let parsed = Cli::try_parse_from(["tally", "get", "--this-month", "--last-week"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_from_to_date_parses() {
        let cli = Cli::try_parse_from(["tally", "summary", "--from-to-date", "2025-09-01", "2025-09-15"]).unwrap();
        let Commands::Summary { dates, .. } = cli.command else {
            panic!("expected summary");
        };
        let range = dates.range(&Settings::default()).unwrap();
        assert_eq!(range.start(), parse_date("2025-09-01").unwrap());
        assert_eq!(range.end(), parse_date("2025-09-15").unwrap());
    }

    #[test]
    fn test_reversed_range_rejected() {
        let dates = DateArgs {
            from_to_date: Some(vec!["2025-09-15".into(), "2025-09-01".into()]),
            ..Default::default()
        };
        assert!(dates.range(&Settings::default()).is_err());
    }

    #[test]
    fn test_default_period_is_this_month() {
        assert_eq!(DateArgs::default().period().unwrap(), Period::ThisMonth);
    }

    #[test]
    fn test_filter_by_account_values() {
        let cli = Cli::try_parse_from(["tally", "update", "--filter-by", "chase_prime", "--get-all"]).unwrap();
        let Commands::Sync { filter_by, get_all, force } = cli.command else {
            panic!("expected sync");
        };
        assert_eq!(filter_by, Some(Account::ChasePrime));
        assert!(get_all);
        assert!(!force);
        assert_eq!(accounts(None).len(), 3);
    }
}
