use std::fmt;
use std::io::{BufRead, IsTerminal};

use colored::Colorize;
use comfy_table::{Cell, Table};
use dialoguer::Input;
use rusqlite::Connection;
use tracing::debug;

use crate::catalog::Catalog;
use crate::categorizer::RuleSet;
use crate::error::Result;
use crate::fmt::{local_datetime, money};
use crate::models::Transaction;
use crate::store::set_user_category;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The user typed `s`.
    Explicit,
    /// Empty input with no rule guess to accept.
    NoGuess,
    InvalidIndex,
    InvalidInput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Categorized(String),
    Skipped(SkipReason),
}

/// Interpret one line of user input for a transaction.
pub fn decide(input: &str, guess: Option<&str>, catalog: &Catalog) -> Decision {
    let input = input.trim();
    if input.is_empty() {
        return match guess {
            Some(category) => Decision::Categorized(category.to_string()),
            None => Decision::Skipped(SkipReason::NoGuess),
        };
    }
    if input.eq_ignore_ascii_case("s") {
        return Decision::Skipped(SkipReason::Explicit);
    }
    match input.parse::<usize>() {
        Ok(index) => match catalog.get(index) {
            Some(label) => Decision::Categorized(label.to_string()),
            None => Decision::Skipped(SkipReason::InvalidIndex),
        },
        Err(_) => Decision::Skipped(SkipReason::InvalidInput),
    }
}

/// Position of a transaction within a session, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.current, self.total)
    }
}

/// Source of the user's answer for each transaction.
pub trait Prompt {
    /// Returns `None` once no more input is available.
    fn ask(
        &mut self,
        txn: &Transaction,
        guess: Option<&str>,
        catalog: &Catalog,
        progress: Progress,
    ) -> Result<Option<String>>;

    /// Called after each decision so the user sees what happened.
    fn report(&mut self, _txn: &Transaction, _decision: &Decision) {}
}

/// Prompts on the terminal. Uses dialoguer when stdin is a TTY and plain line
/// reads otherwise, so answers can be piped in.
pub struct Terminal {
    interactive: bool,
}

impl Terminal {
    pub fn new() -> Self {
        Self {
            interactive: std::io::stdin().is_terminal(),
        }
    }

    fn print_summary(txn: &Transaction, guess: Option<&str>, catalog: &Catalog, progress: Progress) {
        let mut cat_table = Table::new();
        cat_table.set_header(vec!["#", "Category"]);
        for (i, label) in catalog.iter() {
            cat_table.add_row(vec![Cell::new(i), Cell::new(label)]);
        }
        println!("{}", "\u{2500}".repeat(60));
        println!("  Categorizing transaction {progress}");
        println!("  Date:     {}", local_datetime(txn.datetime));
        println!("  Name:     {}", txn.name);
        if let Some(merchant) = &txn.merchant_name {
            println!("  Merchant: {merchant}");
        }
        let amt_str = if txn.amount.is_sign_negative() {
            money(txn.amount).green().to_string()
        } else {
            money(txn.amount).red().to_string()
        };
        println!("  Amount:   {amt_str}");
        println!("  Account:  {}", txn.account);
        if let Some(plaid) = &txn.plaid_category {
            println!("  Plaid:    {plaid}");
        }
        if let Some(current) = &txn.my_category {
            println!("  Current:  {current}");
        }
        match guess {
            Some(g) => println!("  Guess:    {}", g.cyan()),
            None => println!("  Guess:    {}", "none".dimmed()),
        }
        println!("{cat_table}");
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompt for Terminal {
    fn ask(
        &mut self,
        txn: &Transaction,
        guess: Option<&str>,
        catalog: &Catalog,
        progress: Progress,
    ) -> Result<Option<String>> {
        Self::print_summary(txn, guess, catalog, progress);
        let prompt = "Category # (Enter=accept guess, s=skip)";
        if self.interactive {
            let line: String = Input::new()
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()?;
            return Ok(Some(line));
        }
        println!("{prompt}:");
        let mut line = String::new();
        if std::io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn report(&mut self, _txn: &Transaction, decision: &Decision) {
        match decision {
            Decision::Categorized(category) => {
                println!("{}", format!("\u{2192} Categorized as {category}").green())
            }
            Decision::Skipped(SkipReason::InvalidIndex) => {
                println!("{}", "No category with that number, skipping.".red())
            }
            Decision::Skipped(SkipReason::InvalidInput) => println!("{}", "Invalid choice, skipping.".red()),
            Decision::Skipped(_) => println!("{}", "Skipped.".yellow()),
        }
        println!();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReport {
    pub categorized: usize,
    pub skipped: usize,
}

/// Ask once for each transaction and write every categorization as soon as it
/// is made. Stops early when the prompt runs out of input.
pub fn run_session(
    conn: &Connection,
    transactions: &[Transaction],
    rules: &RuleSet,
    catalog: &Catalog,
    prompt: &mut dyn Prompt,
) -> Result<SessionReport> {
    let mut report = SessionReport::default();
    let total = transactions.len();
    for (i, txn) in transactions.iter().enumerate() {
        let guess = rules.guess_category(&txn.name, txn.merchant_name.as_deref());
        let progress = Progress { current: i + 1, total };
        let Some(input) = prompt.ask(txn, guess, catalog, progress)? else {
            debug!("input closed, ending session");
            break;
        };
        let decision = decide(&input, guess, catalog);
        match &decision {
            Decision::Categorized(category) => {
                set_user_category(conn, &txn.transaction_id, category)?;
                report.categorized += 1;
            }
            Decision::Skipped(reason) => {
                debug!(id = %txn.transaction_id, ?reason, "skipped");
                report.skipped += 1;
            }
        }
        prompt.report(txn, &decision);
    }
    Ok(report)
}
