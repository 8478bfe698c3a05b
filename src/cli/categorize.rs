use colored::Colorize;
use tracing::debug;

use crate::catalog::Catalog;
use crate::categorizer::RuleSet;
use crate::cli::{accounts, Context, DateArgs};
use crate::error::Result;
use crate::models::Account;
use crate::query::transactions_for_accounts;
use crate::reviewer::{run_session, Terminal};

pub fn run(ctx: &Context, force: bool, filter_by: Option<Account>, dates: &DateArgs) -> Result<()> {
    // Both files must load before anything is shown or written.
    let rules = RuleSet::load(&ctx.paths.rules())?;
    let catalog = Catalog::load(&ctx.paths.categories())?;
    debug!(rules = rules.len(), categories = catalog.len(), "loaded rules and categories");
    let conn = ctx.connection()?;
    let range = dates.range(&ctx.settings)?;

    if force {
        println!("{}", "Including transactions that already have a category.".yellow());
    }
    let transactions = transactions_for_accounts(&conn, &range, &accounts(filter_by), !force)?;
    if transactions.is_empty() {
        println!("{}", "No transactions to categorize.".green());
        return Ok(());
    }
    println!("\n{} transaction(s) to categorize\n", transactions.len());

    let report = run_session(&conn, &transactions, &rules, &catalog, &mut Terminal::new())?;
    println!(
        "{}",
        format!("Categorized {}, skipped {}.", report.categorized, report.skipped).green()
    );
    Ok(())
}
