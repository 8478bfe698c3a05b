use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::cli::{accounts, Context, DateArgs};
use crate::error::Result;
use crate::fmt::{local_datetime, money};
use crate::models::Account;
use crate::query::transactions_for_accounts;

pub fn run(ctx: &Context, category: Option<&str>, filter_by: Option<Account>, dates: &DateArgs) -> Result<()> {
    let conn = ctx.connection()?;
    let range = dates.range(&ctx.settings)?;
    let mut transactions = transactions_for_accounts(&conn, &range, &accounts(filter_by), false)?;
    if let Some(category) = category {
        transactions.retain(|t| t.my_category.as_deref() == Some(category));
    }

    println!("{} to {}: {} transaction(s)", range.start(), range.end(), transactions.len());
    if transactions.is_empty() {
        println!("{}", "No transactions found.".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Date", "Category", "Amount", "Name", "Account"]);
    for txn in &transactions {
        table.add_row(vec![
            Cell::new(local_datetime(txn.datetime)),
            Cell::new(txn.my_category.as_deref().unwrap_or("")),
            Cell::new(money(txn.amount)).set_alignment(CellAlignment::Right),
            Cell::new(&txn.name),
            Cell::new(txn.account),
        ]);
    }
    println!("{table}");
    Ok(())
}
