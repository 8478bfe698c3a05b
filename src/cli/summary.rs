use comfy_table::{Cell, CellAlignment, Table};
use rust_decimal::Decimal;

use crate::cli::{accounts, Context, DateArgs};
use crate::error::Result;
use crate::fmt::money;
use crate::models::Account;
use crate::query::{summarize, transactions_for_accounts};

pub fn run(ctx: &Context, filter_by: Option<Account>, dates: &DateArgs) -> Result<()> {
    let conn = ctx.connection()?;
    let range = dates.range(&ctx.settings)?;
    let transactions = transactions_for_accounts(&conn, &range, &accounts(filter_by), false)?;
    println!("{} to {}: {} transaction(s)", range.start(), range.end(), transactions.len());

    let totals = summarize(&transactions);
    let mut table = Table::new();
    table.set_header(vec!["Category", "Count", "Total"]);
    for row in &totals {
        table.add_row(vec![
            Cell::new(row.category.as_deref().unwrap_or("uncategorized")),
            Cell::new(row.count),
            Cell::new(money(row.total)).set_alignment(CellAlignment::Right),
        ]);
    }
    let grand_total: Decimal = totals.iter().map(|row| row.total).sum();
    table.add_row(vec![
        Cell::new("TOTAL"),
        Cell::new(transactions.len()),
        Cell::new(money(grand_total)).set_alignment(CellAlignment::Right),
    ]);
    println!("{table}");
    Ok(())
}
