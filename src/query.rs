use std::collections::BTreeMap;

use rusqlite::{params, Connection};
use rust_decimal::Decimal;

use crate::dates::DateRange;
use crate::error::Result;
use crate::models::{Account, Transaction};
use crate::store::{stored_row, COLUMNS};

/// Transactions for one account inside `range`, newest first.
pub fn transactions_between(
    conn: &Connection,
    range: &DateRange,
    account: Account,
    uncategorized_only: bool,
) -> Result<Vec<Transaction>> {
    let (lower, upper) = range.timestamp_bounds()?;
    let uncategorized = if uncategorized_only {
        " AND my_category IS NULL"
    } else {
        ""
    };
    let sql = format!(
        "SELECT {COLUMNS} FROM transactions \
         WHERE datetime >= ?1 AND datetime <= ?2 AND account = ?3{uncategorized} \
         ORDER BY datetime DESC, transaction_id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![lower, upper, account.tag()], stored_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    rows.into_iter().map(Transaction::try_from).collect()
}

/// Run [`transactions_between`] for each account and merge by recency.
pub fn transactions_for_accounts(
    conn: &Connection,
    range: &DateRange,
    accounts: &[Account],
    uncategorized_only: bool,
) -> Result<Vec<Transaction>> {
    let mut all = Vec::new();
    for account in accounts {
        all.extend(transactions_between(conn, range, *account, uncategorized_only)?);
    }
    all.sort_by(|a, b| {
        b.datetime
            .cmp(&a.datetime)
            .then_with(|| a.transaction_id.cmp(&b.transaction_id))
    });
    Ok(all)
}

pub struct CategoryTotal {
    /// `None` collects everything without a user category.
    pub category: Option<String>,
    pub total: Decimal,
    pub count: usize,
}

/// Sum amounts per user category. Named categories come first in name order,
/// the uncategorized bucket last.
pub fn summarize(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    let mut named: BTreeMap<&str, (Decimal, usize)> = BTreeMap::new();
    let mut uncategorized: Option<(Decimal, usize)> = None;
    for txn in transactions {
        let slot = match txn.my_category.as_deref() {
            Some(category) => named.entry(category).or_default(),
            None => uncategorized.get_or_insert_with(Default::default),
        };
        slot.0 += txn.amount;
        slot.1 += 1;
    }
    let mut totals: Vec<CategoryTotal> = named
        .into_iter()
        .map(|(category, (total, count))| CategoryTotal {
            category: Some(category.to_string()),
            total,
            count,
        })
        .collect();
    if let Some((total, count)) = uncategorized {
        totals.push(CategoryTotal {
            category: None,
            total,
            count,
        });
    }
    totals
}
