use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{Result, TallyError};
use crate::models::{StoredRow, Transaction};

pub const COLUMNS: &str = "transaction_id, datetime, amount, name, merchant_name, \
     plaid_category, plaid_subcategory, account, is_categorized, my_category";

/// What happened to a record offered to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Merge {
    Inserted,
    Replaced,
    Skipped,
}

pub fn stored_row(row: &Row<'_>) -> rusqlite::Result<StoredRow> {
    Ok(StoredRow {
        transaction_id: row.get(0)?,
        datetime: row.get(1)?,
        amount: row.get(2)?,
        name: row.get(3)?,
        merchant_name: row.get(4)?,
        plaid_category: row.get(5)?,
        plaid_subcategory: row.get(6)?,
        account: row.get(7)?,
        is_categorized: row.get(8)?,
        my_category: row.get(9)?,
    })
}

pub fn exists(conn: &Connection, transaction_id: &str) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM transactions WHERE transaction_id = ?1",
            [transaction_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Merge one record by transaction id. An existing record is replaced wholesale
/// when `overwrite_existing` is set and left untouched otherwise.
pub fn merge(conn: &Connection, txn: &Transaction, overwrite_existing: bool) -> Result<Merge> {
    let present = exists(conn, &txn.transaction_id)?;
    if present && !overwrite_existing {
        return Ok(Merge::Skipped);
    }
    conn.execute(
        &format!("INSERT OR REPLACE INTO transactions ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"),
        params![
            txn.transaction_id,
            txn.datetime,
            txn.amount.to_string(),
            txn.name,
            txn.merchant_name,
            txn.plaid_category,
            txn.plaid_subcategory,
            txn.account.tag(),
            txn.is_categorized,
            txn.my_category,
        ],
    )?;
    Ok(if present { Merge::Replaced } else { Merge::Inserted })
}

#[cfg(test)]
pub fn get(conn: &Connection, transaction_id: &str) -> Result<Option<Transaction>> {
    let row = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM transactions WHERE transaction_id = ?1"),
            [transaction_id],
            stored_row,
        )
        .optional()?;
    row.map(Transaction::try_from).transpose()
}

/// Record the user's category for a transaction.
pub fn set_user_category(conn: &Connection, transaction_id: &str, category: &str) -> Result<()> {
    let changed = conn.execute(
        "UPDATE transactions SET my_category = ?1, is_categorized = 1 WHERE transaction_id = ?2",
        params![category, transaction_id],
    )?;
    if changed == 0 {
        return Err(TallyError::UnknownTransaction(transaction_id.to_string()));
    }
    Ok(())
}

pub fn count(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT count(*) FROM transactions", [], |row| row.get(0))?)
}
