use rusqlite::Connection;
use tracing::{debug, info};

use crate::credentials::Credentials;
use crate::cursor::CursorStore;
use crate::dates::start_of_day;
use crate::error::Result;
use crate::models::{Account, Transaction};
use crate::source::{Pages, RawTransaction, TransactionSource};
use crate::store::{merge, Merge};

#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Ignore the stored cursor and fetch from the beginning of history.
    pub full_resync: bool,
    /// Replace records that are already stored.
    pub overwrite_existing: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Records written, including replacements.
    pub inserted: usize,
    pub skipped: usize,
    pub pages: usize,
}

/// Convert an upstream record. The precise `datetime` wins; otherwise the
/// calendar date is taken at local midnight.
pub fn convert(raw: RawTransaction, account: Account) -> Result<Transaction> {
    let datetime = match raw.datetime {
        Some(dt) => dt.timestamp(),
        None => start_of_day(raw.date)?,
    };
    let (plaid_category, plaid_subcategory) = match raw.personal_finance_category {
        Some(pfc) => (Some(pfc.primary), Some(pfc.detailed)),
        None => (None, None),
    };
    Ok(Transaction {
        transaction_id: raw.transaction_id,
        datetime,
        amount: raw.amount,
        name: raw.name,
        merchant_name: raw.merchant_name,
        plaid_category,
        plaid_subcategory,
        account,
        is_categorized: false,
        my_category: None,
    })
}

/// Pull every pending page for `account`, save the final cursor, then merge
/// the records into the store.
///
/// The cursor is written only after all pages arrived. If a page fails the
/// previous cursor stays on disk and the next run fetches the same range again.
pub fn sync_account(
    conn: &Connection,
    cursors: &CursorStore,
    source: &mut dyn TransactionSource,
    credentials: &Credentials,
    account: Account,
    options: SyncOptions,
) -> Result<SyncReport> {
    let access_token = credentials.access_token(account)?;
    let start = if options.full_resync {
        info!(%account, "full resync requested, ignoring stored cursor");
        None
    } else {
        cursors.get_cursor(account)?
    };

    let mut report = SyncReport::default();
    let mut fetched = Vec::new();
    let mut last_cursor = None;
    for page in Pages::new(source, access_token, start) {
        let page = page?;
        report.pages += 1;
        debug!(%account, page = report.pages, added = page.added.len(), "page fetched");
        for raw in page.added {
            fetched.push(convert(raw, account)?);
        }
        last_cursor = Some(page.next_cursor);
    }

    cursors.set_cursor(account, last_cursor.as_deref())?;

    for txn in &fetched {
        match merge(conn, txn, options.overwrite_existing)? {
            Merge::Inserted | Merge::Replaced => report.inserted += 1,
            Merge::Skipped => report.skipped += 1,
        }
    }
    info!(
        %account,
        inserted = report.inserted,
        skipped = report.skipped,
        pages = report.pages,
        "sync finished"
    );
    Ok(report)
}
