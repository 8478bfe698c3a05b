use std::path::PathBuf;

use colored::Colorize;
use comfy_table::{Cell, Table};
use tracing::{error, info};

use crate::cli::{accounts, Context};
use crate::credentials::{Credentials, PlaidConfig};
use crate::cursor::CursorStore;
use crate::error::{Result, TallyError};
use crate::models::Account;
use crate::plaid::PlaidClient;
use crate::source::{MemorySource, TransactionSource, FIXTURE_ENV};
use crate::store::count;
use crate::sync::{sync_account, SyncOptions};

/// Plaid unless a fixture file is configured.
fn open_source() -> Result<Box<dyn TransactionSource>> {
    if let Some(path) = std::env::var_os(FIXTURE_ENV) {
        let path = PathBuf::from(path);
        info!(path = %path.display(), "reading transactions from fixture");
        return Ok(Box::new(MemorySource::load(&path)?));
    }
    let config = PlaidConfig::from_env()?;
    Ok(Box::new(PlaidClient::new(&config)?))
}

pub fn run(ctx: &Context, get_all: bool, force: bool, filter_by: Option<Account>) -> Result<()> {
    let conn = ctx.connection()?;
    let cursors = CursorStore::new(ctx.paths.cursors());
    let credentials = Credentials::from_env();
    let mut source = open_source()?;
    let options = SyncOptions {
        full_resync: get_all,
        overwrite_existing: force,
    };
    if force {
        println!("{}", "Replacing transactions that are already stored.".yellow());
    }

    let mut table = Table::new();
    table.set_header(vec!["Account", "Inserted", "Skipped", "Status"]);
    let mut failed = Vec::new();
    for account in accounts(filter_by) {
        match sync_account(&conn, &cursors, source.as_mut(), &credentials, account, options) {
            Ok(report) => {
                table.add_row(vec![
                    Cell::new(account),
                    Cell::new(report.inserted),
                    Cell::new(report.skipped),
                    Cell::new("ok"),
                ]);
            }
            Err(e) => {
                error!(%account, "sync failed: {e}");
                table.add_row(vec![
                    Cell::new(account),
                    Cell::new("-"),
                    Cell::new("-"),
                    Cell::new(e.to_string()),
                ]);
                failed.push(account);
            }
        }
    }
    println!("{table}");
    info!(stored = count(&conn)?, cursors = %cursors.path().display(), "sync run finished");

    if failed.is_empty() {
        println!("{}", "Sync complete.".green());
        return Ok(());
    }
    let names: Vec<String> = failed.iter().map(Account::to_string).collect();
    Err(TallyError::Other(format!("sync failed for {}", names.join(", "))))
}
