//! The paginated transaction feed tally syncs from.
//!
//! `PlaidClient` talks to the real API. `MemorySource` serves pages held in
//! memory or loaded from a fixture file; it is compiled into release builds so
//! the whole program can run end to end without network access.

use std::path::Path;

use chrono::{DateTime, FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{read_file, Result, TallyError};

/// When set, `sync` reads pages from this fixture file instead of calling Plaid.
pub const FIXTURE_ENV: &str = "TALLY_SOURCE_FIXTURE";

pub const PAGE_SIZE: u32 = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalFinanceCategory {
    pub primary: String,
    pub detailed: String,
}

/// A transaction as the upstream API reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub transaction_id: String,
    pub amount: Decimal,
    pub name: String,
    #[serde(default)]
    pub merchant_name: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub datetime: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub personal_finance_category: Option<PersonalFinanceCategory>,
}

/// One response from the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncPage {
    pub added: Vec<RawTransaction>,
    pub next_cursor: String,
    pub has_more: bool,
}

pub trait TransactionSource {
    /// Fetch one page. `cursor == None` starts from the beginning of history.
    fn fetch_page(&mut self, access_token: &str, cursor: Option<&str>, count: u32) -> Result<SyncPage>;
}

/// Iterates pages until the source stops reporting `has_more`. Each request
/// uses the cursor returned by the previous page; a failed request ends the
/// iteration after yielding the error.
pub struct Pages<'a> {
    source: &'a mut dyn TransactionSource,
    access_token: &'a str,
    cursor: Option<String>,
    done: bool,
}

impl<'a> Pages<'a> {
    pub fn new(
        source: &'a mut dyn TransactionSource,
        access_token: &'a str,
        cursor: Option<String>,
    ) -> Self {
        Self {
            source,
            access_token,
            cursor,
            done: false,
        }
    }
}

impl Iterator for Pages<'_> {
    type Item = Result<SyncPage>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = self
            .source
            .fetch_page(self.access_token, self.cursor.as_deref(), PAGE_SIZE);
        match &result {
            Ok(page) => {
                self.done = !page.has_more;
                self.cursor = Some(page.next_cursor.clone());
            }
            Err(_) => self.done = true,
        }
        Some(result)
    }
}

#[derive(Deserialize)]
struct Fixture {
    pages: Vec<SyncPage>,
}

/// Serves a fixed sequence of pages. A request without a cursor gets the first
/// page; a request with a cursor gets the page after the one that returned it,
/// or an empty page once the sequence is exhausted.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pages: Vec<SyncPage>,
    requests: Vec<Option<String>>,
    fail_at: Option<usize>,
}

impl MemorySource {
    pub fn new(pages: Vec<SyncPage>) -> Self {
        Self {
            pages,
            ..Default::default()
        }
    }

    /// Load `{"pages": [...]}` from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = read_file(path)?;
        let fixture: Fixture = serde_json::from_str(&content).map_err(|e| TallyError::Malformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self::new(fixture.pages))
    }

    /// Make the request with the given 0-based number fail.
    #[cfg(test)]
    pub fn fail_at(mut self, request: usize) -> Self {
        self.fail_at = Some(request);
        self
    }

    /// Cursors of every request received so far.
    #[cfg(test)]
    pub fn requests(&self) -> &[Option<String>] {
        &self.requests
    }

    fn position(&self, cursor: Option<&str>) -> usize {
        match cursor {
            None => 0,
            Some(c) => self
                .pages
                .iter()
                .position(|p| p.next_cursor == c)
                .map(|i| i + 1)
                .unwrap_or(0),
        }
    }
}

impl TransactionSource for MemorySource {
    fn fetch_page(&mut self, _access_token: &str, cursor: Option<&str>, count: u32) -> Result<SyncPage> {
        let request = self.requests.len();
        self.requests.push(cursor.map(str::to_string));
        if self.fail_at == Some(request) {
            return Err(TallyError::Source {
                status: 500,
                body: "simulated failure".to_string(),
            });
        }
        let index = self.position(cursor);
        match self.pages.get(index) {
            Some(page) => {
                let mut page = page.clone();
                page.added.truncate(count as usize);
                Ok(page)
            }
            None => Ok(SyncPage {
                added: Vec::new(),
                next_cursor: cursor.unwrap_or_default().to_string(),
                has_more: false,
            }),
        }
    }
}
