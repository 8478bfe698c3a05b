use reqwest::blocking::Client;
use serde::Serialize;
use tracing::{debug, trace};

use crate::credentials::PlaidConfig;
use crate::error::{Result, TallyError};
use crate::source::{SyncPage, TransactionSource};

/// Blocking client for Plaid's `/transactions/sync` endpoint.
pub struct PlaidClient {
    client: Client,
    base_url: String,
    client_id: String,
    secret: String,
}

#[derive(Serialize)]
struct SyncRequest<'a> {
    client_id: &'a str,
    secret: &'a str,
    access_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    cursor: Option<&'a str>,
    count: u32,
}

impl PlaidClient {
    pub fn new(config: &PlaidConfig) -> Result<Self> {
        Self::with_base_url(config, config.environment.base_url())
    }

    pub fn with_base_url(config: &PlaidConfig, base_url: &str) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
            secret: config.secret.clone(),
        })
    }
}

impl TransactionSource for PlaidClient {
    fn fetch_page(&mut self, access_token: &str, cursor: Option<&str>, count: u32) -> Result<SyncPage> {
        let url = format!("{}/transactions/sync", self.base_url);
        trace!(%url, has_cursor = cursor.is_some(), "requesting page");
        let response = self
            .client
            .post(&url)
            .json(&SyncRequest {
                client_id: &self.client_id,
                secret: &self.secret,
                access_token,
                cursor,
                count,
            })
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(TallyError::Source {
                status: status.as_u16(),
                body,
            });
        }

        let page: SyncPage = response.json()?;
        debug!(added = page.added.len(), has_more = page.has_more, "received page");
        Ok(page)
    }
}
