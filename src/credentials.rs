use std::collections::HashMap;

use tracing::debug;

use crate::error::{Result, TallyError};
use crate::models::Account;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaidEnvironment {
    Sandbox,
    Production,
}

impl PlaidEnvironment {
    pub fn base_url(&self) -> &'static str {
        match self {
            PlaidEnvironment::Sandbox => "https://sandbox.plaid.com",
            PlaidEnvironment::Production => "https://production.plaid.com",
        }
    }
}

/// API client credentials shared by every account.
#[derive(Debug, Clone)]
pub struct PlaidConfig {
    pub client_id: String,
    pub secret: String,
    pub environment: PlaidEnvironment,
}

impl PlaidConfig {
    /// Reads `PLAID_CLIENT_ID`, `PLAID_SECRET` and `PLAID_ENV` (default production).
    pub fn from_env() -> Result<Self> {
        let environment = match std::env::var("PLAID_ENV").ok().as_deref().map(str::to_lowercase) {
            None => PlaidEnvironment::Production,
            Some(env) if env == "production" => PlaidEnvironment::Production,
            Some(env) if env == "sandbox" => PlaidEnvironment::Sandbox,
            Some(other) => {
                return Err(TallyError::Settings(format!(
                    "PLAID_ENV must be 'sandbox' or 'production', got '{other}'"
                )))
            }
        };
        Ok(Self {
            client_id: require("PLAID_CLIENT_ID")?,
            secret: require("PLAID_SECRET")?,
            environment,
        })
    }
}

fn require(var: &str) -> Result<String> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| TallyError::MissingEnv(var.to_string()))
}

/// Access tokens issued per account by the link flow.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    tokens: HashMap<Account, String>,
}

impl Credentials {
    #[cfg(test)]
    pub fn new(tokens: HashMap<Account, String>) -> Self {
        Self { tokens }
    }

    /// Collect every `PLAID_<TAG>_ACCESS_TOKEN` that is set. Accounts without a
    /// token only fail when they are synced.
    pub fn from_env() -> Self {
        let tokens = Account::ALL
            .into_iter()
            .filter_map(|account| {
                let token = std::env::var(account.token_var()).ok()?;
                (!token.is_empty()).then_some((account, token))
            })
            .collect::<HashMap<_, _>>();
        debug!("found access tokens for {} account(s)", tokens.len());
        Self { tokens }
    }

    pub fn access_token(&self, account: Account) -> Result<&str> {
        self.tokens
            .get(&account)
            .map(String::as_str)
            .ok_or_else(|| TallyError::MissingCredential {
                account,
                var: account.token_var(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_token_names_variable() {
        let creds = Credentials::new(HashMap::from([(Account::Bilt, "tok".to_string())]));
        assert_eq!(creds.access_token(Account::Bilt).unwrap(), "tok");
        let err = creds.access_token(Account::Venmo).unwrap_err();
        assert!(err.to_string().contains("PLAID_VENMO_ACCESS_TOKEN"), "{err}");
    }

    #[test]
    fn test_base_urls() {
        assert_eq!(PlaidEnvironment::Sandbox.base_url(), "https://sandbox.plaid.com");
        assert_eq!(PlaidEnvironment::Production.base_url(), "https://production.plaid.com");
    }
}
