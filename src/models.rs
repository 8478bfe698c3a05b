use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

/// The payment cards tracked by tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, clap::ValueEnum)]
pub enum Account {
    #[value(name = "chase_prime")]
    ChasePrime,
    #[value(name = "bilt")]
    Bilt,
    #[value(name = "venmo")]
    Venmo,
}

impl Account {
    pub const ALL: [Account; 3] = [Account::ChasePrime, Account::Bilt, Account::Venmo];

    /// Tag written into stored transactions.
    pub fn tag(&self) -> &'static str {
        match self {
            Account::ChasePrime => "CHASEPRIME",
            Account::Bilt => "BILT",
            Account::Venmo => "VENMO",
        }
    }

    /// Key used in the cursor file.
    pub fn cursor_key(&self) -> String {
        self.tag().to_lowercase()
    }

    /// Environment variable holding this account's access token.
    pub fn token_var(&self) -> String {
        format!("PLAID_{}_ACCESS_TOKEN", self.tag())
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Account {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Account::ALL
            .into_iter()
            .find(|a| a.tag().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown account tag '{s}'"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub transaction_id: String,
    /// Seconds since the epoch.
    pub datetime: i64,
    pub amount: Decimal,
    pub name: String,
    pub merchant_name: Option<String>,
    pub plaid_category: Option<String>,
    pub plaid_subcategory: Option<String>,
    pub account: Account,
    pub is_categorized: bool,
    pub my_category: Option<String>,
}

/// Columns exactly as they sit in the `transactions` table, before validation.
#[derive(Debug, Clone)]
pub struct StoredRow {
    pub transaction_id: String,
    pub datetime: i64,
    pub amount: String,
    pub name: String,
    pub merchant_name: Option<String>,
    pub plaid_category: Option<String>,
    pub plaid_subcategory: Option<String>,
    pub account: String,
    pub is_categorized: bool,
    pub my_category: Option<String>,
}

impl TryFrom<StoredRow> for Transaction {
    type Error = crate::error::TallyError;

    fn try_from(row: StoredRow) -> Result<Self, Self::Error> {
        let invalid = |reason: String| crate::error::TallyError::InvalidRecord {
            id: row.transaction_id.clone(),
            reason,
        };
        let amount = Decimal::from_str(&row.amount)
            .map_err(|e| invalid(format!("amount '{}': {e}", row.amount)))?;
        let account = Account::from_str(&row.account).map_err(invalid)?;
        Ok(Transaction {
            transaction_id: row.transaction_id,
            datetime: row.datetime,
            amount,
            name: row.name,
            merchant_name: row.merchant_name,
            plaid_category: row.plaid_category,
            plaid_subcategory: row.plaid_subcategory,
            account,
            is_categorized: row.is_categorized,
            my_category: row.my_category,
        })
    }
}
