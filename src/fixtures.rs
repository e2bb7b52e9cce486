//! Ledger files
//!
//! Loads a ledger export from YAML, for offline statements and tests.
//!
//! ```yaml
//! currency: KRW
//! user_group_id: group-1
//! bank_account:
//!   bank_name: Toss Bank
//!   account_number: 1000-1234-5678
//!   account_holder: Hong
//! purchases:
//!   - product_name: Wireless Earbuds
//!     purchase_amount: 59000
//!     reward: 1180
//!     purchase_date: 2024-01-15
//! settlements:
//!   - amount: 10000
//!     status: completed
//!     application_date: 2024-01-10
//! ```

use std::{fs, path::Path};

use jiff::civil::Date;
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, JPY, KRW, USD},
};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    ledger::{Ledger, LedgerError},
    purchases::PurchaseRecord,
    settlement::BankAccount,
    settlements::{SettlementRecord, SettlementStatus},
};

/// Ledger file errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading the ledger file
    #[error("Failed to read ledger file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Records could not form a ledger
    #[error("Invalid ledger: {0}")]
    Ledger(#[from] LedgerError),
}

/// A ledger loaded from a file, with the account details needed to settle it.
#[derive(Debug, Clone)]
pub struct LedgerFixture<'a> {
    /// Purchases and settlements
    pub ledger: Ledger<'a>,

    /// Payout account, if one is on file
    pub bank_account: Option<BankAccount>,

    /// Group the ledger belongs to
    pub user_group_id: String,
}

#[derive(Debug, Deserialize)]
struct LedgerDocument {
    currency: String,

    #[serde(default)]
    user_group_id: String,

    #[serde(default)]
    bank_account: Option<BankAccount>,

    #[serde(default)]
    purchases: Vec<PurchaseEntry>,

    #[serde(default)]
    settlements: Vec<SettlementEntry>,
}

#[derive(Debug, Deserialize)]
struct PurchaseEntry {
    #[serde(default)]
    id: String,

    #[serde(default)]
    order_id: String,

    #[serde(default)]
    product_name: String,

    #[serde(default)]
    purchase_amount: i64,

    reward: i64,

    purchase_date: Date,

    #[serde(default = "default_exact")]
    exact_purchase_date: bool,

    #[serde(default)]
    status: String,
}

#[derive(Debug, Deserialize)]
struct SettlementEntry {
    #[serde(default)]
    id: String,

    amount: i64,

    #[serde(default)]
    settlement_amount: Option<i64>,

    status: SettlementStatus,

    application_date: Date,

    #[serde(default)]
    settlement_date: Option<Date>,

    #[serde(default)]
    bank_account_number: String,
}

const fn default_exact() -> bool {
    true
}

/// Look up a supported currency by ISO code.
///
/// # Errors
///
/// Returns [`FixtureError::UnknownCurrency`] for unsupported codes.
pub fn parse_currency(code: &str) -> Result<&'static Currency, FixtureError> {
    match code {
        "KRW" => Ok(KRW),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        "GBP" => Ok(GBP),
        "JPY" => Ok(JPY),
        other => Err(FixtureError::UnknownCurrency(other.to_string())),
    }
}

/// Load a ledger from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if its records
/// do not share the declared currency.
pub fn load_ledger(path: impl AsRef<Path>) -> Result<LedgerFixture<'static>, FixtureError> {
    let contents = fs::read_to_string(path)?;

    parse_ledger(&contents)
}

/// Parse a ledger from YAML text.
///
/// # Errors
///
/// Returns an error if the text cannot be parsed, or if its records do not
/// share the declared currency.
pub fn parse_ledger(contents: &str) -> Result<LedgerFixture<'static>, FixtureError> {
    let document: LedgerDocument = serde_norway::from_str(contents)?;
    let currency = parse_currency(&document.currency)?;

    let purchases: Vec<PurchaseRecord<'static>> = document
        .purchases
        .into_iter()
        .map(|entry| PurchaseRecord {
            id: entry.id,
            order_id: entry.order_id,
            product_name: entry.product_name,
            purchase_amount: Money::from_minor(entry.purchase_amount, currency),
            reward: Money::from_minor(entry.reward, currency),
            purchase_date: entry.purchase_date,
            exact_purchase_date: entry.exact_purchase_date,
            status: entry.status,
            buyer: None,
        })
        .collect();

    let user_group_id = document.user_group_id;

    let settlements: Vec<SettlementRecord<'static>> = document
        .settlements
        .into_iter()
        .map(|entry| SettlementRecord {
            id: entry.id,
            user_group_id: user_group_id.clone(),
            amount: Money::from_minor(entry.amount, currency),
            settlement_amount: Money::from_minor(
                entry.settlement_amount.unwrap_or(entry.amount),
                currency,
            ),
            bank_account_number: entry.bank_account_number,
            status: entry.status,
            application_date: entry.application_date,
            settlement_date: entry.settlement_date,
        })
        .collect();

    Ok(LedgerFixture {
        ledger: Ledger::with_records(purchases, settlements, currency)?,
        bank_account: document.bank_account,
        user_group_id,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use jiff::civil::date;
    use testresult::TestResult;

    use super::*;

    const LEDGER: &str = "
currency: KRW
user_group_id: group-7
bank_account:
  bank_name: Toss Bank
  account_number: 1000-1234-5678
  account_holder: Hong
purchases:
  - product_name: Wireless Earbuds
    purchase_amount: 59000
    reward: 12000
    purchase_date: 2024-01-15
  - product_name: Coffee Beans
    purchase_amount: 18000
    reward: 360
    purchase_date: 2024-02-02
    exact_purchase_date: false
settlements:
  - amount: 2000
    status: completed
    application_date: 2024-01-10
    settlement_date: 2024-01-15
  - amount: 500
    status: rejected
    application_date: 2024-01-11
";

    #[test]
    fn parses_ledger_document() -> TestResult {
        let fixture = parse_ledger(LEDGER)?;

        assert_eq!(fixture.user_group_id, "group-7");
        assert_eq!(fixture.ledger.purchases().len(), 2);
        assert_eq!(fixture.ledger.settlements().len(), 2);
        assert_eq!(
            fixture.bank_account.map(|account| account.bank_name),
            Some("Toss Bank".to_string())
        );

        let snapshot = fixture.ledger.snapshot(date(2024, 2, 8))?;
        assert_eq!(snapshot.total(), Money::from_minor(12_360, KRW));
        assert_eq!(snapshot.confirmed(), Money::from_minor(12_000, KRW));
        assert_eq!(snapshot.paid(), Money::from_minor(2_000, KRW));
        assert_eq!(snapshot.available(), Money::from_minor(10_000, KRW));

        Ok(())
    }

    #[test]
    fn loads_from_file() -> TestResult {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(LEDGER.as_bytes())?;

        let fixture = load_ledger(file.path())?;

        assert_eq!(fixture.ledger.currency(), KRW);

        Ok(())
    }

    #[test]
    fn rejects_unknown_currency() {
        let result = parse_ledger("currency: XYZ\n");

        assert!(matches!(result, Err(FixtureError::UnknownCurrency(code)) if code == "XYZ"));
    }

    #[test]
    fn rejects_unknown_settlement_status() {
        let result = parse_ledger(
            "currency: KRW\nsettlements:\n  - amount: 1\n    status: paid\n    application_date: 2024-01-01\n",
        );

        assert!(matches!(result, Err(FixtureError::Yaml(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = load_ledger("/definitely/not/here.yml");

        assert!(matches!(result, Err(FixtureError::Io(_))));
    }
}
