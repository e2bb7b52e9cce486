//! Settlements

use std::fmt;

use jiff::civil::Date;
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;

/// Lifecycle of a settlement request on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementStatus {
    /// Requested, not yet paid out
    Pending,

    /// Paid out
    Completed,

    /// Refused by the backend; the amount is released back to the user
    Rejected,
}

impl SettlementStatus {
    /// Whether the settlement holds against the confirmed balance.
    #[must_use]
    pub const fn is_committed(self) -> bool {
        matches!(self, Self::Pending | Self::Completed)
    }

    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to pay out cashback, as recorded by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementRecord<'a> {
    /// Upstream identifier
    pub id: String,

    /// Group the settlement was requested for
    pub user_group_id: String,

    /// Amount originally requested
    pub amount: Money<'a, Currency>,

    /// Amount committed against the confirmed balance
    pub settlement_amount: Money<'a, Currency>,

    /// Destination account number
    pub bank_account_number: String,

    /// Current status
    pub status: SettlementStatus,

    /// Date the request was made
    pub application_date: Date,

    /// Date the payout happened, once paid
    pub settlement_date: Option<Date>,
}

impl<'a> SettlementRecord<'a> {
    /// Create a settlement for `amount` with the given status.
    pub fn new(amount: Money<'a, Currency>, status: SettlementStatus, application_date: Date) -> Self {
        Self {
            id: String::new(),
            user_group_id: String::new(),
            amount,
            settlement_amount: amount,
            bank_account_number: String::new(),
            status,
            application_date,
            settlement_date: None,
        }
    }

    /// Currency of the settlement amount.
    pub fn currency(&self) -> &'a Currency {
        self.settlement_amount.currency()
    }
}
