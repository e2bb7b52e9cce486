//! Settlement Policy

use rusty_money::{Money, iso::Currency};
use serde::Deserialize;

use crate::{ledger::CashbackSnapshot, settlement::SettlementError};

/// Smallest payout that may be requested, in minor units.
pub const MINIMUM_SETTLEMENT_MINOR: i64 = 10_000;

/// Destination account for payouts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BankAccount {
    /// Name of the bank
    pub bank_name: String,

    /// Account number
    pub account_number: String,

    /// Name on the account
    pub account_holder: String,
}

/// Outcome of checking whether a settlement may be requested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Eligibility<'a> {
    /// A settlement of `amount` may be requested.
    Eligible {
        /// The full available balance
        amount: Money<'a, Currency>,
    },

    /// Not enough confirmed cashback is available.
    BelowMinimum {
        /// Available balance
        available: Money<'a, Currency>,

        /// Policy minimum
        minimum: Money<'a, Currency>,
    },

    /// Enough is available, but there is nowhere to pay it.
    MissingBankAccount,
}

impl Eligibility<'_> {
    /// Whether a settlement may be requested.
    #[must_use]
    pub const fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible { .. })
    }
}

/// Payload for a settlement request: always the full available balance.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementRequest<'a> {
    /// Requested amount
    pub amount: Money<'a, Currency>,

    /// Destination bank
    pub bank_name: String,

    /// Destination account number
    pub account_number: String,

    /// Destination account holder
    pub account_holder: String,

    /// Group the cashback belongs to
    pub user_group_id: String,
}

/// Rules a settlement request must satisfy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettlementPolicy<'a> {
    minimum: Money<'a, Currency>,
}

impl<'a> SettlementPolicy<'a> {
    /// Create a policy with the given minimum payout.
    pub const fn new(minimum: Money<'a, Currency>) -> Self {
        Self { minimum }
    }

    /// The standard policy: a minimum of [`MINIMUM_SETTLEMENT_MINOR`] in `currency`.
    pub fn standard(currency: &'static Currency) -> Self {
        Self::new(Money::from_minor(MINIMUM_SETTLEMENT_MINOR, currency))
    }

    /// Minimum payout
    pub fn minimum(&self) -> Money<'a, Currency> {
        self.minimum
    }

    /// Check whether the snapshot's available balance may be settled.
    ///
    /// A balance below the minimum is reported before a missing bank account.
    ///
    /// # Errors
    ///
    /// Returns a [`SettlementError::Money`] if the snapshot and policy currencies differ.
    pub fn eligibility(
        &self,
        snapshot: &CashbackSnapshot<'a>,
        bank_account: Option<&BankAccount>,
    ) -> Result<Eligibility<'a>, SettlementError> {
        let available = snapshot.available();

        if available.sub(self.minimum)?.to_minor_units() < 0 {
            return Ok(Eligibility::BelowMinimum {
                available,
                minimum: self.minimum,
            });
        }

        if bank_account.is_none() {
            return Ok(Eligibility::MissingBankAccount);
        }

        Ok(Eligibility::Eligible { amount: available })
    }

    /// Build a request settling the whole available balance.
    ///
    /// # Errors
    ///
    /// - [`SettlementError::BelowMinimum`]: not enough confirmed cashback is available.
    /// - [`SettlementError::MissingBankAccount`]: no bank account is on file.
    /// - [`SettlementError::Money`]: the snapshot and policy currencies differ.
    pub fn request(
        &self,
        snapshot: &CashbackSnapshot<'a>,
        bank_account: Option<&BankAccount>,
        user_group_id: &str,
    ) -> Result<SettlementRequest<'a>, SettlementError> {
        match (self.eligibility(snapshot, bank_account)?, bank_account) {
            (Eligibility::Eligible { amount }, Some(account)) => Ok(SettlementRequest {
                amount,
                bank_name: account.bank_name.clone(),
                account_number: account.account_number.clone(),
                account_holder: account.account_holder.clone(),
                user_group_id: user_group_id.to_string(),
            }),
            (Eligibility::BelowMinimum { available, minimum }, _) => Err(
                SettlementError::BelowMinimum(available.to_minor_units(), minimum.to_minor_units()),
            ),
            _ => Err(SettlementError::MissingBankAccount),
        }
    }
}
