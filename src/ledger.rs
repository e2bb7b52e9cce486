//! Cashback Ledger
//!
//! Aggregates purchases and settlements into a [`CashbackSnapshot`]. Every
//! figure is an exact sum of minor units; only the available balance is
//! floored at zero.

use jiff::civil::Date;
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    cutoff::{YearMonth, confirmation_cutoff},
    purchases::PurchaseRecord,
    settlements::{SettlementRecord, SettlementStatus},
};

/// Errors related to ledger construction or aggregation.
#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    /// A purchase's currency differs from the ledger currency (index, purchase currency, ledger currency).
    #[error("Purchase {0} has currency {1}, but ledger has currency {2}")]
    PurchaseCurrencyMismatch(usize, &'static str, &'static str),

    /// A settlement's currency differs from the ledger currency (index, settlement currency, ledger currency).
    #[error("Settlement {0} has currency {1}, but ledger has currency {2}")]
    SettlementCurrencyMismatch(usize, &'static str, &'static str),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Cashback figures derived from a ledger on a given day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CashbackSnapshot<'a> {
    cutoff: YearMonth,
    total: Money<'a, Currency>,
    confirmed: Money<'a, Currency>,
    paid: Money<'a, Currency>,
    pending: Money<'a, Currency>,
    available: Money<'a, Currency>,
}

impl<'a> CashbackSnapshot<'a> {
    /// Last month whose purchases were counted as confirmed
    pub fn cutoff(&self) -> YearMonth {
        self.cutoff
    }

    /// Cashback accrued over every purchase
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Cashback from purchases on or before the cutoff month
    pub fn confirmed(&self) -> Money<'a, Currency> {
        self.confirmed
    }

    /// Cashback already paid out
    pub fn paid(&self) -> Money<'a, Currency> {
        self.paid
    }

    /// Cashback committed to pending or completed settlements
    pub fn pending(&self) -> Money<'a, Currency> {
        self.pending
    }

    /// Confirmed cashback not yet committed to a settlement
    pub fn available(&self) -> Money<'a, Currency> {
        self.available
    }
}

/// Purchases and settlements for one user group, in a single currency.
#[derive(Debug, Clone)]
pub struct Ledger<'a> {
    purchases: Vec<PurchaseRecord<'a>>,
    settlements: Vec<SettlementRecord<'a>>,
    currency: &'static Currency,
}

impl<'a> Ledger<'a> {
    /// Create an empty ledger.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            purchases: Vec::new(),
            settlements: Vec::new(),
            currency,
        }
    }

    /// Create a ledger from existing records.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError`] if any record is in a different currency.
    pub fn with_records(
        purchases: impl Into<Vec<PurchaseRecord<'a>>>,
        settlements: impl Into<Vec<SettlementRecord<'a>>>,
        currency: &'static Currency,
    ) -> Result<Self, LedgerError> {
        let purchases = purchases.into();
        let settlements = settlements.into();

        check_purchase_currencies(&purchases, currency)?;

        settlements
            .iter()
            .enumerate()
            .try_for_each(|(i, settlement)| check_settlement_currency(i, settlement, currency))?;

        Ok(Self {
            purchases,
            settlements,
            currency,
        })
    }

    /// Compute the cashback snapshot as of `today`.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError`] if money arithmetic fails.
    pub fn snapshot(&self, today: Date) -> Result<CashbackSnapshot<'a>, LedgerError> {
        cashback_snapshot(&self.purchases, &self.settlements, self.currency, today)
    }

    /// Record a newly created settlement at the head of the settlement list.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError`] if the settlement is in a different currency.
    pub fn record_settlement(&mut self, settlement: SettlementRecord<'a>) -> Result<(), LedgerError> {
        check_settlement_currency(0, &settlement, self.currency)?;

        self.settlements.insert(0, settlement);

        Ok(())
    }

    /// Replace the settlement list with a freshly fetched one.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError`] if any settlement is in a different currency;
    /// the ledger is left unchanged in that case.
    pub fn replace_settlements(
        &mut self,
        settlements: impl Into<Vec<SettlementRecord<'a>>>,
    ) -> Result<(), LedgerError> {
        let settlements = settlements.into();

        settlements
            .iter()
            .enumerate()
            .try_for_each(|(i, settlement)| check_settlement_currency(i, settlement, self.currency))?;

        self.settlements = settlements;

        Ok(())
    }

    /// Purchases, in the order received
    pub fn purchases(&self) -> &[PurchaseRecord<'a>] {
        &self.purchases
    }

    /// Settlements, newest first when recorded locally
    pub fn settlements(&self) -> &[SettlementRecord<'a>] {
        &self.settlements
    }

    /// Get the currency of the ledger.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

/// Compute the cashback snapshot for the given records as of `today`.
///
/// # Errors
///
/// Returns a [`LedgerError::Money`] if any record is in a different currency.
pub fn cashback_snapshot<'a>(
    purchases: &[PurchaseRecord<'a>],
    settlements: &[SettlementRecord<'a>],
    currency: &'static Currency,
    today: Date,
) -> Result<CashbackSnapshot<'a>, LedgerError> {
    let cutoff = confirmation_cutoff(today);

    let total = sum(currency, purchases.iter().map(|purchase| purchase.reward))?;

    let confirmed = sum(
        currency,
        purchases
            .iter()
            .filter(|purchase| cutoff.covers(purchase.purchase_date))
            .map(|purchase| purchase.reward),
    )?;

    let paid = sum(
        currency,
        settlements
            .iter()
            .filter(|settlement| settlement.status == SettlementStatus::Completed)
            .map(|settlement| settlement.settlement_amount),
    )?;

    let pending = sum(
        currency,
        settlements
            .iter()
            .filter(|settlement| settlement.status.is_committed())
            .map(|settlement| settlement.settlement_amount),
    )?;

    let remaining = confirmed.sub(pending)?;

    let available = if remaining.to_minor_units() < 0 {
        Money::from_minor(0, currency)
    } else {
        remaining
    };

    Ok(CashbackSnapshot {
        cutoff,
        total,
        confirmed,
        paid,
        pending,
        available,
    })
}

pub(crate) fn sum<'a>(
    currency: &'static Currency,
    amounts: impl IntoIterator<Item = Money<'a, Currency>>,
) -> Result<Money<'a, Currency>, MoneyError> {
    amounts
        .into_iter()
        .try_fold(Money::from_minor(0, currency), |acc, amount| acc.add(amount))
}

pub(crate) fn check_purchase_currencies(
    purchases: &[PurchaseRecord<'_>],
    currency: &'static Currency,
) -> Result<(), LedgerError> {
    purchases.iter().enumerate().try_for_each(|(i, purchase)| {
        let purchase_currency = purchase.currency();

        if purchase_currency == currency && purchase.purchase_amount.currency() == currency {
            Ok(())
        } else {
            Err(LedgerError::PurchaseCurrencyMismatch(
                i,
                purchase_currency.iso_alpha_code,
                currency.iso_alpha_code,
            ))
        }
    })
}

fn check_settlement_currency(
    index: usize,
    settlement: &SettlementRecord<'_>,
    currency: &'static Currency,
) -> Result<(), LedgerError> {
    let settlement_currency = settlement.currency();

    if settlement_currency == currency {
        Ok(())
    } else {
        Err(LedgerError::SettlementCurrencyMismatch(
            index,
            settlement_currency.iso_alpha_code,
            currency.iso_alpha_code,
        ))
    }
}
