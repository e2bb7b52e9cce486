//! Cashback statement
//!
//! Renders a snapshot summary followed by the monthly purchase breakdown.

use std::io;

use jiff::civil::Date;
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use thiserror::Error;

use crate::{
    cutoff::YearMonth,
    display::{mask::mask_product_name, months::group_by_month},
    ledger::{CashbackSnapshot, Ledger, LedgerError},
    purchases::PurchaseRecord,
};

/// Errors that can occur when writing a statement.
#[derive(Debug, Error)]
pub enum StatementError {
    /// Month grouping failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Writing to the output failed.
    #[error("failed to write statement")]
    IO,
}

/// Write the snapshot summary as a two-column table.
///
/// # Errors
///
/// Returns [`StatementError::IO`] if the output cannot be written.
pub fn write_summary(
    mut out: impl io::Write,
    snapshot: &CashbackSnapshot<'_>,
) -> Result<(), StatementError> {
    let mut builder = Builder::default();

    builder.push_record(["Cashback".to_string(), "Amount".to_string()]);
    builder.push_record(["Accrued".to_string(), snapshot.total().to_string()]);
    builder.push_record([
        format!("Confirmed (through {})", snapshot.cutoff()),
        snapshot.confirmed().to_string(),
    ]);
    builder.push_record(["Paid".to_string(), snapshot.paid().to_string()]);
    builder.push_record(["Pending".to_string(), snapshot.pending().to_string()]);
    builder.push_record(["Available".to_string(), snapshot.available().to_string()]);

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Columns::new(1..2), Alignment::right());

    writeln!(out, "{table}").map_err(|_err| StatementError::IO)
}

/// Write every purchase, grouped by month, newest first.
///
/// Product names are masked. Purchases whose exact day is unknown show only
/// the month.
///
/// # Errors
///
/// - [`StatementError::Ledger`]: a purchase is in a different currency.
/// - [`StatementError::IO`]: the output cannot be written.
pub fn write_months(
    mut out: impl io::Write,
    ledger: &Ledger<'_>,
    today: Date,
) -> Result<(), StatementError> {
    let buckets = group_by_month(ledger.purchases(), ledger.currency())?;

    let mut builder = Builder::default();

    builder.push_record([
        "Month".to_string(),
        "Date".to_string(),
        "Product".to_string(),
        "Purchase".to_string(),
        "Cashback".to_string(),
    ]);

    for bucket in &buckets {
        let status = if bucket.is_confirmed(today) {
            "confirmed"
        } else {
            "unconfirmed"
        };

        builder.push_record([
            bucket.label_ko(),
            status.to_string(),
            String::new(),
            String::new(),
            bucket.reward_total().to_string(),
        ]);

        for purchase in bucket
            .purchases()
            .iter()
            .filter_map(|&idx| ledger.purchases().get(idx))
        {
            builder.push_record([
                String::new(),
                purchase_date_label(purchase),
                mask_product_name(&purchase.product_name),
                purchase.purchase_amount.to_string(),
                purchase.reward.to_string(),
            ]);
        }
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Columns::new(3..5), Alignment::right());

    writeln!(out, "{table}").map_err(|_err| StatementError::IO)
}

/// The purchase day, or only its month prefixed with `~` when the backend
/// does not know the exact day.
fn purchase_date_label(purchase: &PurchaseRecord<'_>) -> String {
    if purchase.exact_purchase_date {
        purchase.purchase_date.to_string()
    } else {
        format!("~{}", YearMonth::of(purchase.purchase_date))
    }
}
