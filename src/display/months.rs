//! Month buckets
//!
//! Purchases grouped by the month they are attributed to, newest month first.
//! Presentation only; the ledger works from the flat purchase list.

use jiff::civil::Date;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;

use crate::{
    cutoff::{YearMonth, confirmation_cutoff},
    ledger::{LedgerError, check_purchase_currencies},
    purchases::PurchaseRecord,
};

/// Purchases made in a single calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthBucket<'a> {
    month: YearMonth,

    /// Indexes of the member purchases, in input order
    purchases: SmallVec<[usize; 8]>,

    reward_total: Money<'a, Currency>,
}

impl<'a> MonthBucket<'a> {
    fn empty(month: YearMonth, currency: &'static Currency) -> Self {
        Self {
            month,
            purchases: SmallVec::new(),
            reward_total: Money::from_minor(0, currency),
        }
    }

    /// The month this bucket covers
    pub fn month(&self) -> YearMonth {
        self.month
    }

    /// Indexes of the member purchases in the grouped slice
    pub fn purchases(&self) -> &[usize] {
        &self.purchases
    }

    /// Sum of the member purchases' cashback
    pub fn reward_total(&self) -> Money<'a, Currency> {
        self.reward_total
    }

    /// Whether the month's cashback is confirmed as of `today`.
    pub fn is_confirmed(&self, today: Date) -> bool {
        self.month <= confirmation_cutoff(today)
    }

    /// Korean heading for the month, e.g. `2024년 1월`.
    pub fn label_ko(&self) -> String {
        format!("{}년 {}월", self.month.year, self.month.month)
    }
}

/// Group purchases by month, newest month first.
///
/// # Errors
///
/// Returns a [`LedgerError`] if any purchase is in a different currency.
pub fn group_by_month<'a>(
    purchases: &[PurchaseRecord<'a>],
    currency: &'static Currency,
) -> Result<Vec<MonthBucket<'a>>, LedgerError> {
    check_purchase_currencies(purchases, currency)?;

    let mut buckets: FxHashMap<YearMonth, MonthBucket<'a>> = FxHashMap::default();

    for (idx, purchase) in purchases.iter().enumerate() {
        let month = YearMonth::of(purchase.purchase_date);
        let bucket = buckets
            .entry(month)
            .or_insert_with(|| MonthBucket::empty(month, currency));

        bucket.reward_total = bucket.reward_total.add(purchase.reward)?;
        bucket.purchases.push(idx);
    }

    let mut buckets: Vec<MonthBucket<'a>> = buckets.into_values().collect();

    buckets.sort_unstable_by(|a, b| b.month.cmp(&a.month));

    Ok(buckets)
}
