//! Confirmation Cutoff
//!
//! Cashback is confirmed once a month, on the [`CONFIRMATION_DAY`]. From that
//! day onwards everything up to the end of the previous month is payable;
//! before it, only purchases up to the end of the month before that.

use std::fmt;

use jiff::civil::Date;

/// Day of the month on which the previous month's cashback is confirmed.
pub const CONFIRMATION_DAY: i8 = 8;

/// A calendar month, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    /// Calendar year
    pub year: i16,

    /// Calendar month, `1..=12`
    pub month: i8,
}

impl YearMonth {
    /// Create a new year/month pair.
    #[must_use]
    pub const fn new(year: i16, month: i8) -> Self {
        Self { year, month }
    }

    /// The month a date falls in.
    #[must_use]
    pub fn of(date: Date) -> Self {
        Self::new(date.year(), date.month())
    }

    /// Step back `months` calendar months, rolling the year over as needed.
    #[must_use]
    pub fn months_before(self, months: i8) -> Self {
        let index = i32::from(self.year) * 12 + i32::from(self.month - 1) - i32::from(months);

        // Dates are bounded to years -9999..=9999, so both halves fit.
        let year = i16::try_from(index.div_euclid(12)).unwrap_or(i16::MIN);
        let month = i8::try_from(index.rem_euclid(12) + 1).unwrap_or(1);

        Self::new(year, month)
    }

    /// Whether `date` falls in this month or any month before it.
    #[must_use]
    pub fn covers(self, date: Date) -> bool {
        Self::of(date) <= self
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// The latest month whose purchases count as confirmed on `today`.
///
/// On or after the [`CONFIRMATION_DAY`] this is the previous month, before it
/// the month two months back.
#[must_use]
pub fn confirmation_cutoff(today: Date) -> YearMonth {
    let months_back = if today.day() >= CONFIRMATION_DAY { 1 } else { 2 };

    YearMonth::of(today).months_before(months_back)
}

/// Whether a purchase made on `purchase_date` is confirmed as of `today`.
#[must_use]
pub fn is_confirmed(purchase_date: Date, today: Date) -> bool {
    confirmation_cutoff(today).covers(purchase_date)
}
