//! Purchases

use jiff::civil::Date;
use rusty_money::{Money, iso::Currency};

/// Who made a purchase attributed to the group's referral link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Buyer {
    /// A buyer known only by an opaque label.
    Anonymous(String),

    /// A registered member of the group.
    Member {
        /// Member identifier
        id: String,

        /// Member phone number, as reported upstream
        phone: String,

        /// Whether the member is the signed-in user
        is_me: bool,
    },
}

/// A purchase attributed to a referral link, together with the cashback it earned.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseRecord<'a> {
    /// Upstream identifier
    pub id: String,

    /// Merchant order identifier
    pub order_id: String,

    /// Product name, as reported by the merchant
    pub product_name: String,

    /// Amount the buyer paid
    pub purchase_amount: Money<'a, Currency>,

    /// Cashback earned by the purchase
    pub reward: Money<'a, Currency>,

    /// Date the purchase is attributed to
    pub purchase_date: Date,

    /// Whether `purchase_date` is the exact day or an estimate
    pub exact_purchase_date: bool,

    /// Upstream attribution status; carried through, never interpreted
    pub status: String,

    /// Buyer details, when known
    pub buyer: Option<Buyer>,
}

impl<'a> PurchaseRecord<'a> {
    /// Create a purchase with the amounts and date that matter to the ledger.
    pub fn new(
        reward: Money<'a, Currency>,
        purchase_amount: Money<'a, Currency>,
        purchase_date: Date,
    ) -> Self {
        Self {
            id: String::new(),
            order_id: String::new(),
            product_name: String::new(),
            purchase_amount,
            reward,
            purchase_date,
            exact_purchase_date: true,
            status: String::new(),
            buyer: None,
        }
    }

    /// Set the product name.
    #[must_use]
    pub fn with_product_name(mut self, product_name: impl Into<String>) -> Self {
        self.product_name = product_name.into();
        self
    }

    /// Set the upstream identifiers.
    #[must_use]
    pub fn with_ids(mut self, id: impl Into<String>, order_id: impl Into<String>) -> Self {
        self.id = id.into();
        self.order_id = order_id.into();
        self
    }

    /// Mark whether the purchase date is the exact day.
    #[must_use]
    pub fn with_exact_purchase_date(mut self, exact: bool) -> Self {
        self.exact_purchase_date = exact;
        self
    }

    /// Currency of the reward.
    pub fn currency(&self) -> &'a Currency {
        self.reward.currency()
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use rusty_money::iso::KRW;

    use super::*;

    #[test]
    fn builder_sets_display_fields() {
        let purchase = PurchaseRecord::new(
            Money::from_minor(500, KRW),
            Money::from_minor(25_000, KRW),
            date(2024, 3, 4),
        )
        .with_product_name("무선 이어폰")
        .with_ids("p-1", "o-1");

        assert_eq!(purchase.product_name, "무선 이어폰");
        assert_eq!(purchase.id, "p-1");
        assert_eq!(purchase.order_id, "o-1");
        assert_eq!(purchase.currency(), KRW);
        assert!(purchase.buyer.is_none());
    }
}
