//! Rewardpang prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cutoff::{CONFIRMATION_DAY, YearMonth, confirmation_cutoff, is_confirmed},
    display::{
        MonthBucket, group_by_month, mask_product_name,
        statement::{StatementError, write_months, write_summary},
    },
    fixtures::{FixtureError, LedgerFixture, load_ledger, parse_currency, parse_ledger},
    ledger::{CashbackSnapshot, Ledger, LedgerError, cashback_snapshot},
    purchases::{Buyer, PurchaseRecord},
    settlement::{
        BankAccount, Eligibility, MINIMUM_SETTLEMENT_MINOR, SettlementError, SettlementFlow,
        SettlementPolicy, SettlementRequest,
    },
    settlements::{SettlementRecord, SettlementStatus},
};
