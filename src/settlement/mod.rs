//! Settlement Requests
//!
//! Deciding whether a payout may be requested, building the request, and
//! tracking a single request from submission to local confirmation.

use rusty_money::MoneyError;
use thiserror::Error;

use crate::ledger::LedgerError;

pub mod flow;
pub mod policy;

pub use flow::{ABANDONED, SettlementFlow};
pub use policy::{
    BankAccount, Eligibility, MINIMUM_SETTLEMENT_MINOR, SettlementPolicy, SettlementRequest,
};

/// Errors raised while validating or tracking a settlement request.
#[derive(Debug, Error, PartialEq)]
pub enum SettlementError {
    /// Available cashback is below the policy minimum (available, minimum), in minor units.
    #[error("available cashback {0} is below the minimum settlement amount {1}")]
    BelowMinimum(i64, i64),

    /// No destination bank account is on file.
    #[error("no bank account on file")]
    MissingBankAccount,

    /// The flow cannot move from its current state with the given action.
    #[error("cannot {action} a settlement that is {state}")]
    InvalidTransition {
        /// Name of the current state
        state: &'static str,

        /// Attempted action
        action: &'static str,
    },

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// The confirmed settlement could not be recorded in the ledger.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
