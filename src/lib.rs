//! Rewardpang
//!
//! Cashback ledger calculations for the Rewardpang referral programme: which
//! purchases are confirmed, how much cashback is available to settle, and
//! whether a settlement may be requested.

pub mod cutoff;
pub mod display;
pub mod fixtures;
pub mod ledger;
pub mod prelude;
pub mod purchases;
pub mod settlement;
pub mod settlements;
