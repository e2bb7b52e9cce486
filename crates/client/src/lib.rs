//! Rewardpang Client
//!
//! Backend API client and session orchestration for the Rewardpang cashback
//! screen, built on the `rewardpang` ledger calculator.

pub mod api;
pub mod config;
pub mod observability;
pub mod session;
