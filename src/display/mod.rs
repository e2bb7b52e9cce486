//! Display transforms
//!
//! Presentation helpers shared by every screen that lists purchases. None of
//! these affect the ledger figures.

pub mod mask;
pub mod months;
pub mod statement;

pub use mask::mask_product_name;
pub use months::{MonthBucket, group_by_month};
