//! Mutual fund holdings.
//!
//! This module implements the rules that keep a fund's aggregate columns in
//! step with its transaction history:
//! - Weighted-average position maintenance
//! - Buy/sell trades with charge splitting
//! - Fund-to-fund switches as a pair of linked legs
//! - Exact reversal of a recorded transaction
//!
//! Every operation validates first and mutates only on success, so a failed
//! call leaves the position untouched.

pub mod error;
pub mod position;
pub mod reversal;
pub mod switch;
pub mod trade;
pub mod types;

#[cfg(test)]
mod position_props;

pub use error::FundError;
pub use position::FundPosition;
pub use reversal::RecordedMfTransaction;
pub use switch::{SwitchInput, SwitchLeg, SwitchPlan, plan_switch};
pub use trade::{ChargeSplit, TradeInput, TradeOutcome, TradeSide};
pub use types::MfTransactionType;
