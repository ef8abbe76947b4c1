//! Portfolio analytics over fund history.

pub mod summary;
pub mod xirr;

pub use summary::FundSummary;
pub use xirr::{CashFlow, FlowSource, fund_cash_flows, xirr};
