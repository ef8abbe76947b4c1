//! Extended internal rate of return.
//!
//! The solver iterates in `f64`; inputs and the reported rate are `Decimal`.
#![allow(
    clippy::float_arithmetic,
    clippy::float_cmp,
    clippy::cast_precision_loss
)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

use crate::fund::MfTransactionType;

const DAYS_PER_YEAR: f64 = 365.25;
const INITIAL_GUESS: f64 = 0.1;
const TOLERANCE: f64 = 1.48e-8;
const MAX_ITERATIONS: usize = 50;

/// A dated cash flow; negative amounts are money paid in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CashFlow {
    /// Date of the flow.
    pub date: NaiveDate,
    /// Signed amount.
    pub amount: Decimal,
}

/// The parts of a fund transaction that shape its cash flow.
pub trait FlowSource {
    /// Kind of the transaction.
    fn transaction_type(&self) -> MfTransactionType;
    /// Date of the transaction.
    fn transaction_date(&self) -> NaiveDate;
    /// Fund-level amount, before charges.
    fn amount_excluding_charges(&self) -> Decimal;
}

/// Builds the cash flows of a fund: money in for buys and switch-ins, money
/// out for sells and switch-outs, and the current value as a final inflow.
///
/// Returns an empty list when there are no transactions.
pub fn fund_cash_flows<T: FlowSource>(
    transactions: &[T],
    current_value: Decimal,
    as_of: NaiveDate,
) -> Vec<CashFlow> {
    if transactions.is_empty() {
        return Vec::new();
    }
    let mut flows: Vec<CashFlow> = transactions
        .iter()
        .map(|tx| {
            let amount = tx.amount_excluding_charges();
            CashFlow {
                date: tx.transaction_date(),
                amount: if tx.transaction_type().adds_units() {
                    -amount
                } else {
                    amount
                },
            }
        })
        .collect();
    flows.push(CashFlow {
        date: as_of,
        amount: current_value,
    });
    flows
}

/// Annualized return of `flows` as a percentage rounded to two places.
///
/// Solved with Newton-Raphson from a 10% guess. Returns zero when there are
/// no flows or the iteration does not converge.
#[must_use]
pub fn xirr(flows: &[CashFlow]) -> Decimal {
    solve(flows)
        .and_then(|rate| Decimal::from_f64(rate * 100.0))
        .map_or(Decimal::ZERO, |pct| pct.round_dp(2))
}

fn solve(flows: &[CashFlow]) -> Option<f64> {
    let base = flows.iter().map(|f| f.date).min()?;
    let points: Vec<(f64, f64)> = flows
        .iter()
        .map(|f| {
            let years = (f.date - base).num_days() as f64 / DAYS_PER_YEAR;
            f.amount.to_f64().map(|amount| (amount, years))
        })
        .collect::<Option<_>>()?;

    let mut rate = INITIAL_GUESS;
    for _ in 0..MAX_ITERATIONS {
        let growth = 1.0 + rate;
        if growth <= 0.0 {
            return None;
        }
        let (npv, slope) = points.iter().fold((0.0, 0.0), |(npv, slope), &(cf, t)| {
            let discount = growth.powf(t);
            (npv + cf / discount, slope - cf * t / (discount * growth))
        });
        if slope == 0.0 || !slope.is_finite() {
            return None;
        }
        let next = rate - npv / slope;
        if !next.is_finite() {
            return None;
        }
        if (next - rate).abs() < TOLERANCE {
            return Some(next);
        }
        rate = next;
    }
    None
}
