//! Holding summaries for funds and fund families.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::fund::FundPosition;
use crate::precision;

/// Unrealized performance of a holding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FundSummary {
    /// Units held.
    pub total_units: Decimal,
    /// Cost of the units held.
    pub total_invested: Decimal,
    /// Market value of the units held.
    pub current_value: Decimal,
    /// `current_value - total_invested`.
    pub unrealized_pnl: Decimal,
    /// Unrealized P&L as a percentage of the cost, two places.
    pub unrealized_pnl_percentage: Decimal,
}

impl FundSummary {
    /// Summarizes a single fund.
    #[must_use]
    pub fn of(position: &FundPosition) -> Self {
        Self::from_totals(
            position.total_units,
            position.invested_amount(),
            position.current_value,
        )
    }

    /// Sums several summaries, e.g. every fund of one AMC.
    #[must_use]
    pub fn combine<'a, I>(summaries: I) -> Self
    where
        I: IntoIterator<Item = &'a Self>,
    {
        let (units, invested, value) = summaries.into_iter().fold(
            (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
            |(units, invested, value), s| {
                (
                    units + s.total_units,
                    invested + s.total_invested,
                    value + s.current_value,
                )
            },
        );
        Self::from_totals(units, invested, value)
    }

    /// Weighted-average cost across the combined units, zero when empty.
    #[must_use]
    pub fn average_cost_per_unit(&self) -> Decimal {
        if self.total_units.is_zero() {
            Decimal::ZERO
        } else {
            precision::aggregate(self.total_invested / self.total_units)
        }
    }

    fn from_totals(total_units: Decimal, total_invested: Decimal, current_value: Decimal) -> Self {
        let unrealized_pnl = current_value - total_invested;
        let unrealized_pnl_percentage = if total_invested.is_zero() {
            Decimal::ZERO
        } else {
            precision::cash(unrealized_pnl / total_invested * Decimal::ONE_HUNDRED)
        };
        Self {
            total_units,
            total_invested,
            current_value,
            unrealized_pnl,
            unrealized_pnl_percentage,
        }
    }
}
