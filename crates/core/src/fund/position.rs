//! Weighted-average fund position.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::FundError;
use crate::precision;

/// Aggregate state of a mutual fund, mirroring the columns on `mutual_funds`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundPosition {
    /// Units currently held.
    pub total_units: Decimal,
    /// Weighted-average cost of the units held.
    pub average_cost_per_unit: Decimal,
    /// Most recent NAV seen.
    pub latest_nav: Decimal,
    /// When `latest_nav` was last set.
    pub last_nav_update: Option<NaiveDateTime>,
    /// `total_units * latest_nav`.
    pub current_value: Decimal,
    /// Cumulative realized gain from sells and switch-outs.
    pub total_realized_gain: Decimal,
    /// Cost basis currently invested, including value switched in.
    pub total_invested_cash: Decimal,
    /// Cash invested from outside the fund family (buys less sells).
    pub external_cash_invested: Decimal,
}

impl FundPosition {
    /// Cost of the units currently held.
    #[must_use]
    pub fn invested_amount(&self) -> Decimal {
        precision::aggregate(self.total_units * self.average_cost_per_unit)
    }

    /// Returns true if the fund holds no units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_units.is_zero()
    }

    /// Cost basis of `units` at the current average cost.
    #[must_use]
    pub fn cost_basis_of(&self, units: Decimal) -> Decimal {
        precision::aggregate(units * self.average_cost_per_unit)
    }

    /// Fails unless at least `units` are held.
    ///
    /// # Errors
    ///
    /// Returns `FundError::InsufficientUnits` when holdings are short.
    pub fn ensure_units_available(&self, units: Decimal) -> Result<(), FundError> {
        if units > self.total_units {
            return Err(FundError::InsufficientUnits {
                available: self.total_units,
                requested: units,
            });
        }
        Ok(())
    }

    /// Changes the holding by `units_change`, folding `cost_change` into the
    /// weighted average.
    ///
    /// The new average is `(units * average + cost_change) / new_units`, and
    /// resets to zero when the holding is emptied.
    ///
    /// # Errors
    ///
    /// Returns `FundError::InsufficientUnits` if the holding would go negative.
    pub fn adjust_holding(
        &mut self,
        units_change: Decimal,
        cost_change: Decimal,
    ) -> Result<(), FundError> {
        let new_units = precision::units(self.total_units + units_change);
        if new_units < Decimal::ZERO {
            return Err(FundError::InsufficientUnits {
                available: self.total_units,
                requested: -units_change,
            });
        }

        self.average_cost_per_unit = if new_units.is_zero() {
            Decimal::ZERO
        } else {
            let invested = self.total_units * self.average_cost_per_unit + cost_change;
            precision::aggregate(invested / new_units).max(Decimal::ZERO)
        };
        self.total_units = new_units;
        self.revalue();
        Ok(())
    }

    /// Removes `units` at the current average cost and returns their cost basis.
    ///
    /// The average is left unchanged unless the holding is emptied.
    ///
    /// # Errors
    ///
    /// Returns `FundError::InsufficientUnits` if fewer than `units` are held.
    pub fn remove_at_average(&mut self, units: Decimal) -> Result<Decimal, FundError> {
        self.ensure_units_available(units)?;
        let cost_basis = self.cost_basis_of(units);
        self.total_units = precision::units(self.total_units - units);
        if self.total_units.is_zero() {
            self.average_cost_per_unit = Decimal::ZERO;
        }
        self.revalue();
        Ok(cost_basis)
    }

    /// Records a new NAV and recomputes `current_value`.
    ///
    /// # Errors
    ///
    /// Returns `FundError::NonPositiveNav` if `nav` is not positive.
    pub fn update_nav(&mut self, nav: Decimal, at: NaiveDateTime) -> Result<(), FundError> {
        if nav <= Decimal::ZERO {
            return Err(FundError::NonPositiveNav);
        }
        self.latest_nav = precision::price(nav);
        self.last_nav_update = Some(at);
        self.revalue();
        Ok(())
    }

    /// Recomputes `current_value` from units and the latest NAV.
    pub fn revalue(&mut self) {
        self.current_value = precision::cash(self.total_units * self.latest_nav);
    }

    /// Adds to the realized gain and invested cash aggregates.
    pub(crate) fn book_cash(&mut self, realized_gain: Decimal, invested: Decimal, external: Decimal) {
        self.total_realized_gain = precision::aggregate(self.total_realized_gain + realized_gain);
        self.total_invested_cash = precision::aggregate(self.total_invested_cash + invested);
        self.external_cash_invested = precision::aggregate(self.external_cash_invested + external);
    }
}
