//! Buy and sell trades with charge splitting.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::FundError;
use super::position::FundPosition;
use super::types::MfTransactionType;
use crate::precision;

/// Direction of a cash trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    /// Units bought with cash.
    Buy,
    /// Units redeemed for cash.
    Sell,
}

impl From<TradeSide> for MfTransactionType {
    fn from(side: TradeSide) -> Self {
        match side {
            TradeSide::Buy => Self::Buy,
            TradeSide::Sell => Self::Sell,
        }
    }
}

/// Trade amount split into the fund-level amount and incidental charges.
///
/// `total_amount` is always `amount_excluding_charges + other_charges`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeSplit {
    amount_excluding_charges: Decimal,
    other_charges: Decimal,
}

impl ChargeSplit {
    /// Creates a validated split.
    ///
    /// # Errors
    ///
    /// Returns `FundError::NonPositiveAmount` when the amount is not positive,
    /// or `FundError::NegativeCharges` when charges are negative.
    pub fn new(amount_excluding_charges: Decimal, other_charges: Decimal) -> Result<Self, FundError> {
        let amount_excluding_charges = precision::cash(amount_excluding_charges);
        let other_charges = precision::cash(other_charges);
        if amount_excluding_charges <= Decimal::ZERO {
            return Err(FundError::NonPositiveAmount);
        }
        if other_charges < Decimal::ZERO {
            return Err(FundError::NegativeCharges);
        }
        Ok(Self {
            amount_excluding_charges,
            other_charges,
        })
    }

    /// Amount that flows into or out of the fund.
    #[must_use]
    pub const fn amount_excluding_charges(&self) -> Decimal {
        self.amount_excluding_charges
    }

    /// Charges booked as a separate expense.
    #[must_use]
    pub const fn other_charges(&self) -> Decimal {
        self.other_charges
    }

    /// Gross amount of the trade.
    #[must_use]
    pub fn total_amount(&self) -> Decimal {
        self.amount_excluding_charges + self.other_charges
    }

    /// Sale proceeds after charges.
    #[must_use]
    pub fn net_proceeds(&self) -> Decimal {
        self.amount_excluding_charges - self.other_charges
    }

    /// Returns true if a separate charge transaction must be booked.
    #[must_use]
    pub fn has_charges(&self) -> bool {
        self.other_charges > Decimal::ZERO
    }
}

/// A buy or sell request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeInput {
    /// Trade direction.
    pub side: TradeSide,
    /// Units bought or sold.
    pub units: Decimal,
    /// Amount split.
    pub charges: ChargeSplit,
    /// When the trade happened.
    pub transaction_date: NaiveDateTime,
}

/// Values to persist on the `mf_transactions` row of an applied trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradeOutcome {
    /// Trade direction.
    pub side: TradeSide,
    /// Units bought or sold.
    pub units: Decimal,
    /// Implied NAV, `amount_excluding_charges / units`.
    pub nav_per_unit: Decimal,
    /// Gross amount.
    pub total_amount: Decimal,
    /// Fund-level amount.
    pub amount_excluding_charges: Decimal,
    /// Charges.
    pub other_charges: Decimal,
    /// Gain realized by a sell, zero for a buy.
    pub realized_gain: Decimal,
    /// Cost basis of the units sold, zero for a buy.
    pub cost_basis_of_units_sold: Decimal,
}

impl FundPosition {
    /// Applies a buy or sell to the position.
    ///
    /// A buy adds units at `amount_excluding_charges` and grows both invested
    /// cash aggregates by that amount. A sell removes units at the average
    /// cost, realizes `net_proceeds - cost_basis` and shrinks both invested
    /// cash aggregates by the cost basis. Either way the implied NAV becomes
    /// the latest NAV.
    ///
    /// # Errors
    ///
    /// Returns `FundError::NonPositiveUnits` for a zero or negative quantity
    /// and `FundError::InsufficientUnits` when selling more than is held.
    /// The position is unchanged on error.
    pub fn apply_trade(&mut self, input: &TradeInput) -> Result<TradeOutcome, FundError> {
        let units = precision::units(input.units);
        if units <= Decimal::ZERO {
            return Err(FundError::NonPositiveUnits);
        }
        let split = input.charges;
        let nav_per_unit = precision::price(split.amount_excluding_charges() / units);

        let mut next = self.clone();
        let (realized_gain, cost_basis) = match input.side {
            TradeSide::Buy => {
                next.adjust_holding(units, split.amount_excluding_charges())?;
                next.book_cash(
                    Decimal::ZERO,
                    split.amount_excluding_charges(),
                    split.amount_excluding_charges(),
                );
                (Decimal::ZERO, Decimal::ZERO)
            }
            TradeSide::Sell => {
                let cost_basis = next.remove_at_average(units)?;
                let realized = precision::aggregate(split.net_proceeds() - cost_basis);
                next.book_cash(realized, -cost_basis, -cost_basis);
                (realized, cost_basis)
            }
        };
        next.update_nav(nav_per_unit, input.transaction_date)?;
        *self = next;

        Ok(TradeOutcome {
            side: input.side,
            units,
            nav_per_unit,
            total_amount: split.total_amount(),
            amount_excluding_charges: split.amount_excluding_charges(),
            other_charges: split.other_charges(),
            realized_gain,
            cost_basis_of_units_sold: cost_basis,
        })
    }
}
