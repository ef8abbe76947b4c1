//! Weighted-average physical asset position.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::AssetError;
use crate::precision;

/// Kind of an asset transaction, persisted as `asset_transaction_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetTransactionType {
    /// Quantity bought from an account.
    Buy,
    /// Quantity sold into an account.
    Sell,
}

impl AssetTransactionType {
    /// Returns the value stored in the database enum.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

impl std::fmt::Display for AssetTransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A buy or sell request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetTradeInput {
    /// Trade direction.
    pub transaction_type: AssetTransactionType,
    /// Quantity traded.
    pub quantity: Decimal,
    /// Price per unit.
    pub price_per_unit: Decimal,
    /// When the trade happened.
    pub transaction_date: NaiveDateTime,
}

impl AssetTradeInput {
    /// Cash value of the trade, `quantity * price_per_unit`.
    #[must_use]
    pub fn total_amount(&self) -> Decimal {
        precision::cash(self.quantity * self.price_per_unit)
    }

    fn validate(&self) -> Result<(), AssetError> {
        if self.quantity <= Decimal::ZERO {
            return Err(AssetError::NonPositiveQuantity);
        }
        if self.price_per_unit <= Decimal::ZERO {
            return Err(AssetError::NonPositivePrice);
        }
        Ok(())
    }
}

/// A stored `asset_transactions` row, as needed for replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedAssetTrade {
    /// Trade direction.
    pub transaction_type: AssetTransactionType,
    /// Quantity traded.
    pub quantity: Decimal,
    /// Price per unit.
    pub price_per_unit: Decimal,
    /// Stored cash value.
    pub total_amount: Decimal,
    /// When the trade happened.
    pub transaction_date: NaiveDateTime,
}

/// Aggregate state of a physical asset, mirroring `physical_assets`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPosition {
    /// Quantity held.
    pub total_quantity: Decimal,
    /// Weighted-average cost per unit.
    pub average_cost_per_unit: Decimal,
    /// Most recent price seen.
    pub latest_price_per_unit: Decimal,
    /// When the price was last set.
    pub last_price_update: Option<NaiveDateTime>,
    /// `total_quantity * latest_price_per_unit`.
    pub current_value: Decimal,
}

impl AssetPosition {
    /// Applies a buy or sell and returns the trade's cash value.
    ///
    /// # Errors
    ///
    /// Returns an `AssetError` for non-positive input or when selling more
    /// than is held. The position is unchanged on error.
    pub fn apply_trade(&mut self, input: &AssetTradeInput) -> Result<Decimal, AssetError> {
        input.validate()?;
        let quantity = precision::quantity(input.quantity);
        let total = input.total_amount();

        match input.transaction_type {
            AssetTransactionType::Buy => self.add(quantity, total),
            AssetTransactionType::Sell => {
                if quantity > self.total_quantity {
                    return Err(AssetError::InsufficientQuantity {
                        available: self.total_quantity,
                        requested: quantity,
                    });
                }
                self.remove(quantity);
            }
        }
        self.set_price(input.price_per_unit, input.transaction_date);
        Ok(total)
    }

    /// Rebuilds a position from trades sorted by `(transaction_date, created_at)`.
    ///
    /// A sell that exceeds the replayed holding empties the position instead
    /// of failing, so a history that was edited out of order still yields a
    /// usable state. The latest price follows the last trade, or resets when
    /// there are none.
    #[must_use]
    pub fn replay(trades: &[RecordedAssetTrade]) -> Self {
        let mut position = Self::default();
        for trade in trades {
            match trade.transaction_type {
                AssetTransactionType::Buy => position.add(trade.quantity, trade.total_amount),
                AssetTransactionType::Sell if trade.quantity <= position.total_quantity => {
                    position.remove(trade.quantity);
                }
                AssetTransactionType::Sell => {
                    position.total_quantity = Decimal::ZERO;
                    position.average_cost_per_unit = Decimal::ZERO;
                }
            }
        }
        if let Some(last) = trades.last() {
            position.set_price(last.price_per_unit, last.transaction_date);
        }
        position.revalue();
        position
    }

    /// Sets a manually observed price.
    ///
    /// # Errors
    ///
    /// Returns `AssetError::NonPositivePrice` if `price` is not positive.
    pub fn update_price(&mut self, price: Decimal, at: NaiveDateTime) -> Result<(), AssetError> {
        if price <= Decimal::ZERO {
            return Err(AssetError::NonPositivePrice);
        }
        self.set_price(price, at);
        Ok(())
    }

    fn add(&mut self, quantity: Decimal, cost: Decimal) {
        let new_quantity = precision::quantity(self.total_quantity + quantity);
        self.average_cost_per_unit = if new_quantity.is_zero() {
            Decimal::ZERO
        } else {
            let invested = self.total_quantity * self.average_cost_per_unit + cost;
            precision::aggregate(invested / new_quantity)
        };
        self.total_quantity = new_quantity;
    }

    fn remove(&mut self, quantity: Decimal) {
        self.total_quantity = precision::quantity(self.total_quantity - quantity);
        if self.total_quantity.is_zero() {
            self.average_cost_per_unit = Decimal::ZERO;
        }
    }

    fn set_price(&mut self, price: Decimal, at: NaiveDateTime) {
        self.latest_price_per_unit = precision::price(price);
        self.last_price_update = Some(at);
        self.revalue();
    }

    fn revalue(&mut self) {
        self.current_value = precision::cash(self.total_quantity * self.latest_price_per_unit);
    }
}

/// Fails unless an account with `net_balance` can pay `required`.
///
/// # Errors
///
/// Returns `AssetError::InsufficientBalance` when it cannot.
pub fn ensure_sufficient_balance(net_balance: Decimal, required: Decimal) -> Result<(), AssetError> {
    if net_balance < required {
        return Err(AssetError::InsufficientBalance {
            available: net_balance,
            required,
        });
    }
    Ok(())
}
