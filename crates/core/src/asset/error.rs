//! Physical asset errors.

use fintrack_shared::AppError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur while applying physical asset rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    /// Quantity must be positive.
    #[error("Quantity must be greater than 0")]
    NonPositiveQuantity,

    /// Price must be positive.
    #[error("Price per unit must be greater than 0")]
    NonPositivePrice,

    /// Not enough quantity held.
    #[error("Insufficient asset quantity. Available: {available}, Requested: {requested}")]
    InsufficientQuantity {
        /// Quantity currently held.
        available: Decimal,
        /// Quantity the sell needs.
        requested: Decimal,
    },

    /// The paying account cannot cover a purchase.
    #[error("Insufficient account balance. Available: {available}, Required: {required}")]
    InsufficientBalance {
        /// Account net balance.
        available: Decimal,
        /// Purchase total.
        required: Decimal,
    },
}

impl AssetError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveQuantity => "NON_POSITIVE_QUANTITY",
            Self::NonPositivePrice => "NON_POSITIVE_PRICE",
            Self::InsufficientQuantity { .. } => "INSUFFICIENT_QUANTITY",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
        }
    }
}

impl From<AssetError> for AppError {
    fn from(err: AssetError) -> Self {
        match err {
            AssetError::NonPositiveQuantity | AssetError::NonPositivePrice => {
                Self::Validation(err.to_string())
            }
            AssetError::InsufficientQuantity { .. } | AssetError::InsufficientBalance { .. } => {
                Self::BusinessRule(err.to_string())
            }
        }
    }
}
