//! Fund error types for validation and position errors.

use fintrack_shared::AppError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur while applying mutual fund rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FundError {
    // ========== Validation Errors ==========
    /// Units must be positive.
    #[error("Units must be greater than 0")]
    NonPositiveUnits,

    /// Amount excluding charges must be positive for buy/sell.
    #[error("Amount excluding charges must be greater than 0 for buy/sell transactions")]
    NonPositiveAmount,

    /// Charges cannot be negative.
    #[error("Other charges cannot be negative")]
    NegativeCharges,

    /// NAV must be positive.
    #[error("NAV per unit must be greater than 0")]
    NonPositiveNav,

    /// A switch needs two different funds.
    #[error("Cannot switch to the same fund")]
    SameFundSwitch,

    /// The switched value buys no units at the target NAV.
    #[error("Switched value of {value} buys no units at NAV {nav}")]
    NothingSwitchedIn {
        /// Value switched out of the source fund.
        value: Decimal,
        /// Target fund NAV.
        nav: Decimal,
    },

    // ========== Position Errors ==========
    /// Not enough units held.
    #[error("Insufficient units in fund. Available: {available}, Requested: {requested}")]
    InsufficientUnits {
        /// Units currently held.
        available: Decimal,
        /// Units the operation needs to remove.
        requested: Decimal,
    },

    /// A recorded transaction lacks a field its reversal depends on.
    #[error("Recorded {0} transaction has no cost basis")]
    MissingCostBasis(&'static str),
}

impl FundError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveUnits => "NON_POSITIVE_UNITS",
            Self::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            Self::NegativeCharges => "NEGATIVE_CHARGES",
            Self::NonPositiveNav => "NON_POSITIVE_NAV",
            Self::SameFundSwitch => "SAME_FUND_SWITCH",
            Self::NothingSwitchedIn { .. } => "NOTHING_SWITCHED_IN",
            Self::InsufficientUnits { .. } => "INSUFFICIENT_UNITS",
            Self::MissingCostBasis(_) => "MISSING_COST_BASIS",
        }
    }

    /// Returns true for errors caused by the request rather than stored state.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            Self::InsufficientUnits { .. } | Self::MissingCostBasis(_)
        )
    }
}

impl From<FundError> for AppError {
    fn from(err: FundError) -> Self {
        if err.is_validation() {
            Self::Validation(err.to_string())
        } else {
            Self::BusinessRule(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(FundError::NonPositiveUnits.error_code(), "NON_POSITIVE_UNITS");
        assert_eq!(FundError::SameFundSwitch.error_code(), "SAME_FUND_SWITCH");
        assert_eq!(
            FundError::InsufficientUnits {
                available: dec!(1),
                requested: dec!(2),
            }
            .error_code(),
            "INSUFFICIENT_UNITS"
        );
    }

    #[test]
    fn test_error_display() {
        let err = FundError::InsufficientUnits {
            available: dec!(10.500),
            requested: dec!(12.000),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient units in fund. Available: 10.500, Requested: 12.000"
        );
    }

    #[test]
    fn test_validation_classification() {
        assert!(FundError::NegativeCharges.is_validation());
        assert!(!FundError::MissingCostBasis("sell").is_validation());
    }
}
