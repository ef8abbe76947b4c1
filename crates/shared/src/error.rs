//! Error type shared by the Fintrack crates.
//!
//! Each crate keeps its own typed errors (fund, asset, NAV, repository) and
//! converts them into `AppError` at the boundary, which is what the binaries
//! log and report.

use thiserror::Error;

/// Result of a Fintrack operation.
pub type AppResult<T> = Result<T, AppError>;

/// Classified failure of a holdings operation.
#[derive(Debug, Error)]
pub enum AppError {
    /// A ledger, fund, asset or transaction does not exist in the ledger.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Input rejected before touching any holding, e.g. non-positive units.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A holdings rule refused the operation, e.g. selling more units than held.
    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    /// A uniqueness rule was hit, e.g. a fund name repeated for the same owner.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The storage layer failed.
    #[error("Database error: {0}")]
    Database(String),

    /// A NAV provider failed or returned an unusable quote.
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Stored data is inconsistent, or a bug.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the stable code logged alongside the message.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::BusinessRule(_) => "BUSINESS_RULE_VIOLATION",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true when the same call may succeed on retry.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Database(_) | Self::ExternalService(_))
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
