//! Classification of storage-engine constraint violations.
//!
//! Repositories turn these into their own typed errors, e.g. a unique
//! violation on `uq_amcs_ledger_name` becomes a duplicate AMC name.

use sea_orm::{DbErr, RuntimeErr};

/// A constraint violation reported by PostgreSQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintViolation {
    /// `23505`: a unique constraint was violated.
    Unique {
        /// Name of the violated constraint, when reported.
        constraint: Option<String>,
    },
    /// `23503`: a foreign key does not resolve, or is still referenced.
    ForeignKey {
        /// Name of the violated constraint, when reported.
        constraint: Option<String>,
    },
    /// `22P02`: a value is not valid for its type, e.g. an unknown enum label.
    InvalidInput,
    /// `23502`: a required column was null.
    NotNull,
    /// `23514`: a check constraint rejected the row.
    Check {
        /// Name of the violated constraint, when reported.
        constraint: Option<String>,
    },
}

impl ConstraintViolation {
    /// Maps a SQLSTATE code and constraint name to a violation.
    #[must_use]
    pub fn from_sqlstate(code: &str, constraint: Option<&str>) -> Option<Self> {
        let constraint = constraint.map(str::to_string);
        match code {
            "23505" => Some(Self::Unique { constraint }),
            "23503" => Some(Self::ForeignKey { constraint }),
            "22P02" => Some(Self::InvalidInput),
            "23502" => Some(Self::NotNull),
            "23514" => Some(Self::Check { constraint }),
            _ => None,
        }
    }

    /// Classifies a database error, if it is a constraint violation.
    #[must_use]
    pub fn classify(err: &DbErr) -> Option<Self> {
        let runtime = match err {
            DbErr::Query(runtime) | DbErr::Exec(runtime) | DbErr::Conn(runtime) => runtime,
            _ => return None,
        };
        let RuntimeErr::SqlxError(sqlx::Error::Database(db_err)) = runtime else {
            return None;
        };
        let code = db_err.code()?;
        Self::from_sqlstate(&code, db_err.constraint())
    }

    /// Returns true for a unique violation of the named constraint.
    #[must_use]
    pub fn is_unique(&self, name: &str) -> bool {
        matches!(self, Self::Unique { constraint: Some(c) } if c == name)
    }

    /// Returns true for any foreign key violation.
    #[must_use]
    pub const fn is_foreign_key(&self) -> bool {
        matches!(self, Self::ForeignKey { .. })
    }
}

/// Returns true if `err` violates the named unique constraint.
#[must_use]
pub fn is_unique_violation(err: &DbErr, constraint: &str) -> bool {
    ConstraintViolation::classify(err).is_some_and(|v| v.is_unique(constraint))
}
