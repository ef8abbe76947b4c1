//! Typed IDs for type-safe entity references.
//!
//! Every table in the ledger schema uses an integer serial key. Wrapping them
//! prevents passing a `MutualFundId` where an `AmcId` is expected.

use serde::{Deserialize, Serialize};

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i32);

        impl $name {
            /// Creates an ID from a raw database key.
            #[must_use]
            pub const fn new(raw: i32) -> Self {
                Self(raw)
            }

            /// Returns the raw database key.
            #[must_use]
            pub const fn into_inner(self) -> i32 {
                self.0
            }
        }

        impl From<i32> for $name {
            fn from(raw: i32) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.trim().parse()?))
            }
        }
    };
}

typed_id!(UserId, "Unique identifier for a user.");
typed_id!(LedgerId, "Unique identifier for a ledger (the tenant/book scope).");
typed_id!(AccountId, "Unique identifier for an account.");
typed_id!(CategoryId, "Unique identifier for an income/expense category.");
typed_id!(TransactionId, "Unique identifier for a generic ledger transaction.");
typed_id!(AmcId, "Unique identifier for an asset management company.");
typed_id!(MutualFundId, "Unique identifier for a mutual fund holding.");
typed_id!(MfTransactionId, "Unique identifier for a mutual fund transaction.");
typed_id!(AssetTypeId, "Unique identifier for a physical asset type.");
typed_id!(PhysicalAssetId, "Unique identifier for a physical asset holding.");
typed_id!(AssetTransactionId, "Unique identifier for a physical asset transaction.");

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
