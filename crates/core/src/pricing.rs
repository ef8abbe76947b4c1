//! NAV provider selection.
//!
//! Each ledger chooses where fund prices come from. The choice is persisted as
//! the `nav_service_type` enum on `ledgers`, next to an optional API key.

use serde::{Deserialize, Serialize};

/// Provider used to look up the latest NAV of a fund.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavServiceType {
    /// Indian mutual fund schemes, keyed by AMFI scheme code.
    #[default]
    India,
    /// UK funds and ETFs, keyed by ticker symbol.
    Uk,
}

impl NavServiceType {
    /// Returns the value stored in the database enum.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::India => "india",
            Self::Uk => "uk",
        }
    }

    /// Returns true if the provider cannot be queried without a ledger API key.
    #[must_use]
    pub const fn requires_api_key(self) -> bool {
        matches!(self, Self::Uk)
    }
}

impl std::fmt::Display for NavServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NavServiceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "india" => Ok(Self::India),
            "uk" => Ok(Self::Uk),
            _ => Err(format!("Unknown NAV service type: {s}")),
        }
    }
}
