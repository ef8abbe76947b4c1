//! Mutual fund domain types.

use serde::{Deserialize, Serialize};

/// Kind of a mutual fund transaction, persisted as `mf_transaction_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MfTransactionType {
    /// Units bought with cash from an account.
    Buy,
    /// Units redeemed into an account.
    Sell,
    /// Source leg of a fund-to-fund switch.
    SwitchOut,
    /// Destination leg of a fund-to-fund switch.
    SwitchIn,
}

impl MfTransactionType {
    /// All variants, in the order they were added to the database enum.
    pub const ALL: [Self; 4] = [Self::Buy, Self::Sell, Self::SwitchOut, Self::SwitchIn];

    /// Returns the value stored in the database enum.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
            Self::SwitchOut => "switch_out",
            Self::SwitchIn => "switch_in",
        }
    }

    /// Returns true for buy/sell, the kinds that move cash through an account.
    #[must_use]
    pub const fn is_trade(self) -> bool {
        matches!(self, Self::Buy | Self::Sell)
    }

    /// Returns true for either switch leg.
    #[must_use]
    pub const fn is_switch(self) -> bool {
        matches!(self, Self::SwitchOut | Self::SwitchIn)
    }

    /// Returns true if the transaction adds units to its fund.
    #[must_use]
    pub const fn adds_units(self) -> bool {
        matches!(self, Self::Buy | Self::SwitchIn)
    }

    /// Returns the kind of the paired leg, if any.
    #[must_use]
    pub const fn counterpart(self) -> Option<Self> {
        match self {
            Self::SwitchOut => Some(Self::SwitchIn),
            Self::SwitchIn => Some(Self::SwitchOut),
            Self::Buy | Self::Sell => None,
        }
    }
}

impl std::fmt::Display for MfTransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MfTransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown mutual fund transaction type: {s}"))
    }
}
