//! `SeaORM` active enums mirroring the database enumeration types.

use fintrack_core::{asset, fund, pricing};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account side: asset or liability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_type")]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    #[sea_orm(string_value = "asset")]
    Asset,
    #[sea_orm(string_value = "liability")]
    Liability,
}

/// Category kind: income or expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "category_type")]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    #[sea_orm(string_value = "income")]
    Income,
    #[sea_orm(string_value = "expense")]
    Expense,
}

/// Side of a transfer between two accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transfer_type")]
#[serde(rename_all = "lowercase")]
pub enum TransferType {
    #[sea_orm(string_value = "source")]
    Source,
    #[sea_orm(string_value = "destination")]
    Destination,
}

/// Kind of mutual fund transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "mf_transaction_type")]
#[serde(rename_all = "snake_case")]
pub enum MfTransactionType {
    #[sea_orm(string_value = "buy")]
    Buy,
    #[sea_orm(string_value = "sell")]
    Sell,
    #[sea_orm(string_value = "switch_out")]
    SwitchOut,
    #[sea_orm(string_value = "switch_in")]
    SwitchIn,
}

/// Kind of physical asset transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "asset_transaction_type")]
#[serde(rename_all = "lowercase")]
pub enum AssetTransactionType {
    #[sea_orm(string_value = "buy")]
    Buy,
    #[sea_orm(string_value = "sell")]
    Sell,
}

/// NAV provider configured for a ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "nav_service_type")]
#[serde(rename_all = "lowercase")]
pub enum NavServiceType {
    #[sea_orm(string_value = "india")]
    India,
    #[sea_orm(string_value = "uk")]
    Uk,
}

// ============================================================================
// Domain conversions
// ============================================================================

impl From<MfTransactionType> for fund::MfTransactionType {
    fn from(value: MfTransactionType) -> Self {
        match value {
            MfTransactionType::Buy => Self::Buy,
            MfTransactionType::Sell => Self::Sell,
            MfTransactionType::SwitchOut => Self::SwitchOut,
            MfTransactionType::SwitchIn => Self::SwitchIn,
        }
    }
}

impl From<fund::MfTransactionType> for MfTransactionType {
    fn from(value: fund::MfTransactionType) -> Self {
        match value {
            fund::MfTransactionType::Buy => Self::Buy,
            fund::MfTransactionType::Sell => Self::Sell,
            fund::MfTransactionType::SwitchOut => Self::SwitchOut,
            fund::MfTransactionType::SwitchIn => Self::SwitchIn,
        }
    }
}

impl From<AssetTransactionType> for asset::AssetTransactionType {
    fn from(value: AssetTransactionType) -> Self {
        match value {
            AssetTransactionType::Buy => Self::Buy,
            AssetTransactionType::Sell => Self::Sell,
        }
    }
}

impl From<asset::AssetTransactionType> for AssetTransactionType {
    fn from(value: asset::AssetTransactionType) -> Self {
        match value {
            asset::AssetTransactionType::Buy => Self::Buy,
            asset::AssetTransactionType::Sell => Self::Sell,
        }
    }
}

impl From<NavServiceType> for pricing::NavServiceType {
    fn from(value: NavServiceType) -> Self {
        match value {
            NavServiceType::India => Self::India,
            NavServiceType::Uk => Self::Uk,
        }
    }
}

impl From<pricing::NavServiceType> for NavServiceType {
    fn from(value: pricing::NavServiceType) -> Self {
        match value {
            pricing::NavServiceType::India => Self::India,
            pricing::NavServiceType::Uk => Self::Uk,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn test_mf_transaction_type_round_trips_through_domain() {
        for value in MfTransactionType::iter() {
            let domain: fund::MfTransactionType = value.into();
            assert_eq!(MfTransactionType::from(domain), value);
            assert_eq!(value.to_value(), domain.as_str());
        }
    }

    #[test]
    fn test_nav_service_type_db_values() {
        assert_eq!(NavServiceType::India.to_value(), "india");
        assert_eq!(NavServiceType::Uk.to_value(), "uk");
        assert_eq!(
            pricing::NavServiceType::from(NavServiceType::Uk),
            pricing::NavServiceType::Uk
        );
    }
}
