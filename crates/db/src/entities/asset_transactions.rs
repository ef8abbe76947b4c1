//! `SeaORM` Entity for asset_transactions table.

use super::sea_orm_active_enums::AssetTransactionType;
use fintrack_core::asset::RecordedAssetTrade;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "asset_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub asset_transaction_id: i32,
    pub ledger_id: i32,
    pub physical_asset_id: i32,
    pub transaction_type: AssetTransactionType,
    #[sea_orm(column_type = "Decimal(Some((15, 6)))")]
    pub quantity: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 4)))")]
    pub price_per_unit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub total_amount: Decimal,
    pub account_id: i32,
    pub financial_transaction_id: Option<i32>,
    pub transaction_date: DateTime,
    pub notes: Option<String>,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::physical_assets::Entity",
        from = "Column::PhysicalAssetId",
        to = "super::physical_assets::Column::PhysicalAssetId"
    )]
    PhysicalAssets,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::AccountId"
    )]
    Accounts,
    #[sea_orm(
        belongs_to = "super::transactions::Entity",
        from = "Column::FinancialTransactionId",
        to = "super::transactions::Column::TransactionId"
    )]
    FinancialTransaction,
}

impl Related<super::physical_assets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PhysicalAssets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// The recorded trade, as replayed when rebuilding a position.
    #[must_use]
    pub fn recorded(&self) -> RecordedAssetTrade {
        RecordedAssetTrade {
            transaction_type: self.transaction_type.into(),
            quantity: self.quantity,
            price_per_unit: self.price_per_unit,
            total_amount: self.total_amount,
            transaction_date: self.transaction_date,
        }
    }
}
