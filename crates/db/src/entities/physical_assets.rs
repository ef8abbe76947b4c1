//! `SeaORM` Entity for physical_assets table.

use fintrack_core::asset::AssetPosition;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "physical_assets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub physical_asset_id: i32,
    pub ledger_id: i32,
    pub asset_type_id: i32,
    pub name: String,
    #[sea_orm(column_type = "Decimal(Some((15, 6)))")]
    pub total_quantity: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 4)))")]
    pub average_cost_per_unit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 4)))")]
    pub latest_price_per_unit: Decimal,
    pub last_price_update: Option<DateTime>,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub current_value: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ledgers::Entity",
        from = "Column::LedgerId",
        to = "super::ledgers::Column::LedgerId"
    )]
    Ledgers,
    #[sea_orm(
        belongs_to = "super::asset_types::Entity",
        from = "Column::AssetTypeId",
        to = "super::asset_types::Column::AssetTypeId"
    )]
    AssetTypes,
    #[sea_orm(has_many = "super::asset_transactions::Entity")]
    AssetTransactions,
}

impl Related<super::ledgers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ledgers.def()
    }
}

impl Related<super::asset_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AssetTypes.def()
    }
}

impl Related<super::asset_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AssetTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Position aggregates of this asset.
    #[must_use]
    pub fn position(&self) -> AssetPosition {
        AssetPosition {
            total_quantity: self.total_quantity,
            average_cost_per_unit: self.average_cost_per_unit,
            latest_price_per_unit: self.latest_price_per_unit,
            last_price_update: self.last_price_update,
            current_value: self.current_value,
        }
    }
}
