//! `SeaORM` Entity for asset_types table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "asset_types")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub asset_type_id: i32,
    pub ledger_id: i32,
    pub name: String,
    pub unit_name: String,
    pub unit_symbol: String,
    pub notes: Option<String>,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ledgers::Entity",
        from = "Column::LedgerId",
        to = "super::ledgers::Column::LedgerId"
    )]
    Ledgers,
    #[sea_orm(has_many = "super::physical_assets::Entity")]
    PhysicalAssets,
}

impl Related<super::physical_assets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PhysicalAssets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
