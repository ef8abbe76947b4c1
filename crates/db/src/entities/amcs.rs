//! `SeaORM` Entity for amcs table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "amcs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub amc_id: i32,
    pub ledger_id: i32,
    pub name: String,
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
    #[sea_orm(has_many = "super::mutual_funds::Entity")]
    MutualFunds,
}

impl Related<super::ledgers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ledgers.def()
    }
}

impl Related<super::mutual_funds::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MutualFunds.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
