//! `SeaORM` Entity for ledgers table.

use super::sea_orm_active_enums::NavServiceType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "ledgers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub ledger_id: i32,
    pub user_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub currency_symbol: String,
    pub notes: Option<String>,
    pub nav_service_type: NavServiceType,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::UserId"
    )]
    Users,
    #[sea_orm(has_many = "super::accounts::Entity")]
    Accounts,
    #[sea_orm(has_many = "super::amcs::Entity")]
    Amcs,
    #[sea_orm(has_many = "super::mutual_funds::Entity")]
    MutualFunds,
    #[sea_orm(has_many = "super::physical_assets::Entity")]
    PhysicalAssets,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::amcs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Amcs.def()
    }
}

impl Related<super::mutual_funds::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MutualFunds.def()
    }
}

impl Related<super::physical_assets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PhysicalAssets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
