//! `SeaORM` Entity for transactions table.
//!
//! Generic ledger transactions. Rows written on behalf of a fund or asset
//! trade carry `is_mf_transaction` or `is_asset_transaction`.

use super::sea_orm_active_enums::TransferType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub transaction_id: i32,
    pub account_id: i32,
    pub category_id: Option<i32>,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub credit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub debit: Decimal,
    pub date: DateTime,
    pub notes: Option<String>,
    pub is_split: bool,
    pub is_transfer: bool,
    pub transfer_id: Option<Uuid>,
    pub transfer_type: Option<TransferType>,
    pub is_asset_transaction: bool,
    pub is_mf_transaction: bool,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::AccountId"
    )]
    Accounts,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::CategoryId"
    )]
    Categories,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
