//! `SeaORM` Entity for mutual_funds table.
//!
//! The generated `owner_key` column is not part of the model; the database
//! computes it from `owner`.

use fintrack_core::fund::FundPosition;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "mutual_funds")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub mutual_fund_id: i32,
    pub ledger_id: i32,
    pub amc_id: i32,
    pub name: String,
    pub owner: Option<String>,
    pub plan: Option<String>,
    pub code: Option<String>,
    pub asset_class: Option<String>,
    pub asset_sub_class: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((15, 3)))")]
    pub total_units: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 4)))")]
    pub average_cost_per_unit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 4)))")]
    pub latest_nav: Decimal,
    pub last_nav_update: Option<DateTime>,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub current_value: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 4)))")]
    pub total_realized_gain: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 4)))")]
    pub total_invested_cash: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 4)))")]
    pub external_cash_invested: Decimal,
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
        belongs_to = "super::amcs::Entity",
        from = "Column::AmcId",
        to = "super::amcs::Column::AmcId"
    )]
    Amcs,
    #[sea_orm(has_many = "super::mf_transactions::Entity")]
    MfTransactions,
}

impl Related<super::ledgers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ledgers.def()
    }
}

impl Related<super::amcs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Amcs.def()
    }
}

impl Related<super::mf_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MfTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Position aggregates of this fund.
    #[must_use]
    pub fn position(&self) -> FundPosition {
        FundPosition {
            total_units: self.total_units,
            average_cost_per_unit: self.average_cost_per_unit,
            latest_nav: self.latest_nav,
            last_nav_update: self.last_nav_update,
            current_value: self.current_value,
            total_realized_gain: self.total_realized_gain,
            total_invested_cash: self.total_invested_cash,
            external_cash_invested: self.external_cash_invested,
        }
    }
}
