//! `SeaORM` Entity for mf_transactions table.

use super::sea_orm_active_enums::MfTransactionType;
use fintrack_core::analytics::FlowSource;
use fintrack_core::fund::{self, RecordedMfTransaction};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "mf_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub mf_transaction_id: i32,
    pub ledger_id: i32,
    pub mutual_fund_id: i32,
    pub transaction_type: MfTransactionType,
    #[sea_orm(column_type = "Decimal(Some((15, 3)))")]
    pub units: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 4)))")]
    pub nav_per_unit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub total_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub amount_excluding_charges: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub other_charges: Decimal,
    pub linked_charge_transaction_id: Option<i32>,
    pub account_id: Option<i32>,
    pub target_fund_id: Option<i32>,
    pub financial_transaction_id: Option<i32>,
    pub linked_transaction_id: Option<i32>,
    #[sea_orm(column_type = "Decimal(Some((15, 4)))", nullable)]
    pub realized_gain: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((15, 4)))", nullable)]
    pub cost_basis_of_units_sold: Option<Decimal>,
    pub transaction_date: DateTime,
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
    #[sea_orm(
        belongs_to = "super::mutual_funds::Entity",
        from = "Column::MutualFundId",
        to = "super::mutual_funds::Column::MutualFundId"
    )]
    MutualFunds,
    #[sea_orm(
        belongs_to = "super::mutual_funds::Entity",
        from = "Column::TargetFundId",
        to = "super::mutual_funds::Column::MutualFundId"
    )]
    TargetFund,
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
    #[sea_orm(
        belongs_to = "super::transactions::Entity",
        from = "Column::LinkedChargeTransactionId",
        to = "super::transactions::Column::TransactionId"
    )]
    ChargeTransaction,
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::LinkedTransactionId",
        to = "Column::MfTransactionId"
    )]
    LinkedTransaction,
}

impl Related<super::mutual_funds::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MutualFunds.def()
    }
}

impl Related<super::ledgers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ledgers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// The recorded effect of this row on its fund's position.
    #[must_use]
    pub fn recorded(&self) -> RecordedMfTransaction {
        RecordedMfTransaction {
            transaction_type: self.transaction_type.into(),
            units: self.units,
            amount_excluding_charges: self.amount_excluding_charges,
            realized_gain: self.realized_gain,
            cost_basis_of_units_sold: self.cost_basis_of_units_sold,
        }
    }
}

impl FlowSource for Model {
    fn transaction_type(&self) -> fund::MfTransactionType {
        self.transaction_type.into()
    }

    fn transaction_date(&self) -> chrono::NaiveDate {
        self.transaction_date.date()
    }

    fn amount_excluding_charges(&self) -> Decimal {
        self.amount_excluding_charges
    }
}
