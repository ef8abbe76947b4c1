//! `SeaORM` entity definitions.

pub mod accounts;
pub mod amcs;
pub mod asset_transactions;
pub mod asset_types;
pub mod categories;
pub mod ledgers;
pub mod mf_transactions;
pub mod mutual_funds;
pub mod physical_assets;
pub mod sea_orm_active_enums;
pub mod transactions;
pub mod users;
