//! Database layer with migrations, `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - Database migrations for the holdings schema
//! - `SeaORM` entity definitions
//! - Repositories applying the fund and asset rules of `fintrack-core`
//! - An integrity audit over stored data

pub mod constraint;
pub mod entities;
pub mod integrity;
pub mod migration;
pub mod repositories;

pub use constraint::ConstraintViolation;
pub use integrity::IntegrityAudit;
pub use repositories::{
    AmcRepository, AssetTransactionRepository, AssetTypeRepository, LedgerRepository,
    MfTransactionRepository, MutualFundRepository, PhysicalAssetRepository,
};

use std::time::Duration;

use fintrack_shared::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Establishes a pooled connection using the configured pool sizes.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_with(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    Database::connect(options).await
}
