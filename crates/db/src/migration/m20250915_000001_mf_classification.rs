//! Asset class and sub-class labels on mutual funds.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Statements applied by `up`, in order.
pub(super) const STATEMENTS: &[&str] = &[CLASSIFICATION_SQL];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        for sql in STATEMENTS {
            db.execute_unprepared(sql).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const CLASSIFICATION_SQL: &str = r"
ALTER TABLE mutual_funds
    ADD COLUMN IF NOT EXISTS asset_class VARCHAR(50),
    ADD COLUMN IF NOT EXISTS asset_sub_class VARCHAR(50);

CREATE INDEX IF NOT EXISTS idx_mutual_funds_asset_class ON mutual_funds(asset_class);
";

const DROP_SQL: &str = r"
DROP INDEX IF EXISTS idx_mutual_funds_asset_class;
ALTER TABLE mutual_funds
    DROP COLUMN IF EXISTS asset_sub_class,
    DROP COLUMN IF EXISTS asset_class;
";
