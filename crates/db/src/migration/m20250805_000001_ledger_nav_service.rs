//! Per-ledger NAV provider selection and credential.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Statements applied by `up`, in order.
pub(super) const STATEMENTS: &[&str] = &[ENUM_SQL, LEDGER_COLUMNS_SQL];

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

const ENUM_SQL: &str = r"
DO $$ BEGIN
    CREATE TYPE nav_service_type AS ENUM ('india', 'uk');
EXCEPTION WHEN duplicate_object THEN NULL;
END $$;
";

const LEDGER_COLUMNS_SQL: &str = r"
ALTER TABLE ledgers
    ADD COLUMN IF NOT EXISTS nav_service_type nav_service_type NOT NULL DEFAULT 'india',
    ADD COLUMN IF NOT EXISTS api_key VARCHAR(255);
";

const DROP_SQL: &str = r"
ALTER TABLE ledgers
    DROP COLUMN IF EXISTS api_key,
    DROP COLUMN IF EXISTS nav_service_type;
DROP TYPE IF EXISTS nav_service_type;
";
