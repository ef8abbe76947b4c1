//! Optional fund owner, with name uniqueness keyed by owner.
//!
//! A null owner is normalized to the empty string through the stored
//! `owner_key` column so that two owner-less funds still collide.
//!
//! Rolling back restores `UNIQUE (ledger_id, name)` only while no ledger
//! holds the same fund name twice. Once owners diverge, the old key is left
//! off and a notice is raised instead.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Statements applied by `up`, in order.
pub(super) const STATEMENTS: &[&str] = &[OWNER_COLUMNS_SQL, UNIQUE_KEY_SQL];

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

const OWNER_COLUMNS_SQL: &str = r"
ALTER TABLE mutual_funds ADD COLUMN IF NOT EXISTS owner VARCHAR(100);
ALTER TABLE mutual_funds
    ADD COLUMN IF NOT EXISTS owner_key VARCHAR(100)
    GENERATED ALWAYS AS (COALESCE(owner, '')) STORED;
";

const UNIQUE_KEY_SQL: &str = r"
ALTER TABLE mutual_funds DROP CONSTRAINT IF EXISTS uq_mutual_funds_ledger_name;

DO $$ BEGIN
    ALTER TABLE mutual_funds
        ADD CONSTRAINT uq_mutual_funds_ledger_name_owner UNIQUE (ledger_id, name, owner_key);
EXCEPTION WHEN duplicate_object OR duplicate_table THEN NULL;
END $$;
";

const DROP_SQL: &str = r"
ALTER TABLE mutual_funds DROP CONSTRAINT IF EXISTS uq_mutual_funds_ledger_name_owner;
ALTER TABLE mutual_funds
    DROP COLUMN IF EXISTS owner_key,
    DROP COLUMN IF EXISTS owner;

DO $$ BEGIN
    IF EXISTS (
        SELECT 1 FROM mutual_funds GROUP BY ledger_id, name HAVING COUNT(*) > 1
    ) THEN
        RAISE NOTICE 'fund names repeat within a ledger, uq_mutual_funds_ledger_name not restored';
    ELSE
        ALTER TABLE mutual_funds
            ADD CONSTRAINT uq_mutual_funds_ledger_name UNIQUE (ledger_id, name);
    END IF;
EXCEPTION WHEN duplicate_object OR duplicate_table THEN NULL;
END $$;
";
