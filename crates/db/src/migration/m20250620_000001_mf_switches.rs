//! Fund-to-fund switches and realized gain tracking.
//!
//! New enum values are only added here. Postgres refuses to use a value added
//! in the same transaction, so nothing in the chain may reference them in SQL.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Statements applied by `up`, in order.
pub(super) const STATEMENTS: &[&str] = &[ENUM_VALUES_SQL, SWITCH_COLUMNS_SQL, GAIN_COLUMNS_SQL];

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
        // Enum values cannot be dropped from a type; they stay in place.
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const ENUM_VALUES_SQL: &str = r"
ALTER TYPE mf_transaction_type ADD VALUE IF NOT EXISTS 'switch_out';
ALTER TYPE mf_transaction_type ADD VALUE IF NOT EXISTS 'switch_in';
";

const SWITCH_COLUMNS_SQL: &str = r"
ALTER TABLE mf_transactions
    ADD COLUMN IF NOT EXISTS target_fund_id INTEGER REFERENCES mutual_funds(mutual_fund_id),
    ADD COLUMN IF NOT EXISTS linked_transaction_id INTEGER REFERENCES mf_transactions(mf_transaction_id);

CREATE INDEX IF NOT EXISTS idx_mf_transactions_linked_id ON mf_transactions(linked_transaction_id);
";

const GAIN_COLUMNS_SQL: &str = r"
ALTER TABLE mf_transactions
    ADD COLUMN IF NOT EXISTS realized_gain NUMERIC(15, 2),
    ADD COLUMN IF NOT EXISTS cost_basis_of_units_sold NUMERIC(15, 2);

ALTER TABLE mutual_funds
    ADD COLUMN IF NOT EXISTS total_realized_gain NUMERIC(15, 2) NOT NULL DEFAULT 0;
";

const DROP_SQL: &str = r"
ALTER TABLE mutual_funds DROP COLUMN IF EXISTS total_realized_gain;
DROP INDEX IF EXISTS idx_mf_transactions_linked_id;
ALTER TABLE mf_transactions
    DROP COLUMN IF EXISTS cost_basis_of_units_sold,
    DROP COLUMN IF EXISTS realized_gain,
    DROP COLUMN IF EXISTS linked_transaction_id,
    DROP COLUMN IF EXISTS target_fund_id;
";
