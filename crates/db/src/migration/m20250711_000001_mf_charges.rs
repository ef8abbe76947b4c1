//! Charge split on mutual fund buy/sell transactions.
//!
//! Legacy rows are backfilled with `amount_excluding_charges = total_amount`
//! before the columns become mandatory.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Statements applied by `up`, in order.
pub(super) const STATEMENTS: &[&str] = &[
    ADD_COLUMNS_SQL,
    BACKFILL_SQL,
    REQUIRE_COLUMNS_SQL,
    CHECK_CONSTRAINT_SQL,
];

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

const ADD_COLUMNS_SQL: &str = r"
ALTER TABLE mf_transactions
    ADD COLUMN IF NOT EXISTS amount_excluding_charges NUMERIC(15, 2),
    ADD COLUMN IF NOT EXISTS other_charges NUMERIC(15, 2) DEFAULT 0,
    ADD COLUMN IF NOT EXISTS linked_charge_transaction_id INTEGER REFERENCES transactions(transaction_id);
";

const BACKFILL_SQL: &str = r"
UPDATE mf_transactions
SET amount_excluding_charges = total_amount
WHERE amount_excluding_charges IS NULL;

UPDATE mf_transactions
SET other_charges = 0
WHERE other_charges IS NULL;
";

const REQUIRE_COLUMNS_SQL: &str = r"
ALTER TABLE mf_transactions
    ALTER COLUMN amount_excluding_charges SET NOT NULL,
    ALTER COLUMN other_charges SET NOT NULL,
    ALTER COLUMN other_charges SET DEFAULT 0;
";

const CHECK_CONSTRAINT_SQL: &str = r"
DO $$ BEGIN
    ALTER TABLE mf_transactions
        ADD CONSTRAINT chk_mf_transactions_charge_split
        CHECK (
            transaction_type NOT IN ('buy', 'sell')
            OR total_amount = amount_excluding_charges + other_charges
        );
EXCEPTION WHEN duplicate_object THEN NULL;
END $$;
";

const DROP_SQL: &str = r"
ALTER TABLE mf_transactions DROP CONSTRAINT IF EXISTS chk_mf_transactions_charge_split;
ALTER TABLE mf_transactions
    DROP COLUMN IF EXISTS linked_charge_transaction_id,
    DROP COLUMN IF EXISTS other_charges,
    DROP COLUMN IF EXISTS amount_excluding_charges;
";
