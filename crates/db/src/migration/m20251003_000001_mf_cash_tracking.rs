//! Invested cash tracking on mutual funds.
//!
//! `total_invested_cash` follows every cost movement including switches;
//! `external_cash_invested` only follows money that entered or left through
//! an account. Existing funds are backfilled from their current holding.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Statements applied by `up`, in order.
pub(super) const STATEMENTS: &[&str] = &[CASH_COLUMNS_SQL, BACKFILL_SQL];

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

const CASH_COLUMNS_SQL: &str = r"
ALTER TABLE mutual_funds
    ADD COLUMN IF NOT EXISTS total_invested_cash NUMERIC(15, 2) NOT NULL DEFAULT 0,
    ADD COLUMN IF NOT EXISTS external_cash_invested NUMERIC(15, 2) NOT NULL DEFAULT 0;
";

const BACKFILL_SQL: &str = r"
UPDATE mutual_funds
SET total_invested_cash = ROUND(total_units * average_cost_per_unit, 2),
    external_cash_invested = ROUND(total_units * average_cost_per_unit, 2)
WHERE total_invested_cash = 0
  AND external_cash_invested = 0
  AND total_units > 0;
";

const DROP_SQL: &str = r"
ALTER TABLE mutual_funds
    DROP COLUMN IF EXISTS external_cash_invested,
    DROP COLUMN IF EXISTS total_invested_cash;
";
