//! Widens cumulative monetary aggregates to four decimal places.
//!
//! Widening the scale of a NUMERIC column is lossless and re-running it is a
//! no-op, so no existence guard is needed.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Statements applied by `up`, in order.
pub(super) const STATEMENTS: &[&str] = &[WIDEN_SQL];

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
        db.execute_unprepared(NARROW_SQL).await?;
        Ok(())
    }
}

const WIDEN_SQL: &str = r"
ALTER TABLE mutual_funds
    ALTER COLUMN total_realized_gain TYPE NUMERIC(15, 4),
    ALTER COLUMN total_invested_cash TYPE NUMERIC(15, 4),
    ALTER COLUMN external_cash_invested TYPE NUMERIC(15, 4);

ALTER TABLE mf_transactions
    ALTER COLUMN realized_gain TYPE NUMERIC(15, 4),
    ALTER COLUMN cost_basis_of_units_sold TYPE NUMERIC(15, 4);
";

const NARROW_SQL: &str = r"
ALTER TABLE mf_transactions
    ALTER COLUMN cost_basis_of_units_sold TYPE NUMERIC(15, 2),
    ALTER COLUMN realized_gain TYPE NUMERIC(15, 2);

ALTER TABLE mutual_funds
    ALTER COLUMN external_cash_invested TYPE NUMERIC(15, 2),
    ALTER COLUMN total_invested_cash TYPE NUMERIC(15, 2),
    ALTER COLUMN total_realized_gain TYPE NUMERIC(15, 2);
";
