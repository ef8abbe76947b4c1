//! Mutual fund holdings: AMCs, funds and their buy/sell transactions.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Statements applied by `up`, in order.
pub(super) const STATEMENTS: &[&str] = &[
    ENUM_SQL,
    AMCS_SQL,
    MUTUAL_FUNDS_SQL,
    TRANSACTION_FLAG_SQL,
    MF_TRANSACTIONS_SQL,
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

const ENUM_SQL: &str = r"
DO $$ BEGIN
    CREATE TYPE mf_transaction_type AS ENUM ('buy', 'sell');
EXCEPTION WHEN duplicate_object THEN NULL;
END $$;
";

const AMCS_SQL: &str = r"
CREATE TABLE IF NOT EXISTS amcs (
    amc_id     SERIAL PRIMARY KEY,
    ledger_id  INTEGER NOT NULL REFERENCES ledgers(ledger_id),
    name       VARCHAR(100) NOT NULL,
    notes      VARCHAR(500),
    created_at TIMESTAMP NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMP NOT NULL DEFAULT NOW(),
    CONSTRAINT uq_amcs_ledger_name UNIQUE (ledger_id, name)
);

CREATE INDEX IF NOT EXISTS idx_amcs_ledger_id ON amcs(ledger_id);
";

const MUTUAL_FUNDS_SQL: &str = r"
CREATE TABLE IF NOT EXISTS mutual_funds (
    mutual_fund_id        SERIAL PRIMARY KEY,
    ledger_id             INTEGER NOT NULL REFERENCES ledgers(ledger_id),
    amc_id                INTEGER NOT NULL REFERENCES amcs(amc_id),
    name                  VARCHAR(200) NOT NULL,
    plan                  VARCHAR(50),
    code                  VARCHAR(50),
    total_units           NUMERIC(15, 3) NOT NULL DEFAULT 0,
    average_cost_per_unit NUMERIC(15, 4) NOT NULL DEFAULT 0,
    latest_nav            NUMERIC(15, 4) NOT NULL DEFAULT 0,
    last_nav_update       TIMESTAMP,
    current_value         NUMERIC(15, 2) NOT NULL DEFAULT 0,
    notes                 VARCHAR(500),
    created_at            TIMESTAMP NOT NULL DEFAULT NOW(),
    updated_at            TIMESTAMP NOT NULL DEFAULT NOW(),
    CONSTRAINT uq_mutual_funds_ledger_name UNIQUE (ledger_id, name)
);

CREATE INDEX IF NOT EXISTS idx_mutual_funds_ledger_id ON mutual_funds(ledger_id);
CREATE INDEX IF NOT EXISTS idx_mutual_funds_amc_id ON mutual_funds(amc_id);
";

const TRANSACTION_FLAG_SQL: &str = r"
ALTER TABLE transactions ADD COLUMN IF NOT EXISTS is_mf_transaction BOOLEAN NOT NULL DEFAULT FALSE;
";

const MF_TRANSACTIONS_SQL: &str = r"
CREATE TABLE IF NOT EXISTS mf_transactions (
    mf_transaction_id        SERIAL PRIMARY KEY,
    ledger_id                INTEGER NOT NULL REFERENCES ledgers(ledger_id),
    mutual_fund_id           INTEGER NOT NULL REFERENCES mutual_funds(mutual_fund_id),
    transaction_type         mf_transaction_type NOT NULL,
    units                    NUMERIC(15, 3) NOT NULL,
    nav_per_unit             NUMERIC(15, 4) NOT NULL,
    total_amount             NUMERIC(15, 2) NOT NULL,
    account_id               INTEGER REFERENCES accounts(account_id),
    financial_transaction_id INTEGER REFERENCES transactions(transaction_id),
    transaction_date         TIMESTAMP NOT NULL,
    notes                    VARCHAR(500),
    created_at               TIMESTAMP NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_mf_transactions_ledger_id ON mf_transactions(ledger_id);
CREATE INDEX IF NOT EXISTS idx_mf_transactions_fund_id ON mf_transactions(mutual_fund_id);
CREATE INDEX IF NOT EXISTS idx_mf_transactions_date ON mf_transactions(transaction_date);
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS mf_transactions;
ALTER TABLE transactions DROP COLUMN IF EXISTS is_mf_transaction;
DROP TABLE IF EXISTS mutual_funds;
DROP TABLE IF EXISTS amcs;
DROP TYPE IF EXISTS mf_transaction_type;
";
