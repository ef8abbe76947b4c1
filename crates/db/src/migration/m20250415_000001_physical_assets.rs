//! Physical asset holdings: asset types, assets and their trades.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Statements applied by `up`, in order.
pub(super) const STATEMENTS: &[&str] = &[
    ENUM_SQL,
    ASSET_TYPES_SQL,
    PHYSICAL_ASSETS_SQL,
    TRANSACTION_FLAG_SQL,
    ASSET_TRANSACTIONS_SQL,
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
    CREATE TYPE asset_transaction_type AS ENUM ('buy', 'sell');
EXCEPTION WHEN duplicate_object THEN NULL;
END $$;
";

const ASSET_TYPES_SQL: &str = r"
CREATE TABLE IF NOT EXISTS asset_types (
    asset_type_id SERIAL PRIMARY KEY,
    ledger_id     INTEGER NOT NULL REFERENCES ledgers(ledger_id),
    name          VARCHAR(100) NOT NULL,
    unit_name     VARCHAR(50) NOT NULL,
    unit_symbol   VARCHAR(10) NOT NULL,
    notes         VARCHAR(500),
    created_at    TIMESTAMP NOT NULL DEFAULT NOW(),
    CONSTRAINT uq_ledger_asset_type_name UNIQUE (ledger_id, name)
);

CREATE INDEX IF NOT EXISTS idx_asset_types_ledger_id ON asset_types(ledger_id);
";

const PHYSICAL_ASSETS_SQL: &str = r"
CREATE TABLE IF NOT EXISTS physical_assets (
    physical_asset_id     SERIAL PRIMARY KEY,
    ledger_id             INTEGER NOT NULL REFERENCES ledgers(ledger_id),
    asset_type_id         INTEGER NOT NULL REFERENCES asset_types(asset_type_id),
    name                  VARCHAR(100) NOT NULL,
    total_quantity        NUMERIC(15, 6) NOT NULL DEFAULT 0,
    average_cost_per_unit NUMERIC(15, 4) NOT NULL DEFAULT 0,
    latest_price_per_unit NUMERIC(15, 4) NOT NULL DEFAULT 0,
    last_price_update     TIMESTAMP,
    current_value         NUMERIC(15, 2) NOT NULL DEFAULT 0,
    notes                 VARCHAR(500),
    created_at            TIMESTAMP NOT NULL DEFAULT NOW(),
    updated_at            TIMESTAMP NOT NULL DEFAULT NOW(),
    CONSTRAINT uq_ledger_physical_asset_name UNIQUE (ledger_id, name)
);

CREATE INDEX IF NOT EXISTS idx_physical_assets_ledger_id ON physical_assets(ledger_id);
CREATE INDEX IF NOT EXISTS idx_physical_assets_asset_type_id ON physical_assets(asset_type_id);
";

const TRANSACTION_FLAG_SQL: &str = r"
ALTER TABLE transactions ADD COLUMN IF NOT EXISTS is_asset_transaction BOOLEAN NOT NULL DEFAULT FALSE;
";

const ASSET_TRANSACTIONS_SQL: &str = r"
CREATE TABLE IF NOT EXISTS asset_transactions (
    asset_transaction_id     SERIAL PRIMARY KEY,
    ledger_id                INTEGER NOT NULL REFERENCES ledgers(ledger_id),
    physical_asset_id        INTEGER NOT NULL REFERENCES physical_assets(physical_asset_id),
    transaction_type         asset_transaction_type NOT NULL,
    quantity                 NUMERIC(15, 6) NOT NULL,
    price_per_unit           NUMERIC(15, 4) NOT NULL,
    total_amount             NUMERIC(15, 2) NOT NULL,
    account_id               INTEGER NOT NULL REFERENCES accounts(account_id),
    financial_transaction_id INTEGER REFERENCES transactions(transaction_id),
    transaction_date         TIMESTAMP NOT NULL,
    notes                    VARCHAR(500),
    created_at               TIMESTAMP NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_asset_transactions_ledger_id ON asset_transactions(ledger_id);
CREATE INDEX IF NOT EXISTS idx_asset_transactions_asset_id ON asset_transactions(physical_asset_id);
CREATE INDEX IF NOT EXISTS idx_asset_transactions_account_id ON asset_transactions(account_id);
CREATE INDEX IF NOT EXISTS idx_asset_transactions_date ON asset_transactions(transaction_date);
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS asset_transactions;
ALTER TABLE transactions DROP COLUMN IF EXISTS is_asset_transaction;
DROP TABLE IF EXISTS physical_assets;
DROP TABLE IF EXISTS asset_types;
DROP TYPE IF EXISTS asset_transaction_type;
";
