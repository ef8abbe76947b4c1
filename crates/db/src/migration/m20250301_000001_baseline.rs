//! Baseline schema: users, ledgers, accounts, categories, transactions.
//!
//! These tables predate the holdings features. Every statement is guarded so
//! the migration can be applied to an empty database or on top of a legacy one.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Statements applied by `up`, in order.
pub(super) const STATEMENTS: &[&str] = &[
    ENUMS_SQL,
    USERS_SQL,
    LEDGERS_SQL,
    ACCOUNTS_SQL,
    CATEGORIES_SQL,
    TRANSACTIONS_SQL,
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

const ENUMS_SQL: &str = r"
DO $$ BEGIN
    CREATE TYPE account_type AS ENUM ('asset', 'liability');
EXCEPTION WHEN duplicate_object THEN NULL;
END $$;

DO $$ BEGIN
    CREATE TYPE category_type AS ENUM ('income', 'expense');
EXCEPTION WHEN duplicate_object THEN NULL;
END $$;

DO $$ BEGIN
    CREATE TYPE transfer_type AS ENUM ('source', 'destination');
EXCEPTION WHEN duplicate_object THEN NULL;
END $$;
";

const USERS_SQL: &str = r"
CREATE TABLE IF NOT EXISTS users (
    user_id         SERIAL PRIMARY KEY,
    full_name       VARCHAR(100) NOT NULL,
    username        VARCHAR(50) NOT NULL,
    email           VARCHAR(100) NOT NULL,
    hashed_password VARCHAR(100) NOT NULL,
    created_at      TIMESTAMP NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMP NOT NULL DEFAULT NOW(),
    CONSTRAINT users_username_key UNIQUE (username),
    CONSTRAINT users_email_key UNIQUE (email)
);
";

const LEDGERS_SQL: &str = r"
CREATE TABLE IF NOT EXISTS ledgers (
    ledger_id       SERIAL PRIMARY KEY,
    user_id         INTEGER NOT NULL REFERENCES users(user_id),
    name            VARCHAR(100) NOT NULL,
    description     VARCHAR(100),
    currency_symbol VARCHAR(10) NOT NULL,
    notes           VARCHAR(500),
    created_at      TIMESTAMP NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMP NOT NULL DEFAULT NOW(),
    CONSTRAINT uq_user_ledger_name UNIQUE (user_id, name)
);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE IF NOT EXISTS accounts (
    account_id        SERIAL PRIMARY KEY,
    ledger_id         INTEGER NOT NULL REFERENCES ledgers(ledger_id),
    parent_account_id INTEGER REFERENCES accounts(account_id),
    name              VARCHAR(100) NOT NULL,
    description       VARCHAR(100),
    type              account_type NOT NULL,
    is_group          BOOLEAN NOT NULL DEFAULT FALSE,
    opening_balance   NUMERIC(15, 2) NOT NULL DEFAULT 0,
    balance           NUMERIC(15, 2) NOT NULL DEFAULT 0,
    net_balance       NUMERIC(15, 2) NOT NULL DEFAULT 0,
    notes             VARCHAR(500),
    created_at        TIMESTAMP NOT NULL DEFAULT NOW(),
    updated_at        TIMESTAMP NOT NULL DEFAULT NOW(),
    CONSTRAINT uq_ledger_account_name UNIQUE (ledger_id, name)
);
";

const CATEGORIES_SQL: &str = r"
CREATE TABLE IF NOT EXISTS categories (
    category_id        SERIAL PRIMARY KEY,
    user_id            INTEGER NOT NULL REFERENCES users(user_id),
    parent_category_id INTEGER REFERENCES categories(category_id),
    name               VARCHAR(100) NOT NULL,
    type               category_type NOT NULL,
    is_group           BOOLEAN NOT NULL DEFAULT FALSE,
    CONSTRAINT uq_parent_category_name UNIQUE (parent_category_id, name)
);
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE IF NOT EXISTS transactions (
    transaction_id SERIAL PRIMARY KEY,
    account_id     INTEGER NOT NULL REFERENCES accounts(account_id),
    category_id    INTEGER REFERENCES categories(category_id),
    credit         NUMERIC(15, 2) NOT NULL DEFAULT 0,
    debit          NUMERIC(15, 2) NOT NULL DEFAULT 0,
    date           TIMESTAMP NOT NULL,
    notes          VARCHAR(500),
    is_split       BOOLEAN NOT NULL DEFAULT FALSE,
    is_transfer    BOOLEAN NOT NULL DEFAULT FALSE,
    transfer_id    UUID,
    transfer_type  transfer_type,
    created_at     TIMESTAMP NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_transactions_account_id ON transactions(account_id);
CREATE INDEX IF NOT EXISTS idx_transactions_category_id ON transactions(category_id);
CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);
CREATE INDEX IF NOT EXISTS idx_transactions_account_id_date ON transactions(account_id, date);
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS transactions;
DROP TABLE IF EXISTS categories;
DROP TABLE IF EXISTS accounts;
DROP TABLE IF EXISTS ledgers;
DROP TABLE IF EXISTS users;
DROP TYPE IF EXISTS transfer_type;
DROP TYPE IF EXISTS category_type;
DROP TYPE IF EXISTS account_type;
";
