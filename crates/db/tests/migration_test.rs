//! Integration tests for the migration chain.

mod common;

use fintrack_db::migration::{self, Migrator};
use rust_decimal_macros::dec;
use sea_orm::{ConnectionTrait, DbBackend, Statement, TransactionTrait};
use sea_orm_migration::{MigrationName, MigratorTrait, SchemaManager};

#[tokio::test]
async fn test_statements_can_be_replayed() {
    let Some(db) = common::connect().await else {
        return;
    };

    for (name, statements) in migration::statements() {
        for sql in statements {
            if let Err(e) = db.execute_unprepared(sql).await {
                panic!("Replaying {name} failed: {e}");
            }
        }
    }
}

#[tokio::test]
async fn test_every_migration_is_recorded() {
    let Some(db) = common::connect().await else {
        return;
    };

    let pending = Migrator::get_pending_migrations(&db)
        .await
        .expect("Failed to read migration status");
    assert!(pending.is_empty());
}

#[tokio::test]
async fn test_switch_values_exist_on_enum() {
    let Some(db) = common::connect().await else {
        return;
    };

    let row = db
        .query_one(Statement::from_string(
            DbBackend::Postgres,
            "SELECT string_agg(e.enumlabel, ',' ORDER BY e.enumsortorder) AS labels \
             FROM pg_enum e JOIN pg_type t ON t.oid = e.enumtypid \
             WHERE t.typname = 'mf_transaction_type'",
        ))
        .await
        .expect("Failed to query enum")
        .expect("Enum missing");
    let labels: String = row.try_get("", "labels").expect("labels column");

    assert_eq!(labels, "buy,sell,switch_out,switch_in");
}

#[tokio::test]
async fn test_owner_key_is_generated() {
    let Some(db) = common::connect().await else {
        return;
    };

    let row = db
        .query_one(Statement::from_string(
            DbBackend::Postgres,
            "SELECT is_generated::text AS is_generated FROM information_schema.columns \
             WHERE table_name = 'mutual_funds' AND column_name = 'owner_key'",
        ))
        .await
        .expect("Failed to query columns")
        .expect("owner_key missing");
    let generated: String = row.try_get("", "is_generated").expect("is_generated column");

    assert_eq!(generated, "ALWAYS");
}

#[tokio::test]
async fn test_owner_rollback_tolerates_repeated_names() {
    let Some(db) = common::connect().await else {
        return;
    };
    let fixture = common::create_fixture(&db, dec!(0)).await;
    let ledger_id = fixture.ledger_id.into_inner();
    db.execute(Statement::from_sql_and_values(
        DbBackend::Postgres,
        "WITH amc AS ( \
             INSERT INTO amcs (ledger_id, name) VALUES ($1, 'HDFC') RETURNING amc_id \
         ) \
         INSERT INTO mutual_funds (ledger_id, amc_id, name, owner) \
         SELECT $1, amc_id, 'HDFC Mid Cap Fund', o FROM amc, (VALUES (NULL), ('Spouse')) AS v(o)",
        [ledger_id.into()],
    ))
    .await
    .expect("Failed to seed funds");

    let owner_migration = Migrator::migrations()
        .into_iter()
        .find(|m| m.name() == "m20250901_000001_mf_owner")
        .expect("owner migration registered");

    // DDL is transactional in PostgreSQL; rolling back leaves the schema intact.
    let txn = db.begin().await.expect("Failed to begin");
    owner_migration
        .down(&SchemaManager::new(&txn))
        .await
        .expect("rollback must not fail on repeated names");
    let restored = txn
        .query_one(Statement::from_string(
            DbBackend::Postgres,
            "SELECT 1 AS found FROM pg_constraint WHERE conname = 'uq_mutual_funds_ledger_name'",
        ))
        .await
        .expect("Failed to query constraints");
    txn.rollback().await.expect("Failed to roll back");

    assert!(restored.is_none());
}
