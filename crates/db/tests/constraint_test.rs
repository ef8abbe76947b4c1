//! Integration tests for constraint violation classification.
//!
//! Rows are written with raw SQL so the storage layer, not the
//! repositories, is the one rejecting them.

mod common;

use fintrack_db::ConstraintViolation;
use rust_decimal_macros::dec;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, DbErr, Statement};

async fn insert_fund(db: &DatabaseConnection, ledger_id: i32) -> i32 {
    let amc = db
        .query_one(Statement::from_sql_and_values(
            DbBackend::Postgres,
            "INSERT INTO amcs (ledger_id, name) VALUES ($1, 'HDFC') RETURNING amc_id",
            [ledger_id.into()],
        ))
        .await
        .expect("Failed to insert AMC")
        .expect("No AMC row returned");
    let amc_id: i32 = amc.try_get("", "amc_id").expect("amc_id column");

    let fund = db
        .query_one(Statement::from_sql_and_values(
            DbBackend::Postgres,
            "INSERT INTO mutual_funds (ledger_id, amc_id, name) \
             VALUES ($1, $2, 'HDFC Mid Cap Fund') RETURNING mutual_fund_id",
            [ledger_id.into(), amc_id.into()],
        ))
        .await
        .expect("Failed to insert fund")
        .expect("No fund row returned");
    fund.try_get("", "mutual_fund_id").expect("mutual_fund_id column")
}

async fn insert_mf_row(
    db: &DatabaseConnection,
    ledger_id: i32,
    fund_id: i32,
    transaction_type: &str,
) -> Result<(), DbErr> {
    let sql = format!(
        "INSERT INTO mf_transactions \
         (ledger_id, mutual_fund_id, transaction_type, units, nav_per_unit, \
          total_amount, amount_excluding_charges, other_charges, transaction_date) \
         VALUES ($1, $2, '{transaction_type}', 100, 10, $3, $4, $5, '2025-06-03')"
    );
    db.execute(Statement::from_sql_and_values(
        DbBackend::Postgres,
        sql,
        [
            ledger_id.into(),
            fund_id.into(),
            dec!(1000).into(),
            dec!(1000).into(),
            dec!(10).into(),
        ],
    ))
    .await
    .map(|_| ())
}

#[tokio::test]
async fn test_charge_split_mismatch_is_check_violation() {
    let Some(db) = common::connect().await else {
        return;
    };
    let fixture = common::create_fixture(&db, dec!(0)).await;
    let ledger_id = fixture.ledger_id.into_inner();
    let fund_id = insert_fund(&db, ledger_id).await;

    for kind in ["buy", "sell"] {
        let err = insert_mf_row(&db, ledger_id, fund_id, kind)
            .await
            .expect_err("total must equal amount plus charges");
        assert_eq!(
            ConstraintViolation::classify(&err),
            Some(ConstraintViolation::Check {
                constraint: Some("chk_mf_transactions_charge_split".to_string()),
            }),
            "{kind}: {err}"
        );
    }
}

#[tokio::test]
async fn test_switch_rows_skip_charge_split_check() {
    let Some(db) = common::connect().await else {
        return;
    };
    let fixture = common::create_fixture(&db, dec!(0)).await;
    let ledger_id = fixture.ledger_id.into_inner();
    let fund_id = insert_fund(&db, ledger_id).await;

    insert_mf_row(&db, ledger_id, fund_id, "switch_in")
        .await
        .expect("switch legs are not charge split");
}

#[tokio::test]
async fn test_unknown_transaction_type_is_invalid_input() {
    let Some(db) = common::connect().await else {
        return;
    };
    let fixture = common::create_fixture(&db, dec!(0)).await;
    let ledger_id = fixture.ledger_id.into_inner();
    let fund_id = insert_fund(&db, ledger_id).await;

    let err = insert_mf_row(&db, ledger_id, fund_id, "dividend")
        .await
        .expect_err("dividend is not a transaction type");
    assert_eq!(
        ConstraintViolation::classify(&err),
        Some(ConstraintViolation::InvalidInput)
    );
}

#[tokio::test]
async fn test_missing_ledger_is_foreign_key_violation() {
    let Some(db) = common::connect().await else {
        return;
    };

    let err = db
        .execute_unprepared(
            "INSERT INTO asset_types (ledger_id, name, unit_name, unit_symbol) \
             VALUES (-1, 'Gold', 'gram', 'g')",
        )
        .await
        .expect_err("ledger -1 does not exist");
    let violation = ConstraintViolation::classify(&err).expect("classified");
    assert!(violation.is_foreign_key());
    assert_eq!(
        violation,
        ConstraintViolation::ForeignKey {
            constraint: Some("asset_types_ledger_id_fkey".to_string()),
        }
    );
}

#[tokio::test]
async fn test_duplicate_amc_is_unique_violation() {
    let Some(db) = common::connect().await else {
        return;
    };
    let fixture = common::create_fixture(&db, dec!(0)).await;
    let ledger_id = fixture.ledger_id.into_inner();
    insert_fund(&db, ledger_id).await;

    let err = db
        .execute(Statement::from_sql_and_values(
            DbBackend::Postgres,
            "INSERT INTO amcs (ledger_id, name) VALUES ($1, 'HDFC')",
            [ledger_id.into()],
        ))
        .await
        .expect_err("AMC names are unique per ledger");
    assert!(fintrack_db::constraint::is_unique_violation(
        &err,
        "uq_amcs_ledger_name"
    ));
}
