//! Integration tests for mutual fund holdings.
//!
//! Covers fund uniqueness per owner, trades with charges, switches and
//! reversals against a live database.

mod common;

use fintrack_core::fund::TradeSide;
use fintrack_db::entities::{mutual_funds, transactions};
use fintrack_db::entities::sea_orm_active_enums::MfTransactionType;
use fintrack_db::repositories::{
    AmcRepository, CreateAmcInput, CreateMutualFundInput, MfTransactionError,
    MfTransactionRepository, MutualFundError, MutualFundRepository, RecordTradeInput,
    SwitchUnitsInput,
};
use fintrack_shared::types::{AmcId, LedgerId, MfTransactionId, MutualFundId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{DatabaseConnection, EntityTrait};

async fn create_amc(db: &DatabaseConnection, ledger_id: LedgerId, name: &str) -> AmcId {
    let amc = AmcRepository::new(db.clone())
        .create(CreateAmcInput {
            ledger_id,
            name: name.to_string(),
            notes: None,
        })
        .await
        .expect("Failed to create AMC");
    AmcId::new(amc.amc_id)
}

fn fund_input(
    ledger_id: LedgerId,
    amc_id: AmcId,
    name: &str,
    owner: Option<&str>,
) -> CreateMutualFundInput {
    CreateMutualFundInput {
        ledger_id,
        amc_id,
        name: name.to_string(),
        owner: owner.map(str::to_string),
        plan: Some("Direct Growth".to_string()),
        code: None,
        asset_class: Some("Equity".to_string()),
        asset_sub_class: Some("Mid Cap".to_string()),
        notes: None,
    }
}

async fn create_fund(
    db: &DatabaseConnection,
    ledger_id: LedgerId,
    amc_id: AmcId,
    name: &str,
) -> MutualFundId {
    let fund = MutualFundRepository::new(db.clone())
        .create(fund_input(ledger_id, amc_id, name, None))
        .await
        .expect("Failed to create fund");
    MutualFundId::new(fund.mutual_fund_id)
}

async fn reload(db: &DatabaseConnection, fund_id: MutualFundId) -> mutual_funds::Model {
    mutual_funds::Entity::find_by_id(fund_id.into_inner())
        .one(db)
        .await
        .expect("Failed to load fund")
        .expect("Fund missing")
}

fn buy(
    fixture: &common::Fixture,
    fund_id: MutualFundId,
    units: Decimal,
    amount: Decimal,
    charges: Decimal,
) -> RecordTradeInput {
    RecordTradeInput {
        ledger_id: fixture.ledger_id,
        mutual_fund_id: fund_id,
        account_id: fixture.account_id,
        side: TradeSide::Buy,
        units,
        amount_excluding_charges: amount,
        other_charges: charges,
        expense_category_id: Some(fixture.expense_category_id),
        transaction_date: common::on(6, 2),
        notes: None,
    }
}

#[tokio::test]
async fn test_fund_name_unique_per_owner() {
    let Some(db) = common::connect().await else {
        return;
    };
    let fixture = common::create_fixture(&db, dec!(0)).await;
    let amc_id = create_amc(&db, fixture.ledger_id, "HDFC").await;
    let repo = MutualFundRepository::new(db.clone());

    let mine = repo
        .create(fund_input(fixture.ledger_id, amc_id, "HDFC Mid Cap Fund", None))
        .await
        .expect("First fund should be created");
    let spouse = repo
        .create(fund_input(
            fixture.ledger_id,
            amc_id,
            "HDFC Mid Cap Fund",
            Some("Spouse"),
        ))
        .await
        .expect("Same name with an owner should be created");
    assert_ne!(mine.mutual_fund_id, spouse.mutual_fund_id);
    assert_eq!(spouse.owner.as_deref(), Some("Spouse"));

    let duplicate = repo
        .create(fund_input(fixture.ledger_id, amc_id, "HDFC Mid Cap Fund", None))
        .await;
    assert!(matches!(
        duplicate,
        Err(MutualFundError::DuplicateName { ref owner, .. }) if owner.is_empty()
    ));

    // A blank owner is the same key as no owner.
    let blank = repo
        .create(fund_input(
            fixture.ledger_id,
            amc_id,
            "HDFC Mid Cap Fund",
            Some("  "),
        ))
        .await;
    assert!(matches!(blank, Err(MutualFundError::DuplicateName { .. })));
}

#[tokio::test]
async fn test_buy_with_charges_books_charge_transaction() {
    let Some(db) = common::connect().await else {
        return;
    };
    let fixture = common::create_fixture(&db, dec!(10000)).await;
    let amc_id = create_amc(&db, fixture.ledger_id, "HDFC").await;
    let fund_id = create_fund(&db, fixture.ledger_id, amc_id, "HDFC Flexi Cap Fund").await;
    let repo = MfTransactionRepository::new(db.clone());

    let row = repo
        .record_trade(buy(&fixture, fund_id, dec!(100), dec!(1000), dec!(10)))
        .await
        .expect("Failed to record buy");

    assert_eq!(row.transaction_type, MfTransactionType::Buy);
    assert_eq!(row.total_amount, dec!(1010));
    assert_eq!(row.amount_excluding_charges, dec!(1000));
    assert_eq!(row.other_charges, dec!(10));
    assert_eq!(row.nav_per_unit, dec!(10));
    assert_eq!(row.realized_gain, None);

    let financial = transactions::Entity::find_by_id(row.financial_transaction_id.unwrap())
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert!(financial.is_mf_transaction);
    assert_eq!(financial.debit, dec!(1000));

    let charge = transactions::Entity::find_by_id(row.linked_charge_transaction_id.unwrap())
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert!(!charge.is_mf_transaction);
    assert_eq!(charge.debit, dec!(10));
    assert_eq!(
        charge.category_id,
        Some(fixture.expense_category_id.into_inner())
    );

    let account = common::account(&db, fixture.account_id).await;
    assert_eq!(account.balance, dec!(8990));
    assert_eq!(account.net_balance, dec!(8990));

    let fund = reload(&db, fund_id).await;
    assert_eq!(fund.total_units, dec!(100));
    assert_eq!(fund.average_cost_per_unit, dec!(10));
    assert_eq!(fund.current_value, dec!(1000));
    assert_eq!(fund.total_invested_cash, dec!(1000));
    assert_eq!(fund.external_cash_invested, dec!(1000));
}

#[tokio::test]
async fn test_charges_require_category() {
    let Some(db) = common::connect().await else {
        return;
    };
    let fixture = common::create_fixture(&db, dec!(10000)).await;
    let amc_id = create_amc(&db, fixture.ledger_id, "Axis").await;
    let fund_id = create_fund(&db, fixture.ledger_id, amc_id, "Axis Bluechip Fund").await;
    let repo = MfTransactionRepository::new(db.clone());

    let mut input = buy(&fixture, fund_id, dec!(10), dec!(500), dec!(5));
    input.expense_category_id = None;
    let result = repo.record_trade(input).await;

    assert!(matches!(result, Err(MfTransactionError::ChargeCategoryRequired)));
    assert_eq!(reload(&db, fund_id).await.total_units, Decimal::ZERO);
    assert_eq!(common::account(&db, fixture.account_id).await.balance, dec!(10000));
}

#[tokio::test]
async fn test_sell_then_reverse_restores_fund_and_account() {
    let Some(db) = common::connect().await else {
        return;
    };
    let fixture = common::create_fixture(&db, dec!(10000)).await;
    let amc_id = create_amc(&db, fixture.ledger_id, "SBI").await;
    let fund_id = create_fund(&db, fixture.ledger_id, amc_id, "SBI Small Cap Fund").await;
    let repo = MfTransactionRepository::new(db.clone());

    repo.record_trade(buy(&fixture, fund_id, dec!(100), dec!(1000), dec!(0)))
        .await
        .expect("Failed to record buy");
    let mut sell = buy(&fixture, fund_id, dec!(40), dec!(480), dec!(0));
    sell.side = TradeSide::Sell;
    sell.transaction_date = common::on(6, 20);
    let sell = repo.record_trade(sell).await.expect("Failed to record sell");

    assert_eq!(sell.realized_gain, Some(dec!(80)));
    assert_eq!(sell.cost_basis_of_units_sold, Some(dec!(400)));
    let fund = reload(&db, fund_id).await;
    assert_eq!(fund.total_units, dec!(60));
    assert_eq!(fund.total_realized_gain, dec!(80));
    assert_eq!(common::account(&db, fixture.account_id).await.balance, dec!(9480));

    let removed = repo
        .reverse(fixture.ledger_id, MfTransactionId::new(sell.mf_transaction_id))
        .await
        .expect("Failed to reverse sell");
    assert_eq!(removed, vec![MfTransactionId::new(sell.mf_transaction_id)]);

    let fund = reload(&db, fund_id).await;
    assert_eq!(fund.total_units, dec!(100));
    assert_eq!(fund.average_cost_per_unit, dec!(10));
    assert_eq!(fund.total_realized_gain, Decimal::ZERO);
    assert_eq!(common::account(&db, fixture.account_id).await.balance, dec!(9000));
    let financial = transactions::Entity::find_by_id(sell.financial_transaction_id.unwrap())
        .one(&db)
        .await
        .unwrap();
    assert!(financial.is_none());
}

#[tokio::test]
async fn test_switch_links_both_legs() {
    let Some(db) = common::connect().await else {
        return;
    };
    let fixture = common::create_fixture(&db, dec!(10000)).await;
    let amc_id = create_amc(&db, fixture.ledger_id, "HDFC").await;
    let fund_a = create_fund(&db, fixture.ledger_id, amc_id, "Fund A").await;
    let fund_b = create_fund(&db, fixture.ledger_id, amc_id, "Fund B").await;
    let repo = MfTransactionRepository::new(db.clone());

    repo.record_trade(buy(&fixture, fund_a, dec!(100), dec!(1000), dec!(0)))
        .await
        .expect("Failed to record buy");
    let switch = repo
        .switch_units(SwitchUnitsInput {
            ledger_id: fixture.ledger_id,
            source_fund_id: fund_a,
            target_fund_id: fund_b,
            units: dec!(100),
            source_nav: dec!(12),
            target_nav: dec!(20),
            transaction_date: common::on(7, 1),
            notes: Some("Rebalance".to_string()),
        })
        .await
        .expect("Failed to switch");

    let out = &switch.switch_out;
    let inn = &switch.switch_in;
    assert_eq!(out.transaction_type, MfTransactionType::SwitchOut);
    assert_eq!(inn.transaction_type, MfTransactionType::SwitchIn);
    assert_eq!(out.linked_transaction_id, Some(inn.mf_transaction_id));
    assert_eq!(inn.linked_transaction_id, Some(out.mf_transaction_id));
    assert_eq!(out.target_fund_id, Some(fund_b.into_inner()));
    assert_eq!(out.total_amount, dec!(1200));
    assert_eq!(inn.total_amount, dec!(1200));
    assert_eq!(inn.units, dec!(60));
    assert_eq!(out.realized_gain, Some(dec!(200)));
    assert_eq!(out.cost_basis_of_units_sold, Some(dec!(1000)));
    assert_eq!(out.financial_transaction_id, None);

    let a = reload(&db, fund_a).await;
    assert_eq!(a.total_units, Decimal::ZERO);
    assert_eq!(a.total_realized_gain, dec!(200));
    assert_eq!(a.external_cash_invested, dec!(1000));
    let b = reload(&db, fund_b).await;
    assert_eq!(b.total_units, dec!(60));
    assert_eq!(b.average_cost_per_unit, dec!(20));
    assert_eq!(b.current_value, dec!(1200));
    assert_eq!(b.external_cash_invested, Decimal::ZERO);

    // Switches never touch accounts.
    assert_eq!(common::account(&db, fixture.account_id).await.balance, dec!(9000));

    let removed = repo
        .reverse(fixture.ledger_id, MfTransactionId::new(inn.mf_transaction_id))
        .await
        .expect("Failed to reverse switch");
    assert_eq!(removed.len(), 2);

    let a = reload(&db, fund_a).await;
    assert_eq!(a.total_units, dec!(100));
    assert_eq!(a.average_cost_per_unit, dec!(10));
    assert_eq!(a.total_realized_gain, Decimal::ZERO);
    let b = reload(&db, fund_b).await;
    assert_eq!(b.total_units, Decimal::ZERO);
}

#[tokio::test]
async fn test_switch_to_same_fund_is_rejected() {
    let Some(db) = common::connect().await else {
        return;
    };
    let fixture = common::create_fixture(&db, dec!(0)).await;
    let amc_id = create_amc(&db, fixture.ledger_id, "HDFC").await;
    let fund = create_fund(&db, fixture.ledger_id, amc_id, "Fund A").await;

    let result = MfTransactionRepository::new(db.clone())
        .switch_units(SwitchUnitsInput {
            ledger_id: fixture.ledger_id,
            source_fund_id: fund,
            target_fund_id: fund,
            units: dec!(1),
            source_nav: dec!(10),
            target_nav: dec!(10),
            transaction_date: common::on(7, 1),
            notes: None,
        })
        .await;

    assert!(matches!(result, Err(MfTransactionError::Fund(_))));
}

#[tokio::test]
async fn test_fund_with_units_cannot_be_deleted() {
    let Some(db) = common::connect().await else {
        return;
    };
    let fixture = common::create_fixture(&db, dec!(5000)).await;
    let amc_id = create_amc(&db, fixture.ledger_id, "ICICI").await;
    let fund_id = create_fund(&db, fixture.ledger_id, amc_id, "ICICI Value Fund").await;
    MfTransactionRepository::new(db.clone())
        .record_trade(buy(&fixture, fund_id, dec!(10), dec!(100), dec!(0)))
        .await
        .expect("Failed to record buy");

    let result = MutualFundRepository::new(db.clone())
        .delete(fixture.ledger_id, fund_id)
        .await;

    assert!(matches!(result, Err(MutualFundError::HasUnits(_))));
}
