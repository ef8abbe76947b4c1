//! Integration tests for physical asset holdings.

mod common;

use fintrack_core::asset::{AssetError, AssetTransactionType};
use fintrack_db::entities::{physical_assets, transactions};
use fintrack_db::repositories::{
    AssetTransactionError, AssetTransactionRepository, AssetTypeError, AssetTypeRepository,
    CreateAssetTypeInput, CreatePhysicalAssetInput, PhysicalAssetError, PhysicalAssetRepository,
    RecordAssetTradeInput,
};
use fintrack_shared::types::{AssetTransactionId, AssetTypeId, PhysicalAssetId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{DatabaseConnection, EntityTrait};

async fn create_gold(db: &DatabaseConnection, fixture: &common::Fixture) -> PhysicalAssetId {
    let asset_type = AssetTypeRepository::new(db.clone())
        .create(CreateAssetTypeInput {
            ledger_id: fixture.ledger_id,
            name: "Gold".to_string(),
            unit_name: "gram".to_string(),
            unit_symbol: "g".to_string(),
            notes: None,
        })
        .await
        .expect("Failed to create asset type");
    let asset = PhysicalAssetRepository::new(db.clone())
        .create(CreatePhysicalAssetInput {
            ledger_id: fixture.ledger_id,
            asset_type_id: AssetTypeId::new(asset_type.asset_type_id),
            name: "Gold Coins".to_string(),
            notes: None,
        })
        .await
        .expect("Failed to create asset");
    PhysicalAssetId::new(asset.physical_asset_id)
}

fn trade(
    fixture: &common::Fixture,
    asset_id: PhysicalAssetId,
    transaction_type: AssetTransactionType,
    quantity: Decimal,
    price: Decimal,
    day: u32,
) -> RecordAssetTradeInput {
    RecordAssetTradeInput {
        ledger_id: fixture.ledger_id,
        physical_asset_id: asset_id,
        account_id: fixture.account_id,
        transaction_type,
        quantity,
        price_per_unit: price,
        transaction_date: common::on(8, day),
        notes: None,
    }
}

async fn reload(db: &DatabaseConnection, asset_id: PhysicalAssetId) -> physical_assets::Model {
    physical_assets::Entity::find_by_id(asset_id.into_inner())
        .one(db)
        .await
        .expect("Failed to load asset")
        .expect("Asset missing")
}

#[tokio::test]
async fn test_buy_books_flagged_debit() {
    let Some(db) = common::connect().await else {
        return;
    };
    let fixture = common::create_fixture(&db, dec!(100000)).await;
    let asset_id = create_gold(&db, &fixture).await;
    let repo = AssetTransactionRepository::new(db.clone());

    let row = repo
        .record_trade(trade(&fixture, asset_id, AssetTransactionType::Buy, dec!(10), dec!(5000), 1))
        .await
        .expect("Failed to record buy");

    assert_eq!(row.total_amount, dec!(50000));
    let financial = transactions::Entity::find_by_id(row.financial_transaction_id.unwrap())
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert!(financial.is_asset_transaction);
    assert!(!financial.is_mf_transaction);
    assert_eq!(financial.debit, dec!(50000));
    assert!(financial.notes.unwrap().starts_with("Asset Buy: Gold Coins 10g"));

    let asset = reload(&db, asset_id).await;
    assert_eq!(asset.total_quantity, dec!(10));
    assert_eq!(asset.average_cost_per_unit, dec!(5000));
    assert_eq!(asset.current_value, dec!(50000));
    assert_eq!(common::account(&db, fixture.account_id).await.balance, dec!(50000));
}

#[tokio::test]
async fn test_buy_beyond_balance_is_rejected() {
    let Some(db) = common::connect().await else {
        return;
    };
    let fixture = common::create_fixture(&db, dec!(1000)).await;
    let asset_id = create_gold(&db, &fixture).await;

    let result = AssetTransactionRepository::new(db.clone())
        .record_trade(trade(&fixture, asset_id, AssetTransactionType::Buy, dec!(1), dec!(5000), 1))
        .await;

    assert!(matches!(
        result,
        Err(AssetTransactionError::Asset(AssetError::InsufficientBalance { .. }))
    ));
    assert_eq!(reload(&db, asset_id).await.total_quantity, Decimal::ZERO);
}

#[tokio::test]
async fn test_delete_replays_remaining_trades() {
    let Some(db) = common::connect().await else {
        return;
    };
    let fixture = common::create_fixture(&db, dec!(100000)).await;
    let asset_id = create_gold(&db, &fixture).await;
    let repo = AssetTransactionRepository::new(db.clone());

    let first = repo
        .record_trade(trade(&fixture, asset_id, AssetTransactionType::Buy, dec!(10), dec!(5000), 1))
        .await
        .expect("Failed to record first buy");
    repo.record_trade(trade(&fixture, asset_id, AssetTransactionType::Buy, dec!(5), dec!(6000), 2))
        .await
        .expect("Failed to record second buy");
    repo.record_trade(trade(&fixture, asset_id, AssetTransactionType::Sell, dec!(3), dec!(6500), 3))
        .await
        .expect("Failed to record sell");

    let asset = reload(&db, asset_id).await;
    assert_eq!(asset.total_quantity, dec!(12));
    assert_eq!(common::account(&db, fixture.account_id).await.balance, dec!(39500));

    repo.delete(
        fixture.ledger_id,
        AssetTransactionId::new(first.asset_transaction_id),
    )
    .await
    .expect("Failed to delete trade");

    let asset = reload(&db, asset_id).await;
    assert_eq!(asset.total_quantity, dec!(2));
    assert_eq!(asset.average_cost_per_unit, dec!(6000));
    assert_eq!(asset.latest_price_per_unit, dec!(6500));
    assert_eq!(asset.current_value, dec!(13000));
    assert_eq!(common::account(&db, fixture.account_id).await.balance, dec!(89500));
    let remaining = repo
        .list_for_asset(fixture.ledger_id, asset_id)
        .await
        .expect("Failed to list trades");
    assert_eq!(remaining.len(), 2);
}

#[tokio::test]
async fn test_asset_and_type_deletion_guards() {
    let Some(db) = common::connect().await else {
        return;
    };
    let fixture = common::create_fixture(&db, dec!(100000)).await;
    let asset_id = create_gold(&db, &fixture).await;
    AssetTransactionRepository::new(db.clone())
        .record_trade(trade(&fixture, asset_id, AssetTransactionType::Buy, dec!(1), dec!(5000), 1))
        .await
        .expect("Failed to record buy");
    let asset = reload(&db, asset_id).await;

    let asset_delete = PhysicalAssetRepository::new(db.clone())
        .delete(fixture.ledger_id, asset_id)
        .await;
    assert!(matches!(
        asset_delete,
        Err(PhysicalAssetError::HasTransactions(1))
    ));

    let type_delete = AssetTypeRepository::new(db.clone())
        .delete(fixture.ledger_id, AssetTypeId::new(asset.asset_type_id))
        .await;
    assert!(matches!(type_delete, Err(AssetTypeError::HasAssets(1))));
}
