//! Physical asset transaction repository.
//!
//! Trades are booked against an account as ledger transactions flagged
//! `is_asset_transaction`. Deleting a trade rebuilds the asset by replaying
//! the trades that remain.

use chrono::{NaiveDateTime, Utc};
use fintrack_core::asset::{
    AssetError, AssetPosition, AssetTradeInput, AssetTransactionType, ensure_sufficient_balance,
};
use fintrack_core::integrity::DomainKind;
use fintrack_shared::AppError;
use fintrack_shared::types::{AccountId, AssetTransactionId, LedgerId, PhysicalAssetId};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use super::booking::{self, Booking};
use super::physical_asset::{PhysicalAssetError, lock_asset, save_position};
use crate::entities::{asset_transactions, asset_types};

/// Error types for asset transaction operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetTransactionError {
    /// Transaction not found in the ledger.
    #[error("Asset transaction not found: {0}")]
    NotFound(AssetTransactionId),

    /// Account not found in the ledger.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Position rule rejected the trade.
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// Asset lookup failed.
    #[error(transparent)]
    PhysicalAsset(#[from] PhysicalAssetError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<AssetTransactionError> for AppError {
    fn from(err: AssetTransactionError) -> Self {
        match err {
            AssetTransactionError::NotFound(_) | AssetTransactionError::AccountNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            AssetTransactionError::Asset(e) => e.into(),
            AssetTransactionError::PhysicalAsset(e) => e.into(),
            AssetTransactionError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for recording an asset trade.
#[derive(Debug, Clone)]
pub struct RecordAssetTradeInput {
    /// Owning ledger.
    pub ledger_id: LedgerId,
    /// Asset traded.
    pub physical_asset_id: PhysicalAssetId,
    /// Account paying for a buy or receiving a sell.
    pub account_id: AccountId,
    /// Buy or sell.
    pub transaction_type: AssetTransactionType,
    /// Quantity traded.
    pub quantity: Decimal,
    /// Price per unit.
    pub price_per_unit: Decimal,
    /// When the trade happened.
    pub transaction_date: NaiveDateTime,
    /// Free text.
    pub notes: Option<String>,
}

/// Asset transaction repository.
#[derive(Debug, Clone)]
pub struct AssetTransactionRepository {
    db: DatabaseConnection,
}

impl AssetTransactionRepository {
    /// Creates a new asset transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a buy or sell.
    ///
    /// A buy requires the account's net balance to cover the total.
    pub async fn record_trade(
        &self,
        input: RecordAssetTradeInput,
    ) -> Result<asset_transactions::Model, AssetTransactionError> {
        let ledger_id = input.ledger_id.into_inner();
        let account_id = input.account_id.into_inner();

        let txn = self.db.begin().await?;
        let asset = lock_asset(&txn, input.ledger_id, input.physical_asset_id).await?;
        let account = booking::lock_account(&txn, ledger_id, account_id)
            .await?
            .ok_or(AssetTransactionError::AccountNotFound(input.account_id))?;

        let trade = AssetTradeInput {
            transaction_type: input.transaction_type,
            quantity: input.quantity,
            price_per_unit: input.price_per_unit,
            transaction_date: input.transaction_date,
        };
        if trade.transaction_type == AssetTransactionType::Buy {
            ensure_sufficient_balance(account.net_balance, trade.total_amount())?;
        }
        let mut position = asset.position();
        let total = position.apply_trade(&trade)?;

        let unit_symbol = asset_types::Entity::find_by_id(asset.asset_type_id)
            .one(&txn)
            .await?
            .map(|t| t.unit_symbol)
            .unwrap_or_default();
        let label = match trade.transaction_type {
            AssetTransactionType::Buy => "Buy",
            AssetTransactionType::Sell => "Sell",
        };
        let description = format!(
            "Asset {label}: {} {}{unit_symbol} at {} per unit",
            asset.name,
            input.quantity.normalize(),
            input.price_per_unit.round_dp(2)
        );
        let main = match trade.transaction_type {
            AssetTransactionType::Buy => {
                Booking::debit(account_id, total, input.transaction_date, description)
            }
            AssetTransactionType::Sell => {
                Booking::credit(account_id, total, input.transaction_date, description)
            }
        };
        let financial = booking::book(&txn, main.flagged(DomainKind::PhysicalAsset)).await?;

        let row = asset_transactions::ActiveModel {
            ledger_id: Set(ledger_id),
            physical_asset_id: Set(asset.physical_asset_id),
            transaction_type: Set(trade.transaction_type.into()),
            quantity: Set(fintrack_core::precision::quantity(trade.quantity)),
            price_per_unit: Set(fintrack_core::precision::price(trade.price_per_unit)),
            total_amount: Set(total),
            account_id: Set(account_id),
            financial_transaction_id: Set(Some(financial.transaction_id)),
            transaction_date: Set(trade.transaction_date),
            notes: Set(input.notes),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        save_position(&txn, asset, &position).await?;
        txn.commit().await?;

        tracing::info!(
            ledger_id,
            physical_asset_id = row.physical_asset_id,
            asset_transaction_id = row.asset_transaction_id,
            side = label,
            "Recorded asset trade"
        );
        Ok(row)
    }

    /// Finds a transaction of the ledger.
    pub async fn find(
        &self,
        ledger_id: LedgerId,
        id: AssetTransactionId,
    ) -> Result<asset_transactions::Model, AssetTransactionError> {
        find_row(&self.db, ledger_id, id).await
    }

    /// Lists the trades of an asset, newest first.
    pub async fn list_for_asset(
        &self,
        ledger_id: LedgerId,
        asset_id: PhysicalAssetId,
    ) -> Result<Vec<asset_transactions::Model>, AssetTransactionError> {
        Ok(asset_transactions::Entity::find()
            .filter(asset_transactions::Column::LedgerId.eq(ledger_id.into_inner()))
            .filter(asset_transactions::Column::PhysicalAssetId.eq(asset_id.into_inner()))
            .order_by_desc(asset_transactions::Column::TransactionDate)
            .order_by_desc(asset_transactions::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Replaces the notes of a trade.
    pub async fn update_notes(
        &self,
        ledger_id: LedgerId,
        id: AssetTransactionId,
        notes: Option<String>,
    ) -> Result<asset_transactions::Model, AssetTransactionError> {
        let mut row = self.find(ledger_id, id).await?.into_active_model();
        row.notes = Set(notes);
        Ok(row.update(&self.db).await?)
    }

    /// Deletes a trade and its ledger transaction, then rebuilds the asset
    /// from the remaining trades.
    pub async fn delete(
        &self,
        ledger_id: LedgerId,
        id: AssetTransactionId,
    ) -> Result<(), AssetTransactionError> {
        let txn = self.db.begin().await?;
        let row = find_row(&txn, ledger_id, id).await?;
        let asset = lock_asset(&txn, ledger_id, PhysicalAssetId::new(row.physical_asset_id)).await?;

        asset_transactions::Entity::delete_by_id(row.asset_transaction_id)
            .exec(&txn)
            .await?;
        if let Some(transaction_id) = row.financial_transaction_id {
            booking::unbook(&txn, transaction_id).await?;
        }

        let remaining = asset_transactions::Entity::find()
            .filter(asset_transactions::Column::PhysicalAssetId.eq(asset.physical_asset_id))
            .order_by_asc(asset_transactions::Column::TransactionDate)
            .order_by_asc(asset_transactions::Column::CreatedAt)
            .order_by_asc(asset_transactions::Column::AssetTransactionId)
            .all(&txn)
            .await?;
        let trades: Vec<_> = remaining.iter().map(asset_transactions::Model::recorded).collect();
        let position = AssetPosition::replay(&trades);
        save_position(&txn, asset, &position).await?;
        txn.commit().await?;

        tracing::info!(
            ledger_id = ledger_id.into_inner(),
            asset_transaction_id = row.asset_transaction_id,
            remaining = remaining.len(),
            "Deleted asset trade and replayed position"
        );
        Ok(())
    }
}

async fn find_row<C: ConnectionTrait>(
    conn: &C,
    ledger_id: LedgerId,
    id: AssetTransactionId,
) -> Result<asset_transactions::Model, AssetTransactionError> {
    asset_transactions::Entity::find_by_id(id.into_inner())
        .filter(asset_transactions::Column::LedgerId.eq(ledger_id.into_inner()))
        .one(conn)
        .await?
        .ok_or(AssetTransactionError::NotFound(id))
}
