//! Physical asset repository: asset catalogue and manual price updates.

use chrono::{NaiveDateTime, Utc};
use fintrack_core::asset::{AssetError, AssetPosition};
use fintrack_shared::AppError;
use fintrack_shared::types::{AssetTypeId, LedgerId, PhysicalAssetId};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::constraint::is_unique_violation;
use crate::entities::{asset_transactions, asset_types, physical_assets};

const UNIQUE_NAME: &str = "uq_ledger_physical_asset_name";

/// Error types for physical asset operations.
#[derive(Debug, thiserror::Error)]
pub enum PhysicalAssetError {
    /// Asset not found in the ledger.
    #[error("Physical asset not found: {0}")]
    NotFound(PhysicalAssetId),

    /// Asset type not found in the ledger.
    #[error("Asset type not found: {0}")]
    AssetTypeNotFound(AssetTypeId),

    /// Another asset of the ledger has the name.
    #[error("Physical asset '{0}' already exists in this ledger")]
    DuplicateName(String),

    /// Asset still has transactions.
    #[error("Cannot delete physical asset: it has {0} transactions")]
    HasTransactions(u64),

    /// Position rule rejected the change.
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<PhysicalAssetError> for AppError {
    fn from(err: PhysicalAssetError) -> Self {
        match err {
            PhysicalAssetError::NotFound(_) | PhysicalAssetError::AssetTypeNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            PhysicalAssetError::DuplicateName(_) => Self::Conflict(err.to_string()),
            PhysicalAssetError::HasTransactions(_) => Self::BusinessRule(err.to_string()),
            PhysicalAssetError::Asset(e) => e.into(),
            PhysicalAssetError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating a physical asset.
#[derive(Debug, Clone)]
pub struct CreatePhysicalAssetInput {
    /// Owning ledger.
    pub ledger_id: LedgerId,
    /// Asset type of the same ledger.
    pub asset_type_id: AssetTypeId,
    /// Name, unique within the ledger.
    pub name: String,
    /// Free text.
    pub notes: Option<String>,
}

/// Input for updating a physical asset.
#[derive(Debug, Clone, Default)]
pub struct UpdatePhysicalAssetInput {
    /// New name.
    pub name: Option<String>,
    /// New notes.
    pub notes: Option<Option<String>>,
}

/// Physical asset repository.
#[derive(Debug, Clone)]
pub struct PhysicalAssetRepository {
    db: DatabaseConnection,
}

impl PhysicalAssetRepository {
    /// Creates a new physical asset repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an empty asset under an asset type of the same ledger.
    pub async fn create(
        &self,
        input: CreatePhysicalAssetInput,
    ) -> Result<physical_assets::Model, PhysicalAssetError> {
        let asset_type = asset_types::Entity::find_by_id(input.asset_type_id.into_inner())
            .filter(asset_types::Column::LedgerId.eq(input.ledger_id.into_inner()))
            .one(&self.db)
            .await?;
        if asset_type.is_none() {
            return Err(PhysicalAssetError::AssetTypeNotFound(input.asset_type_id));
        }

        let now = Utc::now().naive_utc();
        let asset = physical_assets::ActiveModel {
            ledger_id: Set(input.ledger_id.into_inner()),
            asset_type_id: Set(input.asset_type_id.into_inner()),
            name: Set(input.name.clone()),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        match asset.insert(&self.db).await {
            Ok(asset) => {
                tracing::info!(
                    ledger_id = asset.ledger_id,
                    physical_asset_id = asset.physical_asset_id,
                    "Created physical asset"
                );
                Ok(asset)
            }
            Err(e) if is_unique_violation(&e, UNIQUE_NAME) => {
                Err(PhysicalAssetError::DuplicateName(input.name))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Finds an asset of the ledger.
    pub async fn find(
        &self,
        ledger_id: LedgerId,
        id: PhysicalAssetId,
    ) -> Result<physical_assets::Model, PhysicalAssetError> {
        physical_assets::Entity::find_by_id(id.into_inner())
            .filter(physical_assets::Column::LedgerId.eq(ledger_id.into_inner()))
            .one(&self.db)
            .await?
            .ok_or(PhysicalAssetError::NotFound(id))
    }

    /// Lists the assets of a ledger by name, optionally of one asset type.
    pub async fn list(
        &self,
        ledger_id: LedgerId,
        asset_type_id: Option<AssetTypeId>,
    ) -> Result<Vec<physical_assets::Model>, PhysicalAssetError> {
        let mut query = physical_assets::Entity::find()
            .filter(physical_assets::Column::LedgerId.eq(ledger_id.into_inner()))
            .order_by_asc(physical_assets::Column::Name);
        if let Some(asset_type_id) = asset_type_id {
            query = query.filter(physical_assets::Column::AssetTypeId.eq(asset_type_id.into_inner()));
        }
        Ok(query.all(&self.db).await?)
    }

    /// Updates an asset's descriptive fields.
    pub async fn update(
        &self,
        ledger_id: LedgerId,
        id: PhysicalAssetId,
        input: UpdatePhysicalAssetInput,
    ) -> Result<physical_assets::Model, PhysicalAssetError> {
        let mut asset = self.find(ledger_id, id).await?.into_active_model();
        if let Some(name) = input.name.clone() {
            asset.name = Set(name);
        }
        if let Some(notes) = input.notes {
            asset.notes = Set(notes);
        }
        asset.updated_at = Set(Utc::now().naive_utc());

        match asset.update(&self.db).await {
            Ok(asset) => Ok(asset),
            Err(e) if is_unique_violation(&e, UNIQUE_NAME) => {
                Err(PhysicalAssetError::DuplicateName(input.name.unwrap_or_default()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Deletes an asset without transactions.
    pub async fn delete(
        &self,
        ledger_id: LedgerId,
        id: PhysicalAssetId,
    ) -> Result<(), PhysicalAssetError> {
        let asset = self.find(ledger_id, id).await?;
        let trades = asset_transactions::Entity::find()
            .filter(asset_transactions::Column::PhysicalAssetId.eq(asset.physical_asset_id))
            .count(&self.db)
            .await?;
        if trades > 0 {
            return Err(PhysicalAssetError::HasTransactions(trades));
        }
        physical_assets::Entity::delete_by_id(asset.physical_asset_id)
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Sets the latest price of an asset and revalues it.
    pub async fn update_price(
        &self,
        ledger_id: LedgerId,
        id: PhysicalAssetId,
        price_per_unit: Decimal,
        at: NaiveDateTime,
    ) -> Result<physical_assets::Model, PhysicalAssetError> {
        let txn = self.db.begin().await?;
        let asset = lock_asset(&txn, ledger_id, id).await?;
        let mut position = asset.position();
        position.update_price(price_per_unit, at)?;
        let asset = save_position(&txn, asset, &position).await?;
        txn.commit().await?;
        Ok(asset)
    }
}

/// Reads an asset `FOR UPDATE`.
pub(crate) async fn lock_asset<C: ConnectionTrait>(
    conn: &C,
    ledger_id: LedgerId,
    id: PhysicalAssetId,
) -> Result<physical_assets::Model, PhysicalAssetError> {
    physical_assets::Entity::find_by_id(id.into_inner())
        .filter(physical_assets::Column::LedgerId.eq(ledger_id.into_inner()))
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or(PhysicalAssetError::NotFound(id))
}

/// Writes a position back onto its asset row.
pub(crate) async fn save_position<C: ConnectionTrait>(
    conn: &C,
    asset: physical_assets::Model,
    position: &AssetPosition,
) -> Result<physical_assets::Model, DbErr> {
    let mut active = asset.into_active_model();
    active.total_quantity = Set(position.total_quantity);
    active.average_cost_per_unit = Set(position.average_cost_per_unit);
    active.latest_price_per_unit = Set(position.latest_price_per_unit);
    active.last_price_update = Set(position.last_price_update);
    active.current_value = Set(position.current_value);
    active.updated_at = Set(Utc::now().naive_utc());
    active.update(conn).await
}
