//! Asset type repository: units physical assets are measured in.

use fintrack_shared::AppError;
use fintrack_shared::types::{AssetTypeId, LedgerId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use crate::constraint::is_unique_violation;
use crate::entities::{asset_types, physical_assets};

const UNIQUE_NAME: &str = "uq_ledger_asset_type_name";

/// Error types for asset type operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetTypeError {
    /// Asset type not found in the ledger.
    #[error("Asset type not found: {0}")]
    NotFound(AssetTypeId),

    /// Another asset type of the ledger has the name.
    #[error("Asset type '{0}' already exists in this ledger")]
    DuplicateName(String),

    /// Asset type still has assets.
    #[error("Cannot delete asset type: {0} physical assets use it")]
    HasAssets(u64),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<AssetTypeError> for AppError {
    fn from(err: AssetTypeError) -> Self {
        match err {
            AssetTypeError::NotFound(_) => Self::NotFound(err.to_string()),
            AssetTypeError::DuplicateName(_) => Self::Conflict(err.to_string()),
            AssetTypeError::HasAssets(_) => Self::BusinessRule(err.to_string()),
            AssetTypeError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating an asset type.
#[derive(Debug, Clone)]
pub struct CreateAssetTypeInput {
    /// Owning ledger.
    pub ledger_id: LedgerId,
    /// Name, unique within the ledger, e.g. "Gold".
    pub name: String,
    /// Unit name, e.g. "gram".
    pub unit_name: String,
    /// Unit symbol, e.g. "g".
    pub unit_symbol: String,
    /// Free text.
    pub notes: Option<String>,
}

/// Input for updating an asset type.
#[derive(Debug, Clone, Default)]
pub struct UpdateAssetTypeInput {
    /// New name.
    pub name: Option<String>,
    /// New unit name.
    pub unit_name: Option<String>,
    /// New unit symbol.
    pub unit_symbol: Option<String>,
    /// New notes.
    pub notes: Option<Option<String>>,
}

/// Asset type repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct AssetTypeRepository {
    db: DatabaseConnection,
}

impl AssetTypeRepository {
    /// Creates a new asset type repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an asset type.
    pub async fn create(
        &self,
        input: CreateAssetTypeInput,
    ) -> Result<asset_types::Model, AssetTypeError> {
        let asset_type = asset_types::ActiveModel {
            ledger_id: Set(input.ledger_id.into_inner()),
            name: Set(input.name.clone()),
            unit_name: Set(input.unit_name),
            unit_symbol: Set(input.unit_symbol),
            notes: Set(input.notes),
            created_at: Set(chrono::Utc::now().naive_utc()),
            ..Default::default()
        };

        match asset_type.insert(&self.db).await {
            Ok(asset_type) => Ok(asset_type),
            Err(e) if is_unique_violation(&e, UNIQUE_NAME) => {
                Err(AssetTypeError::DuplicateName(input.name))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Finds an asset type of the ledger.
    pub async fn find(
        &self,
        ledger_id: LedgerId,
        id: AssetTypeId,
    ) -> Result<asset_types::Model, AssetTypeError> {
        asset_types::Entity::find_by_id(id.into_inner())
            .filter(asset_types::Column::LedgerId.eq(ledger_id.into_inner()))
            .one(&self.db)
            .await?
            .ok_or(AssetTypeError::NotFound(id))
    }

    /// Lists the asset types of a ledger by name.
    pub async fn list(&self, ledger_id: LedgerId) -> Result<Vec<asset_types::Model>, AssetTypeError> {
        Ok(asset_types::Entity::find()
            .filter(asset_types::Column::LedgerId.eq(ledger_id.into_inner()))
            .order_by_asc(asset_types::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Updates an asset type.
    pub async fn update(
        &self,
        ledger_id: LedgerId,
        id: AssetTypeId,
        input: UpdateAssetTypeInput,
    ) -> Result<asset_types::Model, AssetTypeError> {
        let mut asset_type = self.find(ledger_id, id).await?.into_active_model();
        if let Some(name) = input.name.clone() {
            asset_type.name = Set(name);
        }
        if let Some(unit_name) = input.unit_name {
            asset_type.unit_name = Set(unit_name);
        }
        if let Some(unit_symbol) = input.unit_symbol {
            asset_type.unit_symbol = Set(unit_symbol);
        }
        if let Some(notes) = input.notes {
            asset_type.notes = Set(notes);
        }

        match asset_type.update(&self.db).await {
            Ok(asset_type) => Ok(asset_type),
            Err(e) if is_unique_violation(&e, UNIQUE_NAME) => {
                Err(AssetTypeError::DuplicateName(input.name.unwrap_or_default()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Deletes an asset type no asset uses.
    pub async fn delete(&self, ledger_id: LedgerId, id: AssetTypeId) -> Result<(), AssetTypeError> {
        let asset_type = self.find(ledger_id, id).await?;
        let assets = physical_assets::Entity::find()
            .filter(physical_assets::Column::AssetTypeId.eq(asset_type.asset_type_id))
            .count(&self.db)
            .await?;
        if assets > 0 {
            return Err(AssetTypeError::HasAssets(assets));
        }
        asset_types::Entity::delete_by_id(asset_type.asset_type_id)
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
