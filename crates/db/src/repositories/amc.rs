//! AMC repository: asset management companies of a ledger.

use chrono::Utc;
use fintrack_shared::AppError;
use fintrack_shared::types::{AmcId, LedgerId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use crate::constraint::is_unique_violation;
use crate::entities::{amcs, mutual_funds};

const UNIQUE_NAME: &str = "uq_amcs_ledger_name";

/// Error types for AMC operations.
#[derive(Debug, thiserror::Error)]
pub enum AmcError {
    /// AMC not found in the ledger.
    #[error("AMC not found: {0}")]
    NotFound(AmcId),

    /// Another AMC of the ledger has the name.
    #[error("AMC '{0}' already exists in this ledger")]
    DuplicateName(String),

    /// AMC still has funds.
    #[error("Cannot delete AMC: {0} mutual funds reference it")]
    HasFunds(u64),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<AmcError> for AppError {
    fn from(err: AmcError) -> Self {
        match err {
            AmcError::NotFound(_) => Self::NotFound(err.to_string()),
            AmcError::DuplicateName(_) => Self::Conflict(err.to_string()),
            AmcError::HasFunds(_) => Self::BusinessRule(err.to_string()),
            AmcError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating an AMC.
#[derive(Debug, Clone)]
pub struct CreateAmcInput {
    /// Owning ledger.
    pub ledger_id: LedgerId,
    /// Name, unique within the ledger.
    pub name: String,
    /// Free text.
    pub notes: Option<String>,
}

/// Input for updating an AMC.
#[derive(Debug, Clone, Default)]
pub struct UpdateAmcInput {
    /// New name.
    pub name: Option<String>,
    /// New notes.
    pub notes: Option<Option<String>>,
}

/// AMC repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct AmcRepository {
    db: DatabaseConnection,
}

impl AmcRepository {
    /// Creates a new AMC repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an AMC.
    pub async fn create(&self, input: CreateAmcInput) -> Result<amcs::Model, AmcError> {
        let now = Utc::now().naive_utc();
        let amc = amcs::ActiveModel {
            ledger_id: Set(input.ledger_id.into_inner()),
            name: Set(input.name.clone()),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        match amc.insert(&self.db).await {
            Ok(amc) => {
                tracing::info!(ledger_id = amc.ledger_id, amc_id = amc.amc_id, "Created AMC");
                Ok(amc)
            }
            Err(e) if is_unique_violation(&e, UNIQUE_NAME) => Err(AmcError::DuplicateName(input.name)),
            Err(e) => Err(e.into()),
        }
    }

    /// Finds an AMC of the ledger.
    pub async fn find(&self, ledger_id: LedgerId, amc_id: AmcId) -> Result<amcs::Model, AmcError> {
        amcs::Entity::find_by_id(amc_id.into_inner())
            .filter(amcs::Column::LedgerId.eq(ledger_id.into_inner()))
            .one(&self.db)
            .await?
            .ok_or(AmcError::NotFound(amc_id))
    }

    /// Lists the AMCs of a ledger by name.
    pub async fn list(&self, ledger_id: LedgerId) -> Result<Vec<amcs::Model>, AmcError> {
        Ok(amcs::Entity::find()
            .filter(amcs::Column::LedgerId.eq(ledger_id.into_inner()))
            .order_by_asc(amcs::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Updates an AMC.
    pub async fn update(
        &self,
        ledger_id: LedgerId,
        amc_id: AmcId,
        input: UpdateAmcInput,
    ) -> Result<amcs::Model, AmcError> {
        let mut amc = self.find(ledger_id, amc_id).await?.into_active_model();
        if let Some(name) = input.name.clone() {
            amc.name = Set(name);
        }
        if let Some(notes) = input.notes {
            amc.notes = Set(notes);
        }
        amc.updated_at = Set(Utc::now().naive_utc());

        match amc.update(&self.db).await {
            Ok(amc) => Ok(amc),
            Err(e) if is_unique_violation(&e, UNIQUE_NAME) => {
                Err(AmcError::DuplicateName(input.name.unwrap_or_default()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Deletes an AMC that no fund references.
    pub async fn delete(&self, ledger_id: LedgerId, amc_id: AmcId) -> Result<(), AmcError> {
        let amc = self.find(ledger_id, amc_id).await?;
        let funds = mutual_funds::Entity::find()
            .filter(mutual_funds::Column::AmcId.eq(amc.amc_id))
            .count(&self.db)
            .await?;
        if funds > 0 {
            return Err(AmcError::HasFunds(funds));
        }
        amcs::Entity::delete_by_id(amc.amc_id).exec(&self.db).await?;
        tracing::info!(ledger_id = amc.ledger_id, amc_id = amc.amc_id, "Deleted AMC");
        Ok(())
    }
}
