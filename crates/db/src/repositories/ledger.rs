//! Ledger repository: NAV provider settings.

use chrono::Utc;
use fintrack_core::pricing::NavServiceType;
use fintrack_shared::AppError;
use fintrack_shared::types::LedgerId;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel, QueryOrder, Set,
};

use crate::entities::ledgers;

/// Error types for ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Ledger not found.
    #[error("Ledger not found: {0}")]
    NotFound(LedgerId),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NotFound(_) => Self::NotFound(err.to_string()),
            LedgerError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// NAV provider selection of a ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavSettings {
    /// Provider to query.
    pub service: NavServiceType,
    /// Credential for providers that need one.
    pub api_key: Option<String>,
}

/// Ledger repository.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a ledger by ID.
    pub async fn find(&self, ledger_id: LedgerId) -> Result<ledgers::Model, LedgerError> {
        ledgers::Entity::find_by_id(ledger_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(LedgerError::NotFound(ledger_id))
    }

    /// Lists every ledger, oldest first.
    pub async fn list_all(&self) -> Result<Vec<ledgers::Model>, LedgerError> {
        Ok(ledgers::Entity::find()
            .order_by_asc(ledgers::Column::LedgerId)
            .all(&self.db)
            .await?)
    }

    /// Returns the NAV provider settings of a ledger.
    pub async fn nav_settings(&self, ledger_id: LedgerId) -> Result<NavSettings, LedgerError> {
        let ledger = self.find(ledger_id).await?;
        Ok(NavSettings {
            service: ledger.nav_service_type.into(),
            api_key: ledger.api_key,
        })
    }

    /// Replaces the NAV provider settings of a ledger.
    pub async fn update_nav_settings(
        &self,
        ledger_id: LedgerId,
        settings: NavSettings,
    ) -> Result<ledgers::Model, LedgerError> {
        let mut ledger = self.find(ledger_id).await?.into_active_model();
        ledger.nav_service_type = Set(settings.service.into());
        ledger.api_key = Set(settings.api_key.filter(|key| !key.trim().is_empty()));
        ledger.updated_at = Set(Utc::now().naive_utc());
        let ledger = ledger.update(&self.db).await?;
        tracing::info!(
            ledger_id = ledger.ledger_id,
            service = %settings.service,
            "Updated NAV provider settings"
        );
        Ok(ledger)
    }
}
